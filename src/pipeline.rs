// Training and side-by-side evaluation of the three classifiers.
use crate::classifier::{Classifier, StatisticalClassifier};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::forest::RandomForest;
use crate::lexical::LexicalClassifier;
use crate::loader::has_comment;
use crate::metrics::{classification_report, ClassificationReport};
use crate::naive_bayes::MultinomialNb;
use crate::split::stratified_split;
use crate::summarizer::summarize;
use crate::tfidf::TfidfVectorizer;
use crate::types::{Category, ModelComparisonRow, Report, SampleRow};
use crate::util::format_number;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::info;

pub const NAIVE_BAYES: &str = "Naive Bayes";
pub const RANDOM_FOREST: &str = "Random Forest";

/// Comments used to show how each classifier behaves on typical input.
pub const EXAMPLE_COMMENTS: &[&str] = &[
    "necesitamos más médicos en el hospital",
    "las calles están muy sucias y llenas de basura",
    "no hay suficientes profesores en la escuela",
    "hay mucha delincuencia en el barrio",
];

pub struct TrainedModels {
    pub vectorizer: Arc<TfidfVectorizer>,
    pub naive_bayes: StatisticalClassifier<MultinomialNb>,
    pub forest: StatisticalClassifier<RandomForest>,
}

/// Fit the vectorizer on `texts` and train both statistical models on the
/// resulting rows.
pub fn train_models(texts: &[String], labels: &[Category], config: &AnalysisConfig) -> Result<TrainedModels> {
    let vectorizer = Arc::new(TfidfVectorizer::fit(texts, config.tfidf)?);
    let x = vectorizer.transform_all(texts);
    let n_features = vectorizer.n_features();
    info!(documents = texts.len(), features = n_features, "vectorized training texts");

    let nb = MultinomialNb::fit(&x, labels, n_features, config.nb_alpha)?;
    info!(alpha = nb.alpha(), classes = nb.classes().len(), "trained naive Bayes");
    let rf = RandomForest::fit(&x, labels, n_features, config.forest)?;
    info!(trees = rf.n_trees(), classes = rf.classes().len(), "trained random forest");

    Ok(TrainedModels {
        naive_bayes: StatisticalClassifier::new(NAIVE_BAYES, Arc::clone(&vectorizer), nb),
        forest: StatisticalClassifier::new(RANDOM_FOREST, Arc::clone(&vectorizer), rf),
        vectorizer,
    })
}

#[derive(Debug, Clone)]
pub struct ModelEvaluation {
    pub name: String,
    pub report: ClassificationReport,
}

pub fn evaluate(classifier: &dyn Classifier, texts: &[String], labels: &[Category]) -> ModelEvaluation {
    let predicted = classifier.classify_batch(texts);
    ModelEvaluation {
        name: classifier.name().to_string(),
        report: classification_report(labels, &predicted),
    }
}

/// Reports that carry a real comment, as parallel text/label vectors.
pub fn labeled_texts(reports: &[Report]) -> (Vec<String>, Vec<Category>) {
    reports
        .iter()
        .filter(|r| has_comment(r))
        .map(|r| (r.comment.clone(), r.category))
        .unzip()
}

pub struct Comparison {
    pub models: TrainedModels,
    pub lexical: LexicalClassifier,
    pub evaluations: Vec<ModelEvaluation>,
    pub train_size: usize,
    pub test_size: usize,
}

impl Comparison {
    pub fn classifiers(&self) -> [&dyn Classifier; 3] {
        [&self.models.forest, &self.models.naive_bayes, &self.lexical]
    }

    pub fn to_rows(&self) -> Vec<ModelComparisonRow> {
        self.evaluations
            .iter()
            .map(|e| ModelComparisonRow {
                model: e.name.clone(),
                accuracy: format_number(e.report.accuracy * 100.0, 2),
                macro_f1: format_number(e.report.macro_avg.f1, 2),
                test_size: e.report.total,
            })
            .collect()
    }

    pub fn best(&self) -> Option<&ModelEvaluation> {
        self.evaluations
            .iter()
            .max_by(|a, b| a.report.accuracy.total_cmp(&b.report.accuracy))
    }

    /// Plain-text metrics file contents.
    pub fn render(&self) -> String {
        let mut out = String::from("CLASSIFIER METRICS\n");
        out.push_str(&"=".repeat(60));
        out.push_str(&format!(
            "\n\nTraining texts: {}\nTest texts: {}\nVocabulary size: {}\n\n",
            self.train_size,
            self.test_size,
            self.models.vectorizer.n_features()
        ));
        for e in &self.evaluations {
            out.push_str(&format!(
                "{} - Accuracy: {:.2}%\n\nClassification report:\n{}\n",
                e.name,
                e.report.accuracy * 100.0,
                e.report.render()
            ));
            out.push_str(&"=".repeat(60));
            out.push_str("\n\n");
        }
        out
    }
}

/// Stratified split, training on the train part and evaluation of every
/// classifier on the held-out part.
pub fn compare_classifiers(reports: &[Report], config: &AnalysisConfig) -> Result<Comparison> {
    let (texts, labels) = labeled_texts(reports);
    info!(labeled = texts.len(), "preparing classifier comparison");
    let split = stratified_split(&labels, config.test_size, config.seed)?;

    let pick = |idx: &[usize]| -> (Vec<String>, Vec<Category>) {
        idx.iter().map(|&i| (texts[i].clone(), labels[i])).unzip()
    };
    let (train_x, train_y) = pick(&split.train);
    let (test_x, test_y) = pick(&split.test);

    let models = train_models(&train_x, &train_y, config)?;
    let mut comparison = Comparison {
        models,
        lexical: LexicalClassifier::new().with_default(config.default_category),
        evaluations: Vec::new(),
        train_size: train_x.len(),
        test_size: test_x.len(),
    };
    let evaluations: Vec<ModelEvaluation> = comparison
        .classifiers()
        .iter()
        .map(|c| evaluate(*c, &test_x, &test_y))
        .collect();
    for e in &evaluations {
        info!(model = %e.name, accuracy = e.report.accuracy, "evaluated");
    }
    comparison.evaluations = evaluations;
    Ok(comparison)
}

/// Classify and summarize a seeded random sample of commented reports with
/// the lexical classifier. Returns the rows and the sample accuracy.
pub fn classify_sample(reports: &[Report], config: &AnalysisConfig) -> (Vec<SampleRow>, f64) {
    let commented: Vec<&Report> = reports.iter().filter(|r| has_comment(r)).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let n = config.sample_size.min(commented.len());
    let sample: Vec<&Report> = commented.choose_multiple(&mut rng, n).copied().collect();

    let lexical = LexicalClassifier::new().with_default(config.default_category);
    let rows: Vec<SampleRow> = sample
        .iter()
        .map(|r| SampleRow {
            comment: r.comment.clone(),
            category: r.category,
            lexical_category: lexical.classify(&r.comment),
            summary: summarize(&r.comment, config.summary_length),
        })
        .collect();
    let correct = rows.iter().filter(|r| r.category == r.lexical_category).count();
    let accuracy = if rows.is_empty() {
        0.0
    } else {
        correct as f64 / rows.len() as f64
    };
    (rows, accuracy)
}
