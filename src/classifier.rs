// Common classifier capability plus the TF-IDF backed statistical classifier.
use crate::error::{Result, TriageError};
use crate::tfidf::{SparseVec, TfidfVectorizer};
use crate::types::Category;
use std::sync::Arc;

/// Result of classifying one text with one classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub category: Category,
    pub classifier: String,
    /// Confidence in `[0, 1]` when the classifier has a notion of one.
    pub score: Option<f64>,
}

/// Anything that maps a free-text comment to a category. Every
/// implementation must return a category for empty input.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    fn classify(&self, text: &str) -> Category;

    fn classify_detailed(&self, text: &str) -> ClassificationResult {
        ClassificationResult {
            category: self.classify(text),
            classifier: self.name().to_string(),
            score: None,
        }
    }

    fn classify_batch(&self, texts: &[String]) -> Vec<Category> {
        texts.iter().map(|t| self.classify(t)).collect()
    }
}

/// A supervised model over TF-IDF rows. `predict_proba` returns one
/// probability per category, indexed by `Category::index`.
pub trait TextModel: Send + Sync {
    fn predict_proba(&self, x: &SparseVec) -> [f64; 4];
}

/// Index of the highest probability; the first category wins ties.
pub fn argmax(probs: &[f64; 4]) -> (Category, f64) {
    let mut best = 0usize;
    for i in 1..probs.len() {
        if probs[i] > probs[best] {
            best = i;
        }
    }
    (Category::ALL[best], probs[best])
}

/// Trained vectorizer + model pair. The vectorizer is shared read-only
/// between every model trained on the same split.
pub struct StatisticalClassifier<M: TextModel> {
    name: String,
    vectorizer: Arc<TfidfVectorizer>,
    model: M,
}

impl<M: TextModel> StatisticalClassifier<M> {
    pub fn new(name: impl Into<String>, vectorizer: Arc<TfidfVectorizer>, model: M) -> Self {
        Self {
            name: name.into(),
            vectorizer,
            model,
        }
    }
}

impl<M: TextModel> Classifier for StatisticalClassifier<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, text: &str) -> Category {
        self.classify_detailed(text).category
    }

    fn classify_detailed(&self, text: &str) -> ClassificationResult {
        let x = self.vectorizer.transform(text);
        let (category, p) = argmax(&self.model.predict_proba(&x));
        ClassificationResult {
            category,
            classifier: self.name.clone(),
            score: Some(p),
        }
    }
}

/// Distinct categories present in `labels`, in declaration order.
pub fn classes_of(labels: &[Category]) -> Vec<Category> {
    Category::ALL
        .iter()
        .copied()
        .filter(|c| labels.contains(c))
        .collect()
}

pub(crate) fn ensure_trainable(x_len: usize, y_len: usize) -> Result<()> {
    if x_len == 0 {
        return Err(TriageError::DataInsufficient(
            "cannot train on an empty corpus".to_string(),
        ));
    }
    if x_len != y_len {
        return Err(TriageError::DataInsufficient(format!(
            "{} feature rows but {} labels",
            x_len, y_len
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_first_on_ties() {
        let (c, p) = argmax(&[0.1, 0.4, 0.4, 0.1]);
        assert_eq!(c, Category::Education);
        assert_eq!(p, 0.4);
    }

    #[test]
    fn classes_keep_declaration_order() {
        let labels = vec![Category::Environment, Category::Health, Category::Environment];
        assert_eq!(classes_of(&labels), vec![Category::Health, Category::Environment]);
    }

    #[test]
    fn trainable_checks() {
        assert!(matches!(ensure_trainable(0, 0), Err(TriageError::DataInsufficient(_))));
        assert!(ensure_trainable(3, 2).is_err());
        assert!(ensure_trainable(3, 3).is_ok());
    }
}
