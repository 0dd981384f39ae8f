use crate::forest::ForestConfig;
use crate::lexical::DEFAULT_CATEGORY;
use crate::summarizer::DEFAULT_MAX_LENGTH;
use crate::tfidf::TfidfConfig;
use crate::types::Category;
use clap::Parser;
use std::path::PathBuf;

/// Citizen complaint triage: cleaning, classification and solution reports.
#[derive(Debug, Clone, Parser)]
#[command(name = "complaint_triage", version, about)]
pub struct Args {
    /// Complaint CSV (UTF-8, comma-delimited, header row).
    #[arg(long, default_value = "dataset.csv")]
    pub input: PathBuf,

    /// Directory receiving the generated CSV/JSON/text files.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Comments classified and summarized for the sample export.
    #[arg(long, default_value_t = 100)]
    pub sample_size: usize,

    /// Seed for the split, the sample and the forest.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// TF-IDF vocabulary cap.
    #[arg(long, default_value_t = 1000)]
    pub max_features: usize,

    /// Trees in the random forest.
    #[arg(long, default_value_t = 100)]
    pub trees: usize,

    /// Held-out share of the labeled comments.
    #[arg(long, default_value_t = 0.2, value_parser = parse_fraction)]
    pub test_size: f64,

    /// Maximum characters of a comment summary.
    #[arg(long, default_value_t = DEFAULT_MAX_LENGTH)]
    pub summary_length: usize,

    /// Category the lexical classifier assigns when no keyword matches.
    #[arg(long, default_value = "Seguridad")]
    pub default_category: Category,

    /// Run every step once and exit instead of showing the menu.
    #[arg(long)]
    pub batch: bool,
}

fn parse_fraction(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if v > 0.0 && v < 1.0 {
        Ok(v)
    } else {
        Err(format!("{v} is not strictly between 0 and 1"))
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    pub out_dir: PathBuf,
    pub tfidf: TfidfConfig,
    pub forest: ForestConfig,
    pub nb_alpha: f64,
    pub test_size: f64,
    pub seed: u64,
    pub sample_size: usize,
    pub summary_length: usize,
    pub default_category: Category,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("dataset.csv"),
            out_dir: PathBuf::from("."),
            tfidf: TfidfConfig::default(),
            forest: ForestConfig::default(),
            nb_alpha: 1.0,
            test_size: 0.2,
            seed: 42,
            sample_size: 100,
            summary_length: DEFAULT_MAX_LENGTH,
            default_category: DEFAULT_CATEGORY,
        }
    }
}

impl From<&Args> for AnalysisConfig {
    fn from(a: &Args) -> Self {
        let defaults = AnalysisConfig::default();
        Self {
            input: a.input.clone(),
            out_dir: a.out_dir.clone(),
            tfidf: TfidfConfig {
                max_features: a.max_features,
                ..defaults.tfidf
            },
            forest: ForestConfig {
                n_trees: a.trees,
                seed: a.seed,
                ..defaults.forest
            },
            test_size: a.test_size,
            seed: a.seed,
            sample_size: a.sample_size,
            summary_length: a.summary_length,
            default_category: a.default_category,
            ..defaults
        }
    }
}

impl AnalysisConfig {
    pub fn out_path(&self, file: &str) -> PathBuf {
        self.out_dir.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let args = Args::parse_from(["complaint_triage"]);
        let cfg = AnalysisConfig::from(&args);
        let d = AnalysisConfig::default();
        assert_eq!(cfg.tfidf, d.tfidf);
        assert_eq!(cfg.forest, d.forest);
        assert_eq!(cfg.test_size, d.test_size);
        assert_eq!(cfg.sample_size, d.sample_size);
        assert_eq!(cfg.default_category, d.default_category);
        assert!(!args.batch);
    }

    #[test]
    fn seed_flows_into_forest() {
        let args = Args::parse_from(["complaint_triage", "--seed", "7", "--trees", "10", "--batch"]);
        let cfg = AnalysisConfig::from(&args);
        assert_eq!(cfg.forest.seed, 7);
        assert_eq!(cfg.forest.n_trees, 10);
        assert!(args.batch);
    }

    #[test]
    fn default_category_accepts_labels() {
        let args = Args::parse_from(["complaint_triage", "--default-category", "Salud"]);
        assert_eq!(AnalysisConfig::from(&args).default_category, Category::Health);
        assert!(Args::try_parse_from(["complaint_triage", "--default-category", "Transporte"]).is_err());
    }

    #[test]
    fn test_size_must_be_a_fraction() {
        assert!(Args::try_parse_from(["complaint_triage", "--test-size", "1.5"]).is_err());
        assert!(Args::try_parse_from(["complaint_triage", "--test-size", "0"]).is_err());
        assert!(Args::try_parse_from(["complaint_triage", "--test-size", "0.3"]).is_ok());
    }
}
