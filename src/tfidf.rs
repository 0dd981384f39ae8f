//! TF-IDF vectorizer over word n-grams.
//!
//! Tokens are maximal runs of alphanumeric (or `_`) characters with at least
//! two characters, lowercased. The vocabulary keeps the `max_features` most
//! frequent n-grams of the training corpus and assigns feature indices in
//! lexicographic term order. Rows are raw counts times smoothed IDF,
//! L2-normalized.

use crate::error::{Result, TriageError};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Sparse feature row: `(feature index, value)` pairs sorted by index.
pub type SparseVec = Vec<(usize, f64)>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TfidfConfig {
    pub max_features: usize,
    /// Inclusive `(min_n, max_n)` n-gram range.
    pub ngram_range: (usize, usize),
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            max_features: 1000,
            ngram_range: (1, 2),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    config: TfidfConfig,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

fn ngrams(tokens: &[String], (min_n, max_n): (usize, usize)) -> Vec<String> {
    let mut out = Vec::new();
    for n in min_n.max(1)..=max_n {
        if n > tokens.len() {
            break;
        }
        for window in tokens.windows(n) {
            out.push(window.join(" "));
        }
    }
    out
}

impl TfidfVectorizer {
    /// Learn the vocabulary and IDF weights from `documents`.
    pub fn fit(documents: &[String], config: TfidfConfig) -> Result<Self> {
        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let grams = ngrams(&tokenize(doc), config.ngram_range);
            let mut seen: HashSet<&str> = HashSet::new();
            for g in &grams {
                *term_freq.entry(g.clone()).or_insert(0) += 1;
                if seen.insert(g.as_str()) {
                    *doc_freq.entry(g.clone()).or_insert(0) += 1;
                }
            }
        }
        if term_freq.is_empty() {
            return Err(TriageError::DataInsufficient(
                "empty vocabulary; training texts contain no tokens".to_string(),
            ));
        }

        let mut ranked: Vec<(String, usize)> = term_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(config.max_features);

        let mut kept: Vec<String> = ranked.into_iter().map(|(t, _)| t).collect();
        kept.sort();

        let n_docs = documents.len() as f64;
        let idf = kept
            .iter()
            .map(|t| {
                let df = *doc_freq.get(t).unwrap_or(&0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        let vocabulary = kept.into_iter().enumerate().map(|(i, t)| (t, i)).collect();

        Ok(Self {
            config,
            vocabulary,
            idf,
        })
    }

    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    #[cfg(test)]
    pub fn feature_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn transform(&self, document: &str) -> SparseVec {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for g in ngrams(&tokenize(document), self.config.ngram_range) {
            if let Some(&idx) = self.vocabulary.get(&g) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }
        let mut row: SparseVec = counts
            .into_iter()
            .map(|(i, tf)| (i, tf * self.idf[i]))
            .collect();
        let norm = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in &mut row {
                *v /= norm;
            }
        }
        row
    }

    pub fn transform_all(&self, documents: &[String]) -> Vec<SparseVec> {
        documents.iter().map(|d| self.transform(d)).collect()
    }
}
