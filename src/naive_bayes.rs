use crate::classifier::{classes_of, ensure_trainable, TextModel};
use crate::error::Result;
use crate::tfidf::SparseVec;
use crate::types::Category;

/// Multinomial naive Bayes with additive (Laplace) smoothing.
#[derive(Debug, Clone)]
pub struct MultinomialNb {
    alpha: f64,
    classes: Vec<Category>,
    class_log_prior: [f64; 4],
    /// `feature_log_prob[class index][feature]`; empty for absent classes.
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNb {
    pub fn fit(x: &[SparseVec], y: &[Category], n_features: usize, alpha: f64) -> Result<Self> {
        ensure_trainable(x.len(), y.len())?;

        let mut class_count = [0usize; 4];
        let mut feature_count = vec![vec![0.0f64; n_features]; 4];
        for (row, label) in x.iter().zip(y) {
            let c = label.index();
            class_count[c] += 1;
            for &(j, v) in row {
                feature_count[c][j] += v;
            }
        }

        let n = x.len() as f64;
        let mut class_log_prior = [f64::NEG_INFINITY; 4];
        let mut feature_log_prob: Vec<Vec<f64>> = vec![Vec::new(); 4];
        for c in 0..4 {
            if class_count[c] == 0 {
                continue;
            }
            class_log_prior[c] = (class_count[c] as f64 / n).ln();
            let total: f64 = feature_count[c].iter().sum::<f64>() + alpha * n_features as f64;
            feature_log_prob[c] = feature_count[c]
                .iter()
                .map(|fc| ((fc + alpha) / total).ln())
                .collect();
        }

        Ok(Self {
            alpha,
            classes: classes_of(y),
            class_log_prior,
            feature_log_prob,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn classes(&self) -> &[Category] {
        &self.classes
    }

    fn joint_log_likelihood(&self, x: &SparseVec) -> [f64; 4] {
        let mut jll = [f64::NEG_INFINITY; 4];
        for c in &self.classes {
            let i = c.index();
            let probs = &self.feature_log_prob[i];
            jll[i] = self.class_log_prior[i]
                + x.iter().map(|&(j, v)| v * probs[j]).sum::<f64>();
        }
        jll
    }
}

impl TextModel for MultinomialNb {
    fn predict_proba(&self, x: &SparseVec) -> [f64; 4] {
        let jll = self.joint_log_likelihood(x);
        let max = jll.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut out = [0.0; 4];
        if !max.is_finite() {
            return out;
        }
        let mut total = 0.0;
        for i in 0..4 {
            if jll[i].is_finite() {
                out[i] = (jll[i] - max).exp();
                total += out[i];
            }
        }
        for p in &mut out {
            *p /= total;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::argmax;
    use crate::error::TriageError;

    fn toy() -> (Vec<SparseVec>, Vec<Category>) {
        let x = vec![
            vec![(0, 1.0)],
            vec![(0, 0.8), (2, 0.2)],
            vec![(1, 1.0)],
            vec![(1, 0.9), (2, 0.1)],
        ];
        let y = vec![
            Category::Health,
            Category::Health,
            Category::Security,
            Category::Security,
        ];
        (x, y)
    }

    #[test]
    fn learns_separable_features() {
        let (x, y) = toy();
        let nb = MultinomialNb::fit(&x, &y, 3, 1.0).unwrap();
        assert_eq!(nb.classes(), &[Category::Health, Category::Security]);
        assert_eq!(argmax(&nb.predict_proba(&vec![(0, 1.0)])).0, Category::Health);
        assert_eq!(argmax(&nb.predict_proba(&vec![(1, 1.0)])).0, Category::Security);
    }

    #[test]
    fn probabilities_sum_to_one_and_skip_unseen_classes() {
        let (x, y) = toy();
        let nb = MultinomialNb::fit(&x, &y, 3, 1.0).unwrap();
        let p = nb.predict_proba(&vec![(2, 1.0)]);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert_eq!(p[Category::Education.index()], 0.0);
        assert_eq!(p[Category::Environment.index()], 0.0);
    }

    #[test]
    fn empty_row_falls_back_to_prior() {
        let x = vec![vec![(0, 1.0)], vec![(0, 1.0)], vec![(1, 1.0)]];
        let y = vec![Category::Education, Category::Education, Category::Health];
        let nb = MultinomialNb::fit(&x, &y, 2, 1.0).unwrap();
        assert_eq!(argmax(&nb.predict_proba(&Vec::new())).0, Category::Education);
    }

    #[test]
    fn refuses_empty_training_set() {
        let err = MultinomialNb::fit(&[], &[], 3, 1.0).unwrap_err();
        assert!(matches!(err, TriageError::DataInsufficient(_)));
    }
}
