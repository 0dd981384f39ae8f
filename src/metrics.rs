use crate::types::{Category, ClassMetricRow};
use crate::util::format_number;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub category: Category,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Averages {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Multi-class classification report. Classes are those present in either
/// the true or the predicted labels; undefined ratios count as 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub total: usize,
    pub per_class: Vec<ClassMetrics>,
    pub macro_avg: Averages,
    pub weighted_avg: Averages,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

pub fn accuracy(y_true: &[Category], y_pred: &[Category]) -> f64 {
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    ratio(correct, y_true.len().min(y_pred.len()))
}

pub fn classification_report(y_true: &[Category], y_pred: &[Category]) -> ClassificationReport {
    let mut tp = [0usize; 4];
    let mut predicted = [0usize; 4];
    let mut actual = [0usize; 4];
    for (t, p) in y_true.iter().zip(y_pred) {
        actual[t.index()] += 1;
        predicted[p.index()] += 1;
        if t == p {
            tp[t.index()] += 1;
        }
    }

    let per_class: Vec<ClassMetrics> = Category::ALL
        .iter()
        .filter(|c| actual[c.index()] + predicted[c.index()] > 0)
        .map(|&c| {
            let i = c.index();
            let precision = ratio(tp[i], predicted[i]);
            let recall = ratio(tp[i], actual[i]);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            ClassMetrics {
                category: c,
                precision,
                recall,
                f1,
                support: actual[i],
            }
        })
        .collect();

    let k = per_class.len().max(1) as f64;
    let macro_avg = Averages {
        precision: per_class.iter().map(|m| m.precision).sum::<f64>() / k,
        recall: per_class.iter().map(|m| m.recall).sum::<f64>() / k,
        f1: per_class.iter().map(|m| m.f1).sum::<f64>() / k,
    };
    let total: usize = per_class.iter().map(|m| m.support).sum();
    let weight = |f: fn(&ClassMetrics) -> f64| {
        if total == 0 {
            0.0
        } else {
            per_class.iter().map(|m| f(m) * m.support as f64).sum::<f64>() / total as f64
        }
    };
    let weighted_avg = Averages {
        precision: weight(|m| m.precision),
        recall: weight(|m| m.recall),
        f1: weight(|m| m.f1),
    };

    ClassificationReport {
        accuracy: accuracy(y_true, y_pred),
        total,
        per_class,
        macro_avg,
        weighted_avg,
    }
}

impl ClassificationReport {
    pub fn to_rows(&self) -> Vec<ClassMetricRow> {
        let mut rows: Vec<ClassMetricRow> = self
            .per_class
            .iter()
            .map(|m| ClassMetricRow {
                class: m.category.label().to_string(),
                precision: format_number(m.precision, 2),
                recall: format_number(m.recall, 2),
                f1: format_number(m.f1, 2),
                support: m.support,
            })
            .collect();
        for (name, avg) in [("macro avg", self.macro_avg), ("weighted avg", self.weighted_avg)] {
            rows.push(ClassMetricRow {
                class: name.to_string(),
                precision: format_number(avg.precision, 2),
                recall: format_number(avg.recall, 2),
                f1: format_number(avg.f1, 2),
                support: self.total,
            });
        }
        rows
    }

    /// Plain-text rendering used in the metrics file.
    pub fn render(&self) -> String {
        let mut out = format!(
            "{:>16} {:>10} {:>10} {:>10} {:>10}\n\n",
            "", "precision", "recall", "f1-score", "support"
        );
        for m in &self.per_class {
            out.push_str(&format!(
                "{:>16} {:>10.2} {:>10.2} {:>10.2} {:>10}\n",
                m.category.label(),
                m.precision,
                m.recall,
                m.f1,
                m.support
            ));
        }
        out.push_str(&format!(
            "\n{:>16} {:>10} {:>10} {:>10.2} {:>10}\n",
            "accuracy", "", "", self.accuracy, self.total
        ));
        for (name, avg) in [("macro avg", self.macro_avg), ("weighted avg", self.weighted_avg)] {
            out.push_str(&format!(
                "{:>16} {:>10.2} {:>10.2} {:>10.2} {:>10}\n",
                name, avg.precision, avg.recall, avg.f1, self.total
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use Category::*;

    #[test]
    fn accuracy_is_share_of_matches() {
        assert_eq!(accuracy(&[Health, Security], &[Health, Health]), 0.5);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn per_class_scores() {
        let y_true = [Health, Health, Health, Security, Security, Education];
        let y_pred = [Health, Health, Security, Security, Health, Environment];
        let r = classification_report(&y_true, &y_pred);
        assert_relative_eq!(r.accuracy, 0.5);
        assert_eq!(r.per_class.len(), 4);

        let health = &r.per_class[0];
        assert_eq!(health.category, Health);
        assert_relative_eq!(health.precision, 2.0 / 3.0);
        assert_relative_eq!(health.recall, 2.0 / 3.0);
        assert_eq!(health.support, 3);

        // Never predicted correctly: zero instead of NaN.
        let education = &r.per_class[1];
        assert_eq!(education.precision, 0.0);
        assert_eq!(education.f1, 0.0);

        // Predicted but absent from the truth: support 0.
        let environment = &r.per_class[3];
        assert_eq!(environment.support, 0);
        assert_eq!(r.total, 6);
    }

    #[test]
    fn perfect_predictions_average_to_one() {
        let y = [Health, Education, Security, Environment];
        let r = classification_report(&y, &y);
        assert_relative_eq!(r.macro_avg.f1, 1.0);
        assert_relative_eq!(r.weighted_avg.precision, 1.0);
        assert_eq!(r.to_rows().len(), 6);
        assert!(r.render().contains("weighted avg"));
    }
}
