// Priority scoring for a complaint.
//
// Scores are kept in integer hundredths so that tier boundaries compare
// exactly (0.5 + 0.1 must land on the 0.6 threshold, not just below it).
use crate::error::Result;
use crate::types::{Category, Urgency};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

pub const BASE_POINTS: u32 = 50;
pub const URGENT_POINTS: u32 = 30;
pub const NOT_URGENT_POINTS: u32 = 10;
pub const PRIORITY_CITY_POINTS: u32 = 20;

pub const PRIORITY_CITIES: &[&str] = &["Bogotá", "Manizales", "Medellín"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PriorityTier {
    #[serde(rename = "critica")]
    Critical,
    #[serde(rename = "alta")]
    High,
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "baja")]
    Low,
}

/// `(minimum points, tier)` in descending threshold order. The last entry
/// has a zero floor, so every score resolves to a tier.
pub const TIER_TABLE: &[(u32, PriorityTier)] = &[
    (80, PriorityTier::Critical),
    (60, PriorityTier::High),
    (40, PriorityTier::Medium),
    (0, PriorityTier::Low),
];

impl PriorityTier {
    pub fn label(self) -> &'static str {
        match self {
            PriorityTier::Critical => "critica",
            PriorityTier::High => "alta",
            PriorityTier::Medium => "media",
            PriorityTier::Low => "baja",
        }
    }

    /// Response-time commitment.
    pub fn sla(self) -> &'static str {
        match self {
            PriorityTier::Critical => "24 horas",
            PriorityTier::High => "48 horas",
            PriorityTier::Medium => "1 semana",
            PriorityTier::Low => "2 semanas",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            PriorityTier::Critical => "#FF0000",
            PriorityTier::High => "#FF8C00",
            PriorityTier::Medium => "#FFD700",
            PriorityTier::Low => "#32CD32",
        }
    }

    pub fn threshold(self) -> f64 {
        TIER_TABLE
            .iter()
            .find(|(_, t)| *t == self)
            .map(|(p, _)| *p as f64 / 100.0)
            .unwrap_or(0.0)
    }

    /// Critical and high tiers act on the immediate solution list.
    pub fn is_pressing(self) -> bool {
        matches!(self, PriorityTier::Critical | PriorityTier::High)
    }

    pub fn from_points(points: u32) -> PriorityTier {
        TIER_TABLE
            .iter()
            .find(|(min, _)| points >= *min)
            .map(|(_, t)| *t)
            .unwrap_or(PriorityTier::Low)
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Priority {
    pub tier: PriorityTier,
    pub score: f64,
    pub sla: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone)]
pub struct PriorityScorer {
    priority_cities: HashSet<String>,
}

impl Default for PriorityScorer {
    fn default() -> Self {
        Self::with_cities(PRIORITY_CITIES.iter().copied())
    }
}

impl PriorityScorer {
    pub fn with_cities<I, S>(cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            priority_cities: cities.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_priority_city(&self, city: &str) -> bool {
        self.priority_cities.contains(city.trim())
    }

    /// Score a complaint. The category is part of the contract but carries no
    /// weight of its own.
    pub fn score(&self, _category: Category, urgency: Urgency, city: &str) -> Priority {
        let mut points = BASE_POINTS;
        points += match urgency {
            Urgency::Urgent => URGENT_POINTS,
            Urgency::NotUrgent => NOT_URGENT_POINTS,
        };
        if self.is_priority_city(city) {
            points += PRIORITY_CITY_POINTS;
        }
        let tier = PriorityTier::from_points(points);
        Priority {
            tier,
            score: points as f64 / 100.0,
            sla: tier.sla(),
            color: tier.color(),
        }
    }

    /// Same as [`PriorityScorer::score`] for labels as they appear in the
    /// CSV; unknown labels are errors.
    pub fn score_labels(&self, category: &str, urgency: &str, city: &str) -> Result<Priority> {
        Ok(self.score(category.parse()?, urgency.parse()?, city))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TriageError;

    #[test]
    fn urgent_in_priority_city_is_critical() {
        let s = PriorityScorer::default();
        for c in Category::ALL {
            let p = s.score(c, Urgency::Urgent, "Bogotá");
            assert_eq!(p.score, 1.0);
            assert_eq!(p.tier, PriorityTier::Critical);
            assert_eq!(p.sla, "24 horas");
            assert_eq!(p.color, "#FF0000");
        }
    }

    #[test]
    fn high_threshold_is_inclusive() {
        let s = PriorityScorer::default();
        let p = s.score(Category::Health, Urgency::NotUrgent, "some-other-city");
        assert_eq!(p.score, 0.6);
        assert_eq!(p.tier, PriorityTier::High);
        assert_eq!(p.sla, "48 horas");
    }

    #[test]
    fn every_combination_lands_in_range_and_one_tier() {
        let s = PriorityScorer::default();
        for c in Category::ALL {
            for u in [Urgency::Urgent, Urgency::NotUrgent] {
                for city in ["Bogotá", "Medellín", "Cali", ""] {
                    let p = s.score(c, u, city);
                    assert!((0.5..=1.0).contains(&p.score));
                    let matching = TIER_TABLE
                        .iter()
                        .filter(|(min, _)| (p.score * 100.0).round() as u32 >= *min)
                        .count();
                    assert!(matching >= 1);
                    assert_eq!(PriorityTier::from_points((p.score * 100.0).round() as u32), p.tier);
                }
            }
        }
    }

    #[test]
    fn urgent_elsewhere_and_calm_priority_city() {
        let s = PriorityScorer::default();
        assert_eq!(s.score(Category::Security, Urgency::Urgent, "Cali").tier, PriorityTier::Critical);
        assert_eq!(
            s.score(Category::Security, Urgency::NotUrgent, "Medellín").tier,
            PriorityTier::Critical
        );
    }

    #[test]
    fn tier_table_is_descending_with_zero_floor() {
        assert!(TIER_TABLE.windows(2).all(|w| w[0].0 > w[1].0));
        assert_eq!(TIER_TABLE.last().map(|(p, _)| *p), Some(0));
        assert_eq!(PriorityTier::from_points(39), PriorityTier::Low);
        assert_eq!(PriorityTier::from_points(40), PriorityTier::Medium);
        assert_eq!(PriorityTier::Medium.threshold(), 0.4);
    }

    #[test]
    fn custom_city_set() {
        let s = PriorityScorer::with_cities(["Pasto"]);
        assert!(s.is_priority_city(" Pasto "));
        assert!(!s.is_priority_city("Bogotá"));
    }

    #[test]
    fn labels_are_validated() {
        let s = PriorityScorer::default();
        assert_eq!(
            s.score_labels("Salud", "Urgente", "Manizales").unwrap().tier,
            PriorityTier::Critical
        );
        assert!(matches!(
            s.score_labels("Transporte", "Urgente", "Cali"),
            Err(TriageError::UnknownCategory(_))
        ));
        assert!(matches!(
            s.score_labels("Salud", "pronto", "Cali"),
            Err(TriageError::UnknownUrgency(_))
        ));
    }
}
