use crate::error::TriageError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// Problem category of a complaint. The declaration order is the order used
/// for every deterministic tie-break in the classifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Salud")]
    Health,
    #[serde(rename = "Educación")]
    Education,
    #[serde(rename = "Seguridad")]
    Security,
    #[serde(rename = "Medio Ambiente")]
    Environment,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Health,
        Category::Education,
        Category::Security,
        Category::Environment,
    ];

    /// Label as it appears in the input CSV.
    pub fn label(self) -> &'static str {
        match self {
            Category::Health => "Salud",
            Category::Education => "Educación",
            Category::Security => "Seguridad",
            Category::Environment => "Medio Ambiente",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Category::Health => 0,
            Category::Education => 1,
            Category::Security => 2,
            Category::Environment => 3,
        }
    }

    pub fn from_index(i: usize) -> Option<Category> {
        Category::ALL.get(i).copied()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(s) || format!("{:?}", c).eq_ignore_ascii_case(s))
            .ok_or_else(|| TriageError::UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Urgency {
    #[serde(rename = "Urgente")]
    Urgent,
    #[serde(rename = "No urgente")]
    NotUrgent,
}

impl Urgency {
    pub fn label(self) -> &'static str {
        match self {
            Urgency::Urgent => "Urgente",
            Urgency::NotUrgent => "No urgente",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Urgency {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "urgente" | "urgent" => Ok(Urgency::Urgent),
            "no urgente" | "not urgent" => Ok(Urgency::NotUrgent),
            _ => Err(TriageError::UnknownUrgency(s.trim().to_string())),
        }
    }
}

/// One CSV row exactly as read. Every column is optional so that a single
/// malformed cell does not reject the row before cleaning.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Comentario")]
    pub comment: Option<String>,
    #[serde(rename = "Categoría del problema")]
    pub category: Option<String>,
    #[serde(rename = "Nivel de urgencia")]
    pub urgency: Option<String>,
    #[serde(rename = "Ciudad")]
    pub city: Option<String>,
    #[serde(rename = "Edad")]
    pub age: Option<String>,
    #[serde(rename = "Fecha del reporte")]
    pub report_date: Option<String>,
    #[serde(rename = "Acceso a internet")]
    pub internet_access: Option<String>,
    #[serde(rename = "Atención previa del gobierno")]
    pub prior_attention: Option<String>,
    #[serde(rename = "Zona rural")]
    pub rural_zone: Option<String>,
    #[serde(rename = "Género")]
    pub gender: Option<String>,
}

/// A typed complaint that may still have gaps (missing age, comment, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReport {
    pub comment: Option<String>,
    pub category: Category,
    pub urgency: Urgency,
    pub city: String,
    pub age: Option<f64>,
    pub report_date: Option<NaiveDate>,
    pub internet_access: bool,
    pub prior_attention: bool,
    pub rural_zone: bool,
    pub gender: Option<String>,
}

/// A cleaned complaint: comment, age and gender are always present.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub comment: String,
    pub category: Category,
    pub urgency: Urgency,
    pub city: String,
    pub age: f64,
    pub report_date: Option<NaiveDate>,
    pub internet_access: bool,
    pub prior_attention: bool,
    pub rural_zone: bool,
    pub gender: String,
}

impl From<&Report> for ParsedReport {
    fn from(r: &Report) -> Self {
        ParsedReport {
            comment: Some(r.comment.clone()),
            category: r.category,
            urgency: r.urgency,
            city: r.city.clone(),
            age: Some(r.age),
            report_date: r.report_date,
            internet_access: r.internet_access,
            prior_attention: r.prior_attention,
            rural_zone: r.rural_zone,
            gender: Some(r.gender.clone()),
        }
    }
}

/// Row of the exported cleaned dataset. The input columns keep their
/// names so the file can be loaded again; derived columns are appended.
#[derive(Debug, Serialize)]
pub struct CleanRow {
    #[serde(rename = "Comentario")]
    pub comment: String,
    #[serde(rename = "Categoría del problema")]
    pub category: Category,
    #[serde(rename = "Nivel de urgencia")]
    pub urgency: Urgency,
    #[serde(rename = "Ciudad")]
    pub city: String,
    #[serde(rename = "Edad")]
    pub age: f64,
    #[serde(rename = "Fecha del reporte")]
    pub report_date: String,
    #[serde(rename = "Acceso a internet")]
    pub internet_access: u8,
    #[serde(rename = "Atención previa del gobierno")]
    pub prior_attention: u8,
    #[serde(rename = "Zona rural")]
    pub rural_zone: u8,
    #[serde(rename = "Género")]
    pub gender: String,
    #[serde(rename = "Año")]
    pub year: Option<i32>,
    #[serde(rename = "Mes")]
    pub month: Option<u32>,
    #[serde(rename = "Tiene_Internet")]
    pub has_internet: &'static str,
    #[serde(rename = "Atencion_Gobierno")]
    pub government_attention: &'static str,
    #[serde(rename = "Es_Zona_Rural")]
    pub is_rural: &'static str,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DistributionRow {
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: String,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share %")]
    pub share: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ZoneAccessRow {
    #[tabled(rename = "Zona rural")]
    pub zone: String,
    #[tabled(rename = "No %")]
    pub no_pct: String,
    #[tabled(rename = "Si %")]
    pub yes_pct: String,
    #[tabled(rename = "Reports")]
    pub total: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct AgeByCategoryRow {
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "MeanAge")]
    pub mean_age: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ModelComparisonRow {
    #[tabled(rename = "Model")]
    pub model: String,
    #[tabled(rename = "Accuracy %")]
    pub accuracy: String,
    #[tabled(rename = "MacroF1")]
    pub macro_f1: String,
    #[tabled(rename = "TestSize")]
    pub test_size: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ClassMetricRow {
    #[tabled(rename = "Class")]
    pub class: String,
    #[tabled(rename = "Precision")]
    pub precision: String,
    #[tabled(rename = "Recall")]
    pub recall: String,
    #[tabled(rename = "F1")]
    pub f1: String,
    #[tabled(rename = "Support")]
    pub support: usize,
}

#[derive(Debug, Serialize, Clone)]
pub struct SampleRow {
    #[serde(rename = "Comentario")]
    pub comment: String,
    #[serde(rename = "Categoría del problema")]
    pub category: Category,
    #[serde(rename = "Categoria_Lexica")]
    pub lexical_category: Category,
    #[serde(rename = "Resumen")]
    pub summary: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SolutionSummaryRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Problems")]
    #[tabled(rename = "Problems")]
    pub problems: usize,
    #[serde(rename = "CriticalOrHigh")]
    #[tabled(rename = "CriticalOrHigh")]
    pub critical: usize,
    #[serde(rename = "BudgetCOP")]
    #[tabled(rename = "Budget (COP)")]
    pub budget: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_reports: usize,
    pub total_categories: usize,
    pub total_cities: usize,
    pub urgent_reports: usize,
    pub missing_comments: usize,
    pub median_age: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_parse_back() {
        for c in Category::ALL {
            assert_eq!(c.label().parse::<Category>().unwrap(), c);
            assert_eq!(Category::from_index(c.index()), Some(c));
        }
        assert_eq!(" Medio Ambiente ".parse::<Category>().unwrap(), Category::Environment);
        assert_eq!("health".parse::<Category>().unwrap(), Category::Health);
    }

    #[test]
    fn unknown_category_is_an_error() {
        let err = "Transporte".parse::<Category>().unwrap_err();
        assert!(matches!(err, TriageError::UnknownCategory(ref s) if s == "Transporte"));
    }

    #[test]
    fn urgency_labels() {
        assert_eq!("Urgente".parse::<Urgency>().unwrap(), Urgency::Urgent);
        assert_eq!("no urgente".parse::<Urgency>().unwrap(), Urgency::NotUrgent);
        assert!(matches!("Mañana".parse::<Urgency>(), Err(TriageError::UnknownUrgency(_))));
    }
}
