// Keyword/phrase scoring classifier.
//
// Each category owns a keyword list and a phrase list. A keyword found as a
// substring of the lowercased text adds its weight, a phrase adds
// `PHRASE_WEIGHT`. The best-scoring category wins; ties go to the category
// declared first, and a text that matches nothing gets the default category.
use crate::classifier::{ClassificationResult, Classifier};
use crate::types::Category;
use once_cell::sync::Lazy;

pub const STRONG_WEIGHT: u32 = 3;
pub const CATEGORY_NAME_WEIGHT: u32 = 2;
pub const BASE_WEIGHT: u32 = 1;
pub const PHRASE_WEIGHT: u32 = 5;

/// Category returned when no keyword or phrase matches.
pub const DEFAULT_CATEGORY: Category = Category::Security;

const STRONG_TERMS: &[&str] = &[
    "médico",
    "hospital",
    "escuela",
    "profesor",
    "delincuencia",
    "policía",
    "basura",
    "contaminación",
];

const CATEGORY_NAME_TERMS: &[&str] = &["salud", "educación", "seguridad", "medio ambiente"];

const KEYWORDS: [(Category, &[&str]); 4] = [
    (
        Category::Health,
        &[
            "médico",
            "hospital",
            "salud",
            "enfermo",
            "medicina",
            "clínica",
            "doctor",
            "paciente",
            "ambulancia",
            "emergencia médica",
            "farmacia",
            "medicamento",
        ],
    ),
    (
        Category::Education,
        &[
            "escuela",
            "profesor",
            "estudiante",
            "educación",
            "colegio",
            "universidad",
            "maestro",
            "aprender",
            "aula",
            "clase",
            "estudio",
            "académico",
        ],
    ),
    (
        Category::Security,
        &[
            "delincuencia",
            "robo",
            "policía",
            "seguridad",
            "crimen",
            "violencia",
            "peligroso",
            "inseguro",
            "asalto",
            "hurto",
            "patrullaje",
            "vigilancia",
        ],
    ),
    (
        Category::Environment,
        &[
            "basura",
            "contaminación",
            "río",
            "aire",
            "limpio",
            "reciclaje",
            "verde",
            "ecológico",
            "residuos",
            "desechos",
            "polución",
            "sostenible",
        ],
    ),
];

const PHRASES: [(Category, &[&str]); 4] = [
    (
        Category::Health,
        &[
            "falta de médicos",
            "centro de salud",
            "atención médica",
            "servicio de salud",
        ],
    ),
    (
        Category::Education,
        &[
            "falta de profesores",
            "centro educativo",
            "infraestructura educativa",
            "servicio educativo",
        ],
    ),
    (
        Category::Security,
        &[
            "falta de seguridad",
            "patrullaje",
            "vigilancia",
            "servicio de seguridad",
        ],
    ),
    (
        Category::Environment,
        &[
            "recolección de basura",
            "limpieza",
            "gestión de residuos",
            "servicio ambiental",
        ],
    ),
];

/// Weighted terms for one category, with keyword weights resolved up front.
#[derive(Debug)]
struct CategoryTerms {
    category: Category,
    keywords: Vec<(&'static str, u32)>,
    phrases: Vec<&'static str>,
}

static TABLE: Lazy<Vec<CategoryTerms>> = Lazy::new(|| {
    KEYWORDS
        .iter()
        .zip(PHRASES.iter())
        .map(|((category, words), (_, phrases))| CategoryTerms {
            category: *category,
            keywords: words.iter().map(|w| (*w, keyword_weight(w))).collect(),
            phrases: phrases.to_vec(),
        })
        .collect()
});

fn keyword_weight(word: &str) -> u32 {
    if STRONG_TERMS.contains(&word) {
        STRONG_WEIGHT
    } else if CATEGORY_NAME_TERMS.contains(&word) {
        CATEGORY_NAME_WEIGHT
    } else {
        BASE_WEIGHT
    }
}

/// Strong keywords of a category (weight 3 terms present in its list).
#[cfg(test)]
pub fn strong_keywords(category: Category) -> Vec<&'static str> {
    TABLE
        .iter()
        .filter(|t| t.category == category)
        .flat_map(|t| t.keywords.iter())
        .filter(|(_, w)| *w == STRONG_WEIGHT)
        .map(|(k, _)| *k)
        .collect()
}

#[derive(Debug, Clone)]
pub struct LexicalClassifier {
    default_category: Category,
}

impl Default for LexicalClassifier {
    fn default() -> Self {
        Self {
            default_category: DEFAULT_CATEGORY,
        }
    }
}

impl LexicalClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the category returned for texts that match nothing.
    pub fn with_default(mut self, category: Category) -> Self {
        self.default_category = category;
        self
    }

    /// Score of every category, indexed by `Category::index`.
    pub fn scores(&self, text: &str) -> [u32; 4] {
        let lower = text.to_lowercase();
        let mut scores = [0u32; 4];
        for terms in TABLE.iter() {
            let slot = &mut scores[terms.category.index()];
            for (word, weight) in &terms.keywords {
                if lower.contains(word) {
                    *slot += weight;
                }
            }
            for phrase in &terms.phrases {
                if lower.contains(phrase) {
                    *slot += PHRASE_WEIGHT;
                }
            }
        }
        scores
    }

    /// Winning category and its share of the total score (0 when nothing
    /// matched and the default was used).
    pub fn classify_scored(&self, text: &str) -> (Category, f64) {
        let scores = self.scores(text);
        let total: u32 = scores.iter().sum();
        if total == 0 {
            return (self.default_category, 0.0);
        }
        // Strict `>` keeps the first category on ties.
        let mut best = Category::ALL[0];
        for c in Category::ALL.iter().skip(1) {
            if scores[c.index()] > scores[best.index()] {
                best = *c;
            }
        }
        (best, scores[best.index()] as f64 / total as f64)
    }
}

impl Classifier for LexicalClassifier {
    fn name(&self) -> &str {
        "Lexical (Gemini simulado)"
    }

    fn classify(&self, text: &str) -> Category {
        self.classify_scored(text).0
    }

    fn classify_detailed(&self, text: &str) -> ClassificationResult {
        let (category, confidence) = self.classify_scored(text);
        ClassificationResult {
            category,
            classifier: self.name().to_string(),
            score: Some(confidence),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_keywords_classify_as_their_category() {
        let clf = LexicalClassifier::new();
        for c in Category::ALL {
            let strong = strong_keywords(c);
            assert_eq!(strong.len(), 2, "{c} should have two strong terms");
            for k in strong {
                assert_eq!(clf.classify(k), c, "keyword {k}");
            }
        }
    }

    #[test]
    fn empty_text_defaults_to_security() {
        let clf = LexicalClassifier::new();
        assert_eq!(clf.classify(""), Category::Security);
        assert_eq!(clf.classify("nada que ver aquí"), Category::Security);
        assert_eq!(clf.classify_scored("").1, 0.0);
    }

    #[test]
    fn default_is_configurable() {
        let clf = LexicalClassifier::new().with_default(Category::Health);
        assert_eq!(clf.classify(""), Category::Health);
    }

    #[test]
    fn doctors_in_hospital_is_health() {
        let clf = LexicalClassifier::new();
        let text = "necesitamos más médicos en el hospital";
        assert_eq!(clf.scores(text)[Category::Health.index()], 6);
        assert_eq!(clf.classify(text), Category::Health);
    }

    #[test]
    fn weights_follow_term_kind() {
        let clf = LexicalClassifier::new();
        // Category-name term.
        assert_eq!(clf.scores("SALUD")[Category::Health.index()], 2);
        // Plain keyword.
        assert_eq!(clf.scores("un enfermo")[Category::Health.index()], 1);
        // "patrullaje" is both a keyword (1) and a phrase (5).
        assert_eq!(clf.scores("patrullaje")[Category::Security.index()], 6);
        // Phrase plus the category-name term it contains.
        assert_eq!(
            clf.scores("el centro de salud")[Category::Health.index()],
            CATEGORY_NAME_WEIGHT + PHRASE_WEIGHT
        );
    }

    #[test]
    fn ties_go_to_first_declared_category() {
        let clf = LexicalClassifier::new();
        // hospital (3) vs escuela (3): Health is declared before Education.
        assert_eq!(clf.classify("hospital y escuela"), Category::Health);
        // escuela (3) vs basura (3): Education before Environment.
        assert_eq!(clf.classify("basura en la escuela"), Category::Education);
        // policía (3) vs basura (3): Security before Environment.
        assert_eq!(clf.classify("basura y policía"), Category::Security);
    }

    #[test]
    fn confidence_is_share_of_total() {
        let clf = LexicalClassifier::new();
        let (c, conf) = clf.classify_scored("hospital y escuela");
        assert_eq!(c, Category::Health);
        assert!((conf - 0.5).abs() < 1e-12);
    }
}
