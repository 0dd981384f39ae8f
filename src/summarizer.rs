// Extractive comment summarizer.
//
// Sentences are ranked by how many problem-framing keywords they mention and
// the best two are stitched together while the result stays short enough.
use crate::util::truncate_chars;

/// Candidates of this many characters or fewer are fragments, not sentences.
pub const MIN_SENTENCE_CHARS: usize = 10;
pub const MAX_SENTENCES: usize = 2;
pub const DEFAULT_MAX_LENGTH: usize = 100;
const SEPARATOR: &str = ". ";

const PROBLEM_KEYWORDS: &[&str] = &[
    "problema",
    "falta",
    "necesitamos",
    "requerimos",
    "urgente",
    "importante",
];

/// Number of problem-framing keywords present in `sentence`.
pub fn sentence_score(sentence: &str) -> usize {
    let lower = sentence.to_lowercase();
    PROBLEM_KEYWORDS.iter().filter(|k| lower.contains(*k)).count()
}

fn candidates(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .collect()
}

/// Summarize `text` in fewer than `max_length` characters where possible.
///
/// Falls back to the first `max_length` characters of `text` when no
/// sentence qualifies or the best one alone is too long.
pub fn summarize(text: &str, max_length: usize) -> String {
    let mut scored: Vec<(&str, usize)> = candidates(text)
        .into_iter()
        .map(|s| (s, sentence_score(s)))
        .collect();
    // Stable: equal scores keep their order of appearance.
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    let mut summary = String::new();
    let mut len = 0usize;
    for (sentence, _) in scored.into_iter().take(MAX_SENTENCES) {
        let sep = if summary.is_empty() { 0 } else { SEPARATOR.len() };
        let next = len + sep + sentence.chars().count();
        if next >= max_length {
            break;
        }
        if !summary.is_empty() {
            summary.push_str(SEPARATOR);
        }
        summary.push_str(sentence);
        len = next;
    }

    if summary.is_empty() {
        truncate_chars(text, max_length)
    } else {
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_most_problematic_sentences_first() {
        let text = "Vivo en el barrio hace años. Hay un problema grave con la falta de agua. \
                    Necesitamos ayuda urgente del municipio.";
        let s = summarize(text, 200);
        assert_eq!(
            s,
            "Hay un problema grave con la falta de agua. Necesitamos ayuda urgente del municipio"
        );
    }

    #[test]
    fn ties_keep_input_order() {
        let text = "Primera oración sin nada. Segunda oración tampoco. Tercera también igual.";
        assert_eq!(
            summarize(text, 200),
            "Primera oración sin nada. Segunda oración tampoco"
        );
    }

    #[test]
    fn drops_fragments_and_falls_back_to_prefix() {
        let text = "Hola. Sí. Gracias.";
        assert_eq!(summarize(text, 8), "Hola. Sí");
        assert_eq!(summarize("", 10), "");
    }

    #[test]
    fn second_sentence_is_skipped_when_it_would_overflow() {
        let text = "Tenemos un problema enorme aquí. Otra oración bastante larga que no cabe.";
        assert_eq!(summarize(text, 40), "Tenemos un problema enorme aquí");
    }

    #[test]
    fn overlong_best_sentence_falls_back_to_truncation() {
        let text = "Esta es una oración demasiado larga para el límite elegido";
        let s = summarize(text, 20);
        assert_eq!(s.chars().count(), 20);
        assert_eq!(s, truncate_chars(text, 20));
    }

    #[test]
    fn output_never_exceeds_limit() {
        let texts = [
            "necesitamos más médicos en el hospital",
            "Hay mucha basura. Falta recolección. Es un problema importante para todos nosotros.",
            "sin puntuación pero con un texto bastante largo que supera el límite de caracteres",
        ];
        for t in texts {
            for n in [5, 20, 50, 100] {
                assert!(summarize(t, n).chars().count() <= n, "{t} / {n}");
            }
        }
    }

    #[test]
    fn summarizing_a_summary_is_stable() {
        let texts = [
            "Vivo en el barrio hace años. Hay un problema grave con la falta de agua. \
             Necesitamos ayuda urgente del municipio.",
            "necesitamos más médicos en el hospital",
            "Hola. Sí. Gracias.",
        ];
        for t in texts {
            let once = summarize(t, DEFAULT_MAX_LENGTH);
            assert_eq!(summarize(&once, DEFAULT_MAX_LENGTH), once, "{t}");
        }
    }

    #[test]
    fn handles_multibyte_text() {
        let text = "¿Dónde está la ambulancia? ¡Falta atención médica urgente!";
        assert_eq!(
            summarize(text, 100),
            "¡Falta atención médica urgente. ¿Dónde está la ambulancia"
        );
    }

    #[test]
    fn separator_counts_toward_the_limit() {
        // 27 + 21 characters fit under 50, but not with the ". " between them.
        let text = "Hay un problema con el agua. Falta luz en la calle.";
        assert_eq!(summarize(text, 50), "Hay un problema con el agua");
        assert_eq!(
            summarize(text, 51),
            "Hay un problema con el agua. Falta luz en la calle"
        );
    }
}
