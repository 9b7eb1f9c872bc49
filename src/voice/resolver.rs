/// Spanish number words the recognizer commonly emits for quiz answers.
const NUMBER_WORDS: &[(&str, u32)] = &[
    ("cero", 0),
    ("uno", 1),
    ("dos", 2),
    ("tres", 3),
    ("cuatro", 4),
    ("cinco", 5),
    ("seis", 6),
    ("siete", 7),
    ("ocho", 8),
    ("nueve", 9),
    ("diez", 10),
    ("once", 11),
    ("doce", 12),
    ("trece", 13),
    ("catorce", 14),
    ("quince", 15),
    ("veinte", 20),
    ("treinta", 30),
    ("cuarenta", 40),
    ("cincuenta", 50),
    ("sesenta", 60),
    ("setenta", 70),
    ("ochenta", 80),
    ("noventa", 90),
    ("cien", 100),
];

pub fn number_word(word: &str) -> Option<u32> {
    NUMBER_WORDS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|&(_, n)| n)
}

/// Scan a transcript for a token equal to `expected`, either as digits or
/// as a number word. Only a match is reported; anything else is `None`.
pub fn resolve_spoken_answer(transcript: &str, expected: u32) -> Option<u32> {
    let normalized = transcript.trim().to_lowercase();
    normalized
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| c.is_ascii_punctuation() || c == '¿' || c == '¡'))
        .find_map(|token| {
            let literal = token.parse::<u32>().ok();
            let word = number_word(token);
            [literal, word].into_iter().flatten().find(|&n| n == expected)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_inside_sentence() {
        assert_eq!(resolve_spoken_answer("tengo cinco gatos", 5), Some(5));
    }

    #[test]
    fn test_wrong_word_is_none() {
        assert_eq!(resolve_spoken_answer("siete", 8), None);
    }

    #[test]
    fn test_digits_match() {
        assert_eq!(resolve_spoken_answer("es 42", 42), Some(42));
        assert_eq!(resolve_spoken_answer("42", 24), None);
    }

    #[test]
    fn test_case_and_whitespace_are_ignored() {
        assert_eq!(resolve_spoken_answer("  Cuarenta  ", 40), Some(40));
        assert_eq!(resolve_spoken_answer("CIEN\tpuntos", 100), Some(100));
    }

    #[test]
    fn test_trailing_punctuation_is_ignored() {
        assert_eq!(resolve_spoken_answer("¡Treinta!", 30), Some(30));
        assert_eq!(resolve_spoken_answer("creo que 18.", 18), Some(18));
    }

    #[test]
    fn test_any_matching_token_wins() {
        assert_eq!(resolve_spoken_answer("seis no ocho", 8), Some(8));
        assert_eq!(resolve_spoken_answer("dos dos dos", 2), Some(2));
    }

    #[test]
    fn test_empty_and_partial_transcripts() {
        assert_eq!(resolve_spoken_answer("", 5), None);
        assert_eq!(resolve_spoken_answer("   ", 0), None);
        assert_eq!(resolve_spoken_answer("cin", 5), None);
    }

    #[test]
    fn test_zero_is_resolvable() {
        assert_eq!(resolve_spoken_answer("cero", 0), Some(0));
    }

    #[test]
    fn test_compound_numbers_are_not_guessed() {
        // "treinta y cinco" resolves token by token, never to 35.
        assert_eq!(resolve_spoken_answer("treinta y cinco", 35), None);
        assert_eq!(resolve_spoken_answer("treinta y cinco", 5), Some(5));
    }
}
