//! OCR text cleanup
//!
//! Strips recognition artifacts from raw OCR tokens. Brackets, stray
//! punctuation and currency glyphs almost never occur in real place names
//! but show up constantly in misrecognized frame text.

/// Characters treated as OCR noise
pub const NOISE_CHARS: &str = "\"][()|{}_~€$!?%&+,;:><*@¦=#^£\\/´`'";

/// Remove every noise character and trim surrounding whitespace
pub fn normalize(text: &str, noise_chars: &str) -> String {
    let polished: String = text.chars().filter(|c| !noise_chars.contains(*c)).collect();
    polished.trim().to_string()
}

/// Count noise characters in a raw token
pub fn noise_char_count(text: &str, noise_chars: &str) -> usize {
    text.chars().filter(|c| noise_chars.contains(*c)).count()
}

/// True when the token is non-empty and consists solely of digits
pub fn is_pure_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_noise() {
        let cleaned = normalize("[Gare] de (Genève)!", NOISE_CHARS);
        assert!(!cleaned.contains('['));
        assert!(!cleaned.contains(']'));
        assert!(!cleaned.contains('('));
        assert!(!cleaned.contains(')'));
        assert!(!cleaned.contains('!'));
        assert_eq!(cleaned, "Gare de Genève");
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(normalize("  Rue du Rhône  ", NOISE_CHARS), "Rue du Rhône");
    }

    #[test]
    fn test_normalize_empty_noise_set_only_trims() {
        assert_eq!(normalize("  [keep] me  ", ""), "[keep] me");
    }

    #[test]
    fn test_normalize_can_produce_empty_string() {
        assert_eq!(normalize("[?!]", NOISE_CHARS), "");
    }

    #[test]
    fn test_noise_char_count() {
        assert_eq!(noise_char_count("Genève", NOISE_CHARS), 0);
        assert_eq!(noise_char_count("[Genève]", NOISE_CHARS), 2);
        assert_eq!(noise_char_count("{a|b}", NOISE_CHARS), 3);
    }

    #[test]
    fn test_is_pure_digits() {
        assert!(is_pure_digits("1234"));
        assert!(!is_pure_digits("12a4"));
        assert!(!is_pure_digits("Quai 9"));
        assert!(!is_pure_digits(""));
    }
}
