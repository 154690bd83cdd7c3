use unicode_normalization::UnicodeNormalization;

/// Canonicalizes a column name or form-field tag into a comparison key.
///
/// NFKD-decomposes and keeps only the ASCII residue, lower-cases, turns
/// every punctuation character into a space and collapses whitespace, so
/// that `"Entreprise/Commune"` and `"entreprise   commune"` compare equal.
/// Decomposition separates accents from their base letter and the ASCII
/// filter drops them; a character with no ASCII decomposition (`œ`, `ß`)
/// is dropped entirely.
pub fn normalize_key(text: &str) -> String {
    let stripped: String = text.nfkd().filter(char::is_ascii).collect();
    let spaced: String = stripped
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_punctuation() { ' ' } else { c })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation_variants_share_a_key() {
        assert_eq!(
            normalize_key("Entreprise/Commune"),
            normalize_key("entreprise   commune")
        );
        assert_eq!(
            normalize_key("ENTREPRISE-COMMUNE"),
            normalize_key("entreprise commune")
        );
    }

    #[test]
    fn test_diacritics_are_stripped() {
        assert_eq!(normalize_key("Téléphone"), "telephone");
        assert_eq!(normalize_key("Adresse é-mail"), "adresse e mail");
    }

    #[test]
    fn test_non_decomposable_characters_are_dropped() {
        assert_eq!(normalize_key("œuvre"), "uvre");
        assert_eq!(normalize_key("Main-d'œuvre"), "main d uvre");
    }

    #[test]
    fn test_trailing_whitespace_is_trimmed() {
        assert_eq!(normalize_key("Email "), "email");
        assert_eq!(normalize_key("  email"), "email");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_key(""), "");
        assert_eq!(normalize_key("   "), "");
    }
}
