use lazy_static::lazy_static;
use regex::Regex;

use crate::shared::constants::MAX_IDENTIFIER_LENGTH;

lazy_static! {
    /// Regex for validating catalogue identifiers (provinces and departments)
    /// Must be lowercase alphanumeric with hyphens
    /// - Valid: "estuaire", "komo-mondah", "haut-ogooue"
    /// - Invalid: "-komo", "komo-", "komo--ocean", "Komo", "komo_ocean"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// Returns true when `id` is a well-formed catalogue identifier.
pub fn is_valid_identifier(id: &str) -> bool {
    id.len() <= MAX_IDENTIFIER_LENGTH && SLUG_REGEX.is_match(id)
}

/// `validator` custom hook for optional identifier fields in request DTOs.
pub fn validate_identifier(id: &str) -> Result<(), validator::ValidationError> {
    if is_valid_identifier(id) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_identifier"))
    }
}

/// Lowercases and strips the French diacritics found in territory names so that
/// "ogooue" matches "Ogooué" and "lope" matches "Lopé".
pub fn fold_for_search(input: &str) -> String {
    input
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            '\'' | '’' => ' ',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_regex_valid() {
        assert!(SLUG_REGEX.is_match("estuaire"));
        assert!(SLUG_REGEX.is_match("komo-mondah"));
        assert!(SLUG_REGEX.is_match("ogooue-et-des-lacs"));
        assert!(SLUG_REGEX.is_match("g1"));
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-komo")); // starts with hyphen
        assert!(!SLUG_REGEX.is_match("komo-")); // ends with hyphen
        assert!(!SLUG_REGEX.is_match("komo--ocean")); // double hyphen
        assert!(!SLUG_REGEX.is_match("Komo")); // uppercase
        assert!(!SLUG_REGEX.is_match("komo_ocean")); // underscore
        assert!(!SLUG_REGEX.is_match("")); // empty
        assert!(!SLUG_REGEX.is_match("komo ocean")); // space
    }

    #[test]
    fn test_identifier_length_limit() {
        let long = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        assert!(!is_valid_identifier(&long));
        assert!(is_valid_identifier("noya"));
        assert!(validate_identifier("Noya").is_err());
    }

    #[test]
    fn test_fold_for_search() {
        assert_eq!(fold_for_search("Ogooué-Létili"), "ogooue-letili");
        assert_eq!(fold_for_search("Mékambo"), "mekambo");
        assert_eq!(fold_for_search("KOMO"), "komo");
    }
}
