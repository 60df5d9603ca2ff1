// src/matching/normalize.rs

const GENERIC_TOKEN: &str = "restaurant";

/// Canonical form of a display name for comparison: lower-cased, with every
/// occurrence of "restaurant" removed. Whitespace is left as is.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().replace(GENERIC_TOKEN, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_without_generic_token() {
        assert_eq!(normalize_name("Joe's Diner"), "joe's diner");
    }

    #[test]
    fn strips_generic_token_in_any_case() {
        assert_eq!(normalize_name("RESTAURANT Le Louis"), " le louis");
        assert_eq!(normalize_name("Chez Marie Restaurant"), "chez marie ");
    }

    #[test]
    fn empty_name_stays_empty() {
        assert_eq!(normalize_name(""), "");
    }
}
