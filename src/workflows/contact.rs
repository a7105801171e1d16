use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Exactly 11 ASCII digits, no separators or country code
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{11}$").unwrap());

/// Check a phone number against the 11-digit rule.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Contact person for a business. Always replaced as a whole, never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: Option<String>,
    pub phone: Option<String>,
}

impl Contact {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            phone: Some(phone.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none()
    }

    pub fn verify_number(&self) -> bool {
        self.phone.as_deref().is_some_and(is_valid_phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eleven_digits_are_valid() {
        assert!(is_valid_phone("12345678901"));
        assert!(is_valid_phone("00000000000"));
    }

    #[test]
    fn test_wrong_length_is_invalid() {
        assert!(!is_valid_phone("1234567890"));
        assert!(!is_valid_phone("123456789012"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn test_separators_and_prefixes_are_invalid() {
        assert!(!is_valid_phone("123-4567890"));
        assert!(!is_valid_phone("+1234567890"));
        assert!(!is_valid_phone("1234567890a"));
        assert!(!is_valid_phone("12345678901\n"));
        assert!(!is_valid_phone(" 12345678901"));
    }

    #[test]
    fn test_non_ascii_digits_are_invalid() {
        // Arabic-Indic digits
        assert!(!is_valid_phone("١٢٣٤٥٦٧٨٩٠١"));
    }

    #[test]
    fn test_contact_verify_number() {
        assert!(Contact::new("Joe", "98765432100").verify_number());
        assert!(!Contact::new("Joe", "987").verify_number());
        assert!(!Contact::default().verify_number());
        assert!(Contact::default().is_empty());
    }
}
