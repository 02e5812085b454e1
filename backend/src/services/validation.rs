//! Field validation and normalisation for incoming entities
//!
//! Every check appends a human readable message instead of failing fast, so a
//! caller sees all problems with an input at once.

use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_NAME_LENGTH: usize = 255;

pub const NAME_REQUIRED: &str = "Name is required.";
pub const NAME_TOO_LONG: &str = "Name must be at most 255 characters.";
pub const INVALID_PHONE: &str = "Phone number must be +<digits> or 123-456-7890 format.";
pub const EMAIL_REQUIRED: &str = "Email is required.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const EMAIL_EXISTS: &str = "Email already exists.";
pub const DUPLICATE_EMAIL: &str = "Duplicate email within request.";

/// `+` followed by 7-15 digits, or `123-456-7890`
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\+[0-9]{7,15}|[0-9]{3}-[0-9]{3}-[0-9]{4})$").expect("valid regex")
});

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$",
    )
    .expect("valid regex")
});

/// Check a phone number. Empty means "no phone" and is accepted.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.is_empty() || PHONE_RE.is_match(phone)
}

/// Check an already lower-cased email address
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Trim a name and record problems with it
pub fn clean_name(raw: &str, errors: &mut Vec<String>) -> String {
    let name = raw.trim();
    if name.is_empty() {
        errors.push(NAME_REQUIRED.to_string());
    } else if name.chars().count() > MAX_NAME_LENGTH {
        errors.push(NAME_TOO_LONG.to_string());
    }
    name.to_string()
}

/// Trim an optional phone number (absent becomes empty) and validate it
pub fn clean_phone(raw: Option<&str>, errors: &mut Vec<String>) -> String {
    let phone = raw.map(str::trim).unwrap_or_default();
    if !is_valid_phone(phone) {
        errors.push(INVALID_PHONE.to_string());
    }
    phone.to_string()
}

/// Normalise an email address: trimmed and lower-cased
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Validate the shape of a normalised email. Returns `false` if a message
/// was recorded.
pub fn check_email_format(email: &str, errors: &mut Vec<String>) -> bool {
    if email.is_empty() {
        errors.push(EMAIL_REQUIRED.to_string());
        false
    } else if !is_valid_email(email) {
        errors.push(INVALID_EMAIL.to_string());
        false
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_formats() {
        assert!(is_valid_phone("+1234567"));
        assert!(is_valid_phone("+123456789012345"));
        assert!(is_valid_phone("123-456-7890"));
        assert!(is_valid_phone(""));

        assert!(!is_valid_phone("+123456"));
        assert!(!is_valid_phone("+1234567890123456"));
        assert!(!is_valid_phone("1234567890"));
        assert!(!is_valid_phone("123-4567-890"));
        assert!(!is_valid_phone("(123) 456-7890"));
        assert!(!is_valid_phone("+١٢٣٤٥٦٧٨"));
    }

    #[test]
    fn test_email_formats() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.co.uk"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@example"));
        assert!(!is_valid_email("al ice@example.com"));
    }

    #[test]
    fn test_clean_name() {
        let mut errors = Vec::new();
        assert_eq!(clean_name("  Alice  ", &mut errors), "Alice");
        assert!(errors.is_empty());

        clean_name("   ", &mut errors);
        assert_eq!(errors, vec![NAME_REQUIRED]);

        errors.clear();
        clean_name(&"x".repeat(256), &mut errors);
        assert_eq!(errors, vec![NAME_TOO_LONG]);
    }

    #[test]
    fn test_clean_phone_trims_and_defaults() {
        let mut errors = Vec::new();
        assert_eq!(clean_phone(None, &mut errors), "");
        assert_eq!(clean_phone(Some(" +1234567890 "), &mut errors), "+1234567890");
        assert!(errors.is_empty());

        clean_phone(Some("12345"), &mut errors);
        assert_eq!(errors, vec![INVALID_PHONE]);
    }

    #[test]
    fn test_email_checks() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");

        let mut errors = Vec::new();
        assert!(!check_email_format("", &mut errors));
        assert!(!check_email_format("nope", &mut errors));
        assert_eq!(errors, vec![EMAIL_REQUIRED, INVALID_EMAIL]);
    }
}
