//! Personal data masking for log output.
//!
//! Inbound questions are logged for diagnostics, so identifiers are masked
//! before any text reaches a log line. Masking is pattern-based and errs on
//! the side of over-masking: a false positive costs a little log
//! readability, a false negative leaks personal data.

use std::sync::LazyLock;

use regex::Regex;

static CPF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{3}\.?\d{3}\.?\d{3}-?\d{2}\b").expect("valid CPF regex")
});

static REGISTRATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{5,9}\b").expect("valid registration regex"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email regex")
});

/// Mask document numbers, registration numbers, and email addresses.
///
/// CPF numbers (11-digit Brazilian taxpayer IDs, dotted or bare) are masked
/// before the shorter registration pattern so a CPF is never half-masked.
pub fn mask_sensitive(text: &str) -> String {
    let masked = CPF.replace_all(text, "[cpf]");
    let masked = EMAIL.replace_all(&masked, "[email]");
    let masked = REGISTRATION.replace_all(&masked, "[registration]");
    masked.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_dotted_cpf() {
        assert_eq!(
            mask_sensitive("my cpf is 123.456.789-01 thanks"),
            "my cpf is [cpf] thanks"
        );
    }

    #[test]
    fn test_masks_bare_cpf() {
        assert_eq!(mask_sensitive("12345678901"), "[cpf]");
    }

    #[test]
    fn test_masks_registration_number() {
        assert_eq!(
            mask_sensitive("my badge is 48210 ok"),
            "my badge is [registration] ok"
        );
    }

    #[test]
    fn test_masks_email() {
        assert_eq!(
            mask_sensitive("reach me at ana.silva@example.com"),
            "reach me at [email]"
        );
    }

    #[test]
    fn test_short_numbers_untouched() {
        assert_eq!(mask_sensitive("option 3 please"), "option 3 please");
    }

    #[test]
    fn test_masks_multiple_kinds() {
        let masked = mask_sensitive("cpf 123.456.789-01, badge 48210, mail a@b.co");
        assert_eq!(masked, "cpf [cpf], badge [registration], mail [email]");
    }
}
