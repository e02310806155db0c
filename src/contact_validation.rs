//! Contact field validation used by the normalizer.
//!
//! Email checks reject placeholder patterns that generative providers like
//! to invent. Phone numbers are normalized with the phonenumber library (a
//! port of Google's libphonenumber).

use phonenumber::country::Id as CountryId;
use phonenumber::Mode;
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

static EMAIL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("email token pattern is valid")
});

/// Validate email address
///
/// Checks for:
/// - Basic email format (contains @ and .)
/// - Fake/placeholder patterns (repeated digits like 9999, 1111)
/// - Minimum length requirements
/// - Valid domain structure
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 5 || !email.contains('@') || !email.contains('.') {
        return false;
    }

    let fake_patterns = ["999999", "111111", "000000", "123456789"];

    for pattern in &fake_patterns {
        if email.contains(pattern) {
            tracing::warn!(
                "Invalid email detected (fake pattern '{}'): {}",
                pattern,
                email
            );
            return false;
        }
    }

    if !EMAIL_FORMAT.is_match(email) {
        tracing::debug!("Invalid email format: {}", email);
        return false;
    }

    true
}

/// Finds the first valid email address embedded in free text such as a
/// search-result snippet.
pub fn find_email(text: &str) -> Option<String> {
    EMAIL_TOKEN
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches('.'))
        .find(|candidate| is_valid_email(candidate))
        .map(str::to_string)
}

/// Parses a region code such as `"IN"` or `"us"`.
pub fn parse_region(code: &str) -> Option<CountryId> {
    code.trim().to_ascii_uppercase().parse::<CountryId>().ok()
}

/// Validate and normalize a phone number for the given default region.
///
/// Numbers written with a `+` country prefix are parsed as-is; others are
/// read as national numbers of `region`.
///
/// Returns: (is_valid, normalized_phone_or_error_msg), where a valid number
/// is formatted as E.164 (+919845012345).
pub fn validate_phone(raw: &str, region: CountryId) -> (bool, String) {
    let digits = raw.chars().filter(|c| c.is_ascii_digit()).count();
    if raw.trim().is_empty() || digits < 7 {
        return (false, "Phone too short".to_string());
    }

    match phonenumber::parse(Some(region), raw) {
        Ok(number) => {
            if phonenumber::is_valid(&number) {
                let formatted = number.format().mode(Mode::E164).to_string();
                tracing::debug!("Valid phone: {} -> {}", raw, formatted);
                (true, formatted)
            } else {
                tracing::debug!("Invalid phone number for {:?}: {}", region, raw);
                (false, "Invalid phone number".to_string())
            }
        }
        Err(e) => {
            tracing::debug!("Failed to parse phone '{}': {:?}", raw, e);
            (false, format!("Parse error: {:?}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_email_in_snippet() {
        let snippet = "Contact our Kalaburagi depot at sales@deccanfoods.in. Open 9-6.";
        assert_eq!(find_email(snippet), Some("sales@deccanfoods.in".to_string()));
        assert_eq!(find_email("call us today"), None);
        assert_eq!(find_email("fake 999999@spam.com only"), None);
    }

    #[test]
    fn test_parse_region() {
        assert_eq!(parse_region("in"), Some(CountryId::IN));
        assert_eq!(parse_region(" US "), Some(CountryId::US));
        assert_eq!(parse_region("XX1"), None);
    }
}
