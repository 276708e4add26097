//! Boundary validation for request fields
//!
//! Helpers return the normalised value (trimmed, lowercased where the store
//! compares case-insensitively) or a 400.

use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

static USERNAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").expect("username pattern compiles"));

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").expect("email pattern compiles")
});

fn bad(message: &str) -> ApiError {
    ApiError::BadRequest(message.to_string())
}

/// Lowercased username of 3 to 32 letters, digits or underscores
pub fn normalize_username(raw: &str) -> ApiResult<String> {
    let username = raw.trim().to_lowercase();

    match username.chars().count() {
        0 => Err(bad("Username is required")),
        1..=2 => Err(bad("Username must be at least 3 characters long")),
        33.. => Err(bad("Username must be at most 32 characters long")),
        _ if !USERNAME_CHARS.is_match(&username) => Err(bad(
            "Username can only contain letters, numbers, and underscores",
        )),
        _ => Ok(username),
    }
}

/// Lowercased email address
pub fn normalize_email(raw: &str) -> ApiResult<String> {
    let email = raw.trim().to_lowercase();

    if email.is_empty() {
        return Err(bad("Email is required"));
    }
    if email.len() > 254 || !EMAIL_SHAPE.is_match(&email) {
        return Err(bad("Invalid email format"));
    }
    Ok(email)
}

/// 8 to 128 characters with at least one letter and one digit
pub fn validate_password(password: &str) -> ApiResult<()> {
    let length = password.chars().count();
    if length < 8 {
        return Err(bad("Password must be at least 8 characters long"));
    }
    if length > 128 {
        return Err(bad("Password must be at most 128 characters long"));
    }

    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_letter && has_digit) {
        return Err(bad("Password must contain at least one letter and one digit"));
    }

    Ok(())
}

/// Trimmed value of a required text field
pub fn require_text(value: Option<&str>, field: &str) -> ApiResult<String> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ApiError::BadRequest(format!("{} is required", field))),
    }
}

/// Parse a path identifier, naming the entity in the error
pub fn parse_id(raw: &str, entity: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::BadRequest(format!("{} id must be valid", entity)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: ApiResult<impl std::fmt::Debug>) -> String {
        match result {
            Err(ApiError::BadRequest(msg)) => msg,
            other => panic!("expected a bad request, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("  Chai_Aur_Code ").unwrap(), "chai_aur_code");
        assert_eq!(message(normalize_username("")), "Username is required");
        assert_eq!(
            message(normalize_username("ab")),
            "Username must be at least 3 characters long"
        );
        assert!(normalize_username(&"a".repeat(33)).is_err());
        assert!(normalize_username("no spaces").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("Someone@Example.COM").unwrap(),
            "someone@example.com"
        );
        assert_eq!(message(normalize_email(" ")), "Email is required");
        assert!(normalize_email("missing-at.example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("hunter22pass").is_ok());
        assert!(validate_password("short1").is_err());
        assert!(validate_password("onlyletters").is_err());
        assert!(validate_password("1234567890").is_err());
    }

    #[test]
    fn test_require_text_trims() {
        assert_eq!(require_text(Some("  hello "), "content").unwrap(), "hello");
        assert_eq!(message(require_text(Some("   "), "content")), "content is required");
        assert!(require_text(None, "content").is_err());
    }

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "Video").unwrap(), id);
        assert_eq!(message(parse_id("not-an-id", "Video")), "Video id must be valid");
    }
}
