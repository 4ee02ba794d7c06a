//! Boundary validation for registration input
//!
//! Usernames and passwords are checked rule-by-rule; every violated rule is
//! reported so the client can show the full list, not just the first miss.

/// Usernames that may never be registered
const RESERVED_USERNAMES: &[&str] = &["admin", "root", "user"];

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 30;
pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 72;

/// Validate a username. Returns the list of violated rules, empty when valid.
pub fn validate_username(username: &str) -> Vec<String> {
    let mut violations = Vec::new();

    if username.chars().count() < USERNAME_MIN {
        violations.push(format!("must be at least {} characters", USERNAME_MIN));
    }
    if username.chars().count() > USERNAME_MAX {
        violations.push(format!("must be at most {} characters", USERNAME_MAX));
    }
    if username.chars().any(char::is_whitespace) {
        violations.push("must not contain spaces".to_string());
    }
    if !username.chars().any(char::is_alphabetic) {
        violations.push("must contain letters".to_string());
    }
    if RESERVED_USERNAMES.contains(&username.to_lowercase().as_str()) {
        violations.push("is reserved".to_string());
    }

    violations
}

/// Validate a password. Returns the list of violated rules, empty when valid.
pub fn validate_password(password: &str) -> Vec<String> {
    let mut violations = Vec::new();

    if password.chars().count() < PASSWORD_MIN {
        violations.push(format!("must be at least {} characters", PASSWORD_MIN));
    }
    if password.chars().count() > PASSWORD_MAX {
        violations.push(format!("must be at most {} characters", PASSWORD_MAX));
    }
    if password.chars().any(char::is_whitespace) {
        violations.push("must not contain spaces".to_string());
    }
    if !password.chars().any(char::is_alphabetic) {
        violations.push("must contain letters".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("must contain digits".to_string());
    }

    violations
}

/// Reject empty or whitespace-only text fields (titles, bodies, comments)
pub fn non_empty(field: &'static str, value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(format!("{} must not be empty", field))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_username() {
        assert!(validate_username("ada_lovelace").is_empty());
        assert!(validate_username("abc").is_empty());
    }

    #[test]
    fn test_username_too_short() {
        let violations = validate_username("ab");
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("at least"));
    }

    #[test]
    fn test_username_reserved() {
        assert!(!validate_username("admin").is_empty());
        assert!(!validate_username("Root").is_empty());
    }

    #[test]
    fn test_username_spaces_rejected() {
        assert!(!validate_username("ada lovelace").is_empty());
    }

    #[test]
    fn test_username_needs_letters() {
        assert!(!validate_username("12345").is_empty());
    }

    #[test]
    fn test_valid_password() {
        assert!(validate_password("hunter42").is_empty());
    }

    #[test]
    fn test_password_rules() {
        assert!(!validate_password("ab1").is_empty()); // too short
        assert!(!validate_password("abcdefgh").is_empty()); // no digit
        assert!(!validate_password("12345678").is_empty()); // no letter
        assert!(!validate_password("pass word1").is_empty()); // space
    }

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty("title", "  hello  ").unwrap(), "hello");
        assert!(non_empty("title", "   ").is_err());
    }
}
