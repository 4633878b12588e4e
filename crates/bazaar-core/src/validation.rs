//! Field validation for request payloads.
//!
//! ## Summary
//! Every inbound DTO is checked with these functions before any handler logic
//! runs. Checks append to a [`FieldErrors`] list instead of failing fast so a
//! client gets every problem with its payload in one response.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// ASCII-only username form.
pub const USERNAME_PATTERN: &str = r"^[A-Za-z0-9_-]{3,40}$";
/// Locale-dependent username form that also admits Unicode letters.
pub const UNICODE_USERNAME_PATTERN: &str = r"^[\p{L}0-9_-]{3,40}$";
pub const PASSWORD_PATTERN: &str = r"^[A-Za-z0-9\-_:#%+]{7,30}$";
pub const ROLE_NAME_PATTERN: &str = r"^[A-Z_]{2,30}$";
pub const EMAIL_PATTERN: &str = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$";

pub const MAX_EMAIL_LEN: usize = 254;

static USERNAME: LazyLock<Regex> = LazyLock::new(|| compile(USERNAME_PATTERN));
static UNICODE_USERNAME: LazyLock<Regex> = LazyLock::new(|| compile(UNICODE_USERNAME_PATTERN));
static PASSWORD: LazyLock<Regex> = LazyLock::new(|| compile(PASSWORD_PATTERN));
static ROLE_NAME: LazyLock<Regex> = LazyLock::new(|| compile(ROLE_NAME_PATTERN));
static EMAIL: LazyLock<Regex> = LazyLock::new(|| compile(EMAIL_PATTERN));

#[expect(
    clippy::expect_used,
    reason = "patterns are compile-time constants covered by tests"
)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("validation pattern should compile")
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Ordered list of rejected fields for one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Returns `true` if any error was recorded against `field`.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// ## Summary
    /// Converts the collected errors into a result.
    ///
    /// ## Errors
    /// Returns `self` if at least one field was rejected.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

pub fn validate_username(errors: &mut FieldErrors, username: &str, allow_unicode: bool) {
    let re = if allow_unicode {
        &*UNICODE_USERNAME
    } else {
        &*USERNAME
    };
    if !re.is_match(username) {
        errors.push(
            "username",
            "must be 3-40 characters of letters, digits, '_' or '-'",
        );
    }
}

pub fn validate_email(errors: &mut FieldErrors, email: &str) {
    if email.len() > MAX_EMAIL_LEN || !EMAIL.is_match(email) {
        errors.push("email", "must be a valid email address");
    }
}

pub fn validate_password(errors: &mut FieldErrors, password: &str) {
    if !PASSWORD.is_match(password) {
        errors.push(
            "password",
            "must be 7-30 characters of letters, digits or - _ : # % +",
        );
    }
}

pub fn validate_role_name(errors: &mut FieldErrors, name: &str) {
    if !ROLE_NAME.is_match(name) {
        errors.push("name", "must be 2-30 uppercase letters or '_'");
    }
}

/// Checks that a required value is present (non-blank).
pub fn validate_required(errors: &mut FieldErrors, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, "is required");
    }
}

/// Checks a character count in `min..=max`, trimming surrounding whitespace.
pub fn validate_length(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) {
    let count = value.trim().chars().count();
    if count < min || count > max {
        errors.push(field, format!("must be {min}-{max} characters"));
    }
}

pub fn validate_non_negative(errors: &mut FieldErrors, field: &'static str, value: i64) {
    if value < 0 {
        errors.push(field, "must not be negative");
    }
}

/// Returns `true` if `name` is a well-formed role name.
#[must_use]
pub fn is_valid_role_name(name: &str) -> bool {
    ROLE_NAME.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(f: impl FnOnce(&mut FieldErrors)) -> FieldErrors {
        let mut errors = FieldErrors::new();
        f(&mut errors);
        errors
    }

    #[test]
    fn username_accepts_ascii_forms() {
        for name in ["bob", "alice_smith", "x-y-z", "A1234567890"] {
            assert!(
                check(|e| validate_username(e, name, false)).is_empty(),
                "{name} should be accepted"
            );
        }
    }

    #[test]
    fn username_rejects_bad_forms() {
        let too_long = "a".repeat(41);
        for name in ["ab", "has space", "semi;colon", too_long.as_str(), ""] {
            assert!(
                check(|e| validate_username(e, name, false)).has_field("username"),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn username_unicode_variant() {
        assert!(check(|e| validate_username(e, "jürgen", false)).has_field("username"));
        assert!(check(|e| validate_username(e, "jürgen", true)).is_empty());
        assert!(check(|e| validate_username(e, "ёлка_1", true)).is_empty());
        assert!(check(|e| validate_username(e, "no space", true)).has_field("username"));
    }

    #[test]
    fn password_pattern() {
        assert!(check(|e| validate_password(e, "secret1")).is_empty());
        assert!(check(|e| validate_password(e, "a-b_c:d#e%f+g")).is_empty());
        assert!(check(|e| validate_password(e, "short")).has_field("password"));
        assert!(check(|e| validate_password(e, "has space1")).has_field("password"));
        assert!(check(|e| validate_password(e, &"p".repeat(31))).has_field("password"));
    }

    #[test]
    fn email_pattern() {
        assert!(check(|e| validate_email(e, "alice@example.com")).is_empty());
        assert!(check(|e| validate_email(e, "a.b+shop@mail.example.org")).is_empty());
        for bad in ["alice", "alice@", "@example.com", "alice@example", "a b@c.de"] {
            assert!(
                check(|e| validate_email(e, bad)).has_field("email"),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn role_name_pattern() {
        assert!(is_valid_role_name("ROLE_USER"));
        assert!(is_valid_role_name("AB"));
        assert!(!is_valid_role_name("A"));
        assert!(!is_valid_role_name("role_user"));
        assert!(!is_valid_role_name("ROLE-1"));
    }

    #[test]
    fn errors_accumulate_in_order() {
        let mut errors = FieldErrors::new();
        validate_username(&mut errors, "x", false);
        validate_email(&mut errors, "nope");
        validate_password(&mut errors, "1");

        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, ["username", "email", "password"]);
        assert!(errors.to_string().starts_with("username: "));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn length_counts_characters_after_trim() {
        assert!(check(|e| validate_length(e, "name", "  ab  ", 1, 2)).is_empty());
        assert!(check(|e| validate_length(e, "name", "   ", 1, 2)).has_field("name"));
        assert!(check(|e| validate_length(e, "name", "ééé", 1, 2)).has_field("name"));
    }
}
