//! Validation Traits
//!
//! Payload checks shared by the services. Everything here is pure and runs
//! before the backing store is touched; failures surface as
//! `LmsError::ValidationFailure` with the offending field.

use once_cell::sync::Lazy;
use regex::Regex;
use syllabus_core::ValidationError;

static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").expect("Invalid slug regex"));

pub type ValidationResult = Result<(), ValidationError>;

fn invalid(field: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Trait for validating non-empty strings.
///
/// # Example
/// ```ignore
/// use syllabus_api::validation::ValidateNonEmpty;
///
/// request.title.validate_non_empty("title")?;
/// ```
pub trait ValidateNonEmpty {
    /// Fails with `RequiredFieldMissing` when empty or whitespace-only.
    fn validate_non_empty(&self, field_name: &str) -> ValidationResult;
}

impl ValidateNonEmpty for str {
    fn validate_non_empty(&self, field_name: &str) -> ValidationResult {
        if self.trim().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: field_name.to_string(),
            });
        }
        Ok(())
    }
}

impl ValidateNonEmpty for String {
    fn validate_non_empty(&self, field_name: &str) -> ValidationResult {
        self.as_str().validate_non_empty(field_name)
    }
}

/// `None` means "not being changed" in patches and passes.
impl<T: ValidateNonEmpty> ValidateNonEmpty for Option<T> {
    fn validate_non_empty(&self, field_name: &str) -> ValidationResult {
        match self {
            Some(value) => value.validate_non_empty(field_name),
            None => Ok(()),
        }
    }
}

/// Lowercase letters, digits and hyphens.
pub fn validate_slug(field_name: &str, slug: &str) -> ValidationResult {
    if !SLUG_PATTERN.is_match(slug) {
        return Err(invalid(
            field_name,
            "must contain only lowercase letters, digits and hyphens",
        ));
    }
    Ok(())
}

pub fn validate_video_url(field_name: &str, url: &str) -> ValidationResult {
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(invalid(field_name, "must be an http(s) URL"));
    }
    Ok(())
}

pub fn validate_max_score(field_name: &str, max_score: u32) -> ValidationResult {
    if max_score == 0 {
        return Err(invalid(field_name, "must be greater than 0"));
    }
    Ok(())
}

/// A grade must be a finite number within `0..=max_score`.
pub fn validate_score(field_name: &str, score: f64, max_score: u32) -> ValidationResult {
    if !score.is_finite() || score < 0.0 || score > f64::from(max_score) {
        return Err(invalid(
            field_name,
            format!("must be between 0 and {}", max_score),
        ));
    }
    Ok(())
}

/// Trait for checking if an update request has any fields set.
pub trait HasUpdates {
    fn has_any_updates(&self) -> bool;

    /// Validate that at least one update field is set.
    fn validate_has_updates(&self) -> ValidationResult {
        if !self.has_any_updates() {
            return Err(invalid("body", "at least one field must be provided"));
        }
        Ok(())
    }
}

/// Structural validation of a request payload.
pub trait Validate {
    fn validate(&self) -> ValidationResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_non_empty_str() {
        assert!("hello".validate_non_empty("title").is_ok());
        assert!("".validate_non_empty("title").is_err());
        assert!("   ".validate_non_empty("title").is_err());
        assert!("  hi  ".validate_non_empty("title").is_ok());
    }

    #[test]
    fn test_validate_non_empty_option() {
        let unchanged: Option<String> = None;
        assert!(unchanged.validate_non_empty("title").is_ok());
        assert!(Some(String::new()).validate_non_empty("title").is_err());
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("slug", "python-basics-101").is_ok());
        assert!(validate_slug("slug", "Python").is_err());
        assert!(validate_slug("slug", "with space").is_err());
        assert!(validate_slug("slug", "").is_err());
    }

    #[test]
    fn test_validate_score_bounds() {
        assert!(validate_score("score", 0.0, 100).is_ok());
        assert!(validate_score("score", 100.0, 100).is_ok());
        assert!(validate_score("score", 87.5, 100).is_ok());
        assert!(validate_score("score", -0.5, 100).is_err());
        assert!(validate_score("score", 100.5, 100).is_err());
        assert!(validate_score("score", f64::NAN, 100).is_err());
    }

    #[test]
    fn test_validate_max_score_and_url() {
        assert!(validate_max_score("max_score", 0).is_err());
        assert!(validate_max_score("max_score", 10).is_ok());
        assert!(validate_video_url("video_url", "https://videos.example.edu/1").is_ok());
        assert!(validate_video_url("video_url", "ftp://videos.example.edu/1").is_err());
    }
}
