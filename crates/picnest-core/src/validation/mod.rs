//! Generic validator and common validation rules.
use crate::{JsonValue, Map, SharedString, error::Error};
use smallvec::SmallVec;
use std::fmt;

mod validator;

pub use validator::{EmailValidator, InvalidEmail, InvalidLength, LengthValidator, Validator};

/// A record of validation results.
#[derive(Debug, Default)]
pub struct Validation {
    failed_entries: SmallVec<[(SharedString, Error); 4]>,
}

impl Validation {
    /// Creates a new instance.
    #[inline]
    pub fn new() -> Self {
        Self {
            failed_entries: SmallVec::new(),
        }
    }

    /// Creates a new instance with the entry.
    #[inline]
    pub fn from_entry(key: impl Into<SharedString>, err: impl Into<Error>) -> Self {
        let mut entries = SmallVec::new();
        entries.push((key.into(), err.into()));
        Self {
            failed_entries: entries,
        }
    }

    /// Records an entry with the supplied message.
    #[inline]
    pub fn record(&mut self, key: impl Into<SharedString>, message: impl Into<SharedString>) {
        self.failed_entries.push((key.into(), Error::new(message)));
    }

    /// Records an entry for the error.
    #[inline]
    pub fn record_fail(&mut self, key: impl Into<SharedString>, err: impl Into<Error>) {
        self.failed_entries.push((key.into(), err.into()));
    }

    /// Validates the number of characters in a string value.
    pub fn validate_length(
        &mut self,
        key: impl Into<SharedString>,
        value: &str,
        min_length: usize,
        max_length: usize,
    ) {
        let validator = LengthValidator::new(min_length, max_length);
        if let Err(err) = validator.validate(value) {
            self.record_fail(key, err);
        }
    }

    /// Validates an integer value within the inclusive range.
    pub fn validate_range(&mut self, key: impl Into<SharedString>, value: i64, min: i64, max: i64) {
        if value < min || value > max {
            self.record(key, format!("should be in the range {min}..={max}"));
        }
    }

    /// Validates the string value with a specific format.
    pub fn validate_format(&mut self, key: impl Into<SharedString>, value: &str, format: &str) {
        match format {
            "email" => {
                if let Err(err) = EmailValidator.validate(value) {
                    self.record_fail(key, err);
                }
            }
            _ => {
                let field = key.into();
                tracing::warn!("unsupported format `{format}` for the field `{field}`");
            }
        }
    }

    /// Returns true if the validation contains a value for the specified key.
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.failed_entries.iter().any(|(field, _)| field == key)
    }

    /// Returns `true` if the validation is success.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.failed_entries.is_empty()
    }

    /// Returns a list of invalid params.
    #[inline]
    pub fn invalid_params(&self) -> Vec<&str> {
        self.failed_entries
            .iter()
            .map(|entry| entry.0.as_ref())
            .collect()
    }

    /// Returns the validation as a json object.
    pub fn to_map(&self) -> Map {
        let mut map = Map::new();
        for (key, err) in &self.failed_entries {
            let message = err.message();
            tracing::warn!("invalid value for `{key}`: {message}");
            map.insert(key.to_string(), JsonValue::from(message));
        }
        map
    }
}

impl fmt::Display for Validation {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let failed_entries = &self.failed_entries;
        let mut errors = Vec::with_capacity(failed_entries.len());
        for (key, err) in failed_entries {
            let message = format!("invalid value for `{key}`: {}", err.message());
            errors.push(message);
        }
        write!(f, "{}", errors.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::Validation;

    #[test]
    fn it_collects_failed_entries() {
        let mut validation = Validation::new();
        validation.validate_length("title", "A sunset over the bay", 1, 50);
        validation.validate_range("score", 4, 1, 5);
        validation.validate_format("email", "alice@example.com", "email");
        assert!(validation.is_success());

        validation.validate_length("name", "ab", 3, 15);
        validation.validate_range("score", 6, 1, 5);
        validation.validate_format("email", "alice.example.com", "email");
        assert!(!validation.is_success());
        assert!(validation.contains_key("name"));
        assert_eq!(validation.invalid_params(), vec!["name", "score", "email"]);

        let map = validation.to_map();
        assert_eq!(
            map.get("score").and_then(|v| v.as_str()),
            Some("should be in the range 1..=5")
        );
    }
}
