use super::Validator;
use std::fmt;

/// A validator for the number of characters in a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthValidator {
    /// Minimum number of characters.
    min_length: usize,
    /// Maximum number of characters.
    max_length: usize,
}

impl LengthValidator {
    /// Creates a new instance with the inclusive bounds.
    #[inline]
    pub fn new(min_length: usize, max_length: usize) -> Self {
        Self {
            min_length,
            max_length,
        }
    }
}

/// An error for the length validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidLength {
    /// The value is shorter than the minimum length.
    TooShort(usize),
    /// The value is longer than the maximum length.
    TooLong(usize),
}

impl fmt::Display for InvalidLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort(min) => write!(f, "should have at least {min} characters"),
            Self::TooLong(max) => write!(f, "should have at most {max} characters"),
        }
    }
}

impl std::error::Error for InvalidLength {}

impl Validator<str> for LengthValidator {
    type Error = InvalidLength;

    fn validate(&self, data: &str) -> Result<(), Self::Error> {
        let length = data.chars().count();
        if length < self.min_length {
            Err(InvalidLength::TooShort(self.min_length))
        } else if length > self.max_length {
            Err(InvalidLength::TooLong(self.max_length))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{InvalidLength, LengthValidator, Validator};

    #[test]
    fn it_counts_characters() {
        let validator = LengthValidator::new(3, 5);
        assert!(validator.validate("été").is_ok());
        assert!(validator.validate("kites").is_ok());
        assert_eq!(validator.validate("ab"), Err(InvalidLength::TooShort(3)));
        assert_eq!(validator.validate("sunset"), Err(InvalidLength::TooLong(5)));
    }
}
