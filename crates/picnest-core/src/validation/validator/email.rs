use self::InvalidEmail::*;
use super::Validator;
use crate::LazyLock;
use regex::Regex;
use std::fmt;

/// A validator for the email address.
///
/// The address becomes the root folder of the owner's blobs,
/// so the local part is limited to characters which are safe in a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmailValidator;

/// An error for the email address validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidEmail {
    /// The value is empty.
    Empty,
    /// The value is longer than 254 characters.
    TooLong,
    /// The `@` symbol is missing.
    MissingAt,
    /// Invalid local part.
    InvalidUser,
    /// Invalid domain.
    InvalidDomain,
}

impl fmt::Display for InvalidEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Empty => write!(f, "value is empty"),
            TooLong => write!(f, "value exceeded maximum of 254 characters"),
            MissingAt => write!(f, "value is missing `@`"),
            InvalidUser => write!(f, "user should only contain letters, digits and `._%+-`"),
            InvalidDomain => write!(f, "domain should be a dotted host name"),
        }
    }
}

impl std::error::Error for InvalidEmail {}

impl Validator<str> for EmailValidator {
    type Error = InvalidEmail;

    fn validate(&self, data: &str) -> Result<(), Self::Error> {
        if data.is_empty() {
            return Err(Empty);
        }
        if data.len() > 254 {
            return Err(TooLong);
        }

        let (user, domain) = data.rsplit_once('@').ok_or(MissingAt)?;
        if user.len() > 64 || !EMAIL_USER_PATTERN.is_match(user) {
            return Err(InvalidUser);
        }
        if !EMAIL_DOMAIN_PATTERN.is_match(domain) {
            return Err(InvalidDomain);
        }
        Ok(())
    }
}

/// Regex for the local part. A leading dot would make a hidden folder.
static EMAIL_USER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i-u)^[a-z0-9_%+-][a-z0-9._%+-]*\z")
        .expect("fail to create a regex for the email user")
});

/// Regex for a host name with at least two labels.
static EMAIL_DOMAIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i-u)^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}\z")
        .expect("fail to create a regex for the email domain")
});
