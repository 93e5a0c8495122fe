//! Type-erased errors with an optional source.
use crate::SharedString;
use std::{error, fmt};

/// An error type backed by an allocation-optimized string.
#[derive(Debug)]
pub struct Error {
    /// Error message.
    message: SharedString,
    /// Error source.
    source: Option<Box<Error>>,
}

impl Error {
    /// Creates a new instance with the supplied message.
    #[inline]
    pub fn new(message: impl Into<SharedString>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new instance with the supplied message and the error source.
    #[inline]
    pub fn with_source(message: impl Into<SharedString>, source: impl Into<Error>) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source.into())),
        }
    }

    /// Returns a new instance with the supplied message and `self` as the error source.
    #[inline]
    pub fn wrap(self, message: impl Into<SharedString>) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(self)),
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        self.message.as_ref()
    }

    /// Returns the source.
    #[inline]
    pub fn source(&self) -> Option<&Error> {
        self.source.as_deref()
    }

    /// Returns the lowest level source of `self`.
    pub fn root_source(&self) -> Option<&Error> {
        let mut source = self.source();
        while let Some(err) = source.and_then(|err| err.source()) {
            source = Some(err);
        }
        source
    }
}

impl<E: error::Error + 'static> From<E> for Error {
    #[inline]
    fn from(err: E) -> Self {
        Self {
            message: err.to_string().into(),
            source: err.source().map(|err| Box::new(Self::new(err.to_string()))),
        }
    }
}

impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = &self.message;
        if let Some(source) = &self.source {
            write!(f, "{message}: {source}")
        } else {
            write!(f, "{message}")
        }
    }
}

/// Returns early with an [`Error`] built from the format arguments.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)+) => {
        return Err($crate::error::Error::new(format!($($arg)+)))
    };
}

#[cfg(test)]
mod tests {
    use super::Error;

    fn parse_port(value: &str) -> Result<u16, Error> {
        if value.is_empty() {
            crate::bail!("port `{value}` should be nonempty");
        }
        value
            .parse::<u16>()
            .map_err(|err| Error::with_source("invalid port", err))
    }

    #[test]
    fn it_wraps_error_sources() {
        let err = parse_port("http").unwrap_err();
        assert_eq!(err.message(), "invalid port");
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("invalid port: "));

        let err = err.wrap("fail to load the server config");
        assert_eq!(err.source().map(|e| e.message()), Some("invalid port"));
        assert!(err.root_source().is_some());

        let err = parse_port("").unwrap_err();
        assert_eq!(err.to_string(), "port `` should be nonempty");
    }
}
