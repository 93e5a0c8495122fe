use self::RejectionKind::*;
use super::ErrorCode;
use crate::{JsonValue, Map, error::Error, validation::Validation};

/// A rejection of a domain operation with a stable error code.
#[derive(Debug)]
pub struct Rejection {
    /// Rejection kind.
    kind: RejectionKind,
    /// Error code.
    code: ErrorCode,
}

/// Rejection kind.
#[derive(Debug)]
#[non_exhaustive]
enum RejectionKind {
    /// 400 Bad Request
    BadRequest(Validation),
    /// 400 Bad Request with a specific error code
    InvalidRequest(Error),
    /// 401 Unauthorized
    Unauthorized(Error),
    /// 403 Forbidden
    Forbidden(Error),
    /// 404 NotFound
    NotFound(Error),
    /// 409 Conflict
    Conflict(Error),
    /// 500 Internal Server Error
    InternalServerError(Error),
    /// 503 Service Unavailable
    ServiceUnavailable(Error),
}

impl Rejection {
    /// Creates a rejection for the error code with its default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::with_error(code, Error::new(code.message()))
    }

    /// Creates a rejection for the error code with a specific error.
    pub fn with_error(code: ErrorCode, err: impl Into<Error>) -> Self {
        let err = err.into();
        let kind = match code.status_code() {
            400 => InvalidRequest(err),
            401 => Unauthorized(err),
            403 => Forbidden(err),
            404 => NotFound(err),
            409 => Conflict(err),
            503 => ServiceUnavailable(err),
            _ => InternalServerError(err),
        };
        Self { kind, code }
    }

    /// Creates a `BadRequest` rejection with the failed validation.
    #[inline]
    pub fn bad_request(validation: Validation) -> Self {
        Self {
            kind: BadRequest(validation),
            code: ErrorCode::ValidationFailed,
        }
    }

    /// Creates a new instance with the validation entry.
    #[inline]
    pub fn from_validation_entry(
        key: impl Into<crate::SharedString>,
        err: impl Into<Error>,
    ) -> Self {
        Self::bad_request(Validation::from_entry(key, err))
    }

    /// Creates a `Forbidden` rejection.
    #[inline]
    pub fn forbidden() -> Self {
        Self::from_code(ErrorCode::Forbidden)
    }

    /// Creates an `InternalServerError` rejection.
    #[inline]
    pub fn internal_server_error(err: impl Into<Error>) -> Self {
        Self::with_error(ErrorCode::Internal, err)
    }

    /// Creates a `ServiceUnavailable` rejection for a failed external service.
    #[inline]
    pub fn upstream_unavailable(err: impl Into<Error>) -> Self {
        Self::with_error(ErrorCode::UpstreamUnavailable, err)
    }

    /// Returns the error code.
    #[inline]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Returns the status code as `u16`.
    #[inline]
    pub fn status_code(&self) -> u16 {
        match &self.kind {
            BadRequest(_) | InvalidRequest(_) => 400,
            Unauthorized(_) => 401,
            Forbidden(_) => 403,
            NotFound(_) => 404,
            Conflict(_) => 409,
            InternalServerError(_) => 500,
            ServiceUnavailable(_) => 503,
        }
    }

    /// Returns `true` if the rejection is caused by a server side failure.
    #[inline]
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Returns the error message which is safe to display.
    pub fn message(&self) -> String {
        match &self.kind {
            BadRequest(validation) => validation.to_string(),
            InternalServerError(_) | ServiceUnavailable(_) => self.code.message().to_owned(),
            InvalidRequest(err)
            | Unauthorized(err)
            | Forbidden(err)
            | NotFound(err)
            | Conflict(err) => {
                err.message().to_owned()
            }
        }
    }

    /// Returns the underlying error of a server side failure.
    #[inline]
    pub fn server_error(&self) -> Option<&Error> {
        match &self.kind {
            InternalServerError(err) | ServiceUnavailable(err) => Some(err),
            _ => None,
        }
    }

    /// Converts `self` into a problem details JSON object.
    pub fn to_json(&self) -> JsonValue {
        let mut body = Map::new();
        body.insert("status".to_owned(), self.status_code().into());
        body.insert("code".to_owned(), self.code.as_str().into());
        body.insert("detail".to_owned(), self.message().into());
        if let BadRequest(validation) = &self.kind {
            body.insert(
                "invalid_params".to_owned(),
                JsonValue::Object(validation.to_map()),
            );
        }
        JsonValue::Object(body)
    }
}

impl From<ErrorCode> for Rejection {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        Self::from_code(code)
    }
}

impl From<Validation> for Rejection {
    #[inline]
    fn from(validation: Validation) -> Self {
        Self::bad_request(validation)
    }
}

impl From<Error> for Rejection {
    #[inline]
    fn from(err: Error) -> Self {
        Self::internal_server_error(err)
    }
}

impl<E: std::error::Error + 'static> From<E> for Rejection {
    #[inline]
    fn from(err: E) -> Self {
        Self::internal_server_error(err)
    }
}

/// Trait for extracting rejections.
pub trait ExtractRejection<T> {
    /// Extracts a rejection.
    fn extract(self) -> Result<T, Rejection>;
}

impl<T> ExtractRejection<T> for Result<T, Validation> {
    #[inline]
    fn extract(self) -> Result<T, Rejection> {
        self.map_err(Rejection::bad_request)
    }
}

impl<T, E: Into<Error>> ExtractRejection<T> for Result<T, E> {
    #[inline]
    fn extract(self) -> Result<T, Rejection> {
        self.map_err(Rejection::internal_server_error)
    }
}

/// Trait for converting a missing value into a rejection.
pub trait OrReject<T> {
    /// Returns the value or a rejection with the error code.
    fn or_reject(self, code: ErrorCode) -> Result<T, Rejection>;
}

impl<T> OrReject<T> for Option<T> {
    #[inline]
    fn or_reject(self, code: ErrorCode) -> Result<T, Rejection> {
        self.ok_or_else(|| Rejection::from_code(code))
    }
}
