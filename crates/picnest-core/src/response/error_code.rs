use strum::{AsRefStr, EnumIter, IntoStaticStr};

/// Stable error codes exposed to the API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorCode {
    /// Request data is outside the declared bounds.
    ValidationFailed,
    /// A publication can not have more than five tags.
    TagLimitExceeded,
    /// The uploaded image does not exist.
    ImageRequired,
    /// Unknown image transformation.
    InvalidTransformation,
    /// Wrong email or password.
    InvalidCredentials,
    /// The token is missing, expired or revoked.
    InvalidToken,
    /// The email has not been confirmed.
    EmailNotConfirmed,
    /// The account has been blocked.
    UserBlocked,
    /// The role of the user is not sufficient.
    Forbidden,
    /// Users can not rate their own publications.
    OwnPublicationForbidden,
    /// The publication does not exist or is not visible.
    PublicationNotFound,
    /// The tag does not exist or is not attached.
    TagNotFound,
    /// The rating does not exist.
    RatingNotFound,
    /// The comment does not exist.
    CommentNotFound,
    /// The user does not exist.
    UserNotFound,
    /// The publication has already been rated by the user.
    AlreadyRated,
    /// The tag is already attached to the publication.
    TagAlreadyPresent,
    /// An account with the email already exists.
    AccountAlreadyExists,
    /// The username is taken by another account.
    UsernameTaken,
    /// The blob store or another external service is unavailable.
    UpstreamUnavailable,
    /// Unexpected server error.
    Internal,
}

impl ErrorCode {
    /// Returns the code as a snake-case string.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Returns the user-facing message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::ValidationFailed => "request data is invalid",
            Self::TagLimitExceeded => "a publication can have at most 5 tags",
            Self::ImageRequired => "an image should be uploaded first",
            Self::InvalidTransformation => "unknown image transformation",
            Self::InvalidCredentials => "invalid email or password",
            Self::InvalidToken => "could not validate the credentials",
            Self::EmailNotConfirmed => "email is not confirmed",
            Self::UserBlocked => "user is blocked",
            Self::Forbidden => "operation is not permitted",
            Self::OwnPublicationForbidden => "own publications can not be rated",
            Self::PublicationNotFound => "publication is not found",
            Self::TagNotFound => "tag is not found",
            Self::RatingNotFound => "rating is not found",
            Self::CommentNotFound => "comment is not found",
            Self::UserNotFound => "user is not found",
            Self::AlreadyRated => "publication has already been rated",
            Self::TagAlreadyPresent => "tag is already attached to the publication",
            Self::AccountAlreadyExists => "account already exists",
            Self::UsernameTaken => "username is already taken",
            Self::UpstreamUnavailable => "external service is unavailable",
            Self::Internal => "internal server error",
        }
    }

    /// Returns the HTTP status code as `u16`.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ValidationFailed
            | Self::TagLimitExceeded
            | Self::ImageRequired
            | Self::InvalidTransformation => 400,
            Self::InvalidCredentials
            | Self::InvalidToken
            | Self::EmailNotConfirmed
            | Self::UserBlocked => 401,
            Self::Forbidden | Self::OwnPublicationForbidden => 403,
            Self::PublicationNotFound
            | Self::TagNotFound
            | Self::RatingNotFound
            | Self::CommentNotFound
            | Self::UserNotFound => 404,
            Self::AlreadyRated
            | Self::TagAlreadyPresent
            | Self::AccountAlreadyExists
            | Self::UsernameTaken => 409,
            Self::UpstreamUnavailable => 503,
            Self::Internal => 500,
        }
    }
}
