//! Domain services over the models and the external collaborators.
use picnest_core::response::{ErrorCode, Rejection};
use picnest_orm::ConstraintViolation;
use serde::Deserialize;

mod auth;
mod comment;
mod image;
mod profile;
mod publication;
mod rating;
mod tag;

pub(crate) use auth::AuthService;
pub(crate) use comment::CommentService;
pub(crate) use image::ImageService;
pub(crate) use profile::ProfileService;
pub(crate) use publication::PublicationService;
pub(crate) use rating::RatingService;
pub(crate) use tag::TagService;

/// Window of a listing.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub(crate) struct Pagination {
    /// Maximum number of entries.
    pub(crate) limit: i64,
    /// Number of skipped entries.
    pub(crate) offset: i64,
}

impl Pagination {
    /// Largest accepted page size.
    const MAX_LIMIT: i64 = 100;

    /// Creates a new instance.
    #[inline]
    pub(crate) fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// Returns the limit clamped to `1..=100`.
    #[inline]
    pub(crate) fn limit(&self) -> i64 {
        self.limit.clamp(1, Self::MAX_LIMIT)
    }

    /// Returns the non-negative offset.
    #[inline]
    pub(crate) fn offset(&self) -> i64 {
        self.offset.max(0)
    }
}

impl Default for Pagination {
    #[inline]
    fn default() -> Self {
        Self::new(10, 0)
    }
}

/// Translation of unique-constraint violations into conflicts.
trait ConflictExt<T> {
    /// Returns a rejection with the code of the first violated unique constraint,
    /// given as pairs of `table.column` and the error code.
    fn or_conflict(self, constraints: &[(&str, ErrorCode)]) -> Result<T, Rejection>;
}

impl<T> ConflictExt<T> for Result<T, sqlx::Error> {
    fn or_conflict(self, constraints: &[(&str, ErrorCode)]) -> Result<T, Rejection> {
        self.map_err(|err| {
            let violation = constraints
                .iter()
                .find(|(column, _)| err.violates_unique(column));
            if let Some(&(column, code)) = violation {
                tracing::warn!(column, code = code.as_str(), "unique constraint is violated");
                Rejection::from_code(code)
            } else {
                Rejection::from(err)
            }
        })
    }
}

/// Requires the requester to be an admin or a moderator.
fn require_privileged(session: &picnest_auth::UserSession) -> Result<(), Rejection> {
    if session.is_privileged() {
        Ok(())
    } else {
        tracing::warn!(user_id = session.user_id(), "privileged role is required");
        Err(Rejection::forbidden())
    }
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn it_clamps_pagination() {
        let page = Pagination::new(0, -3);
        assert_eq!(page.limit(), 1);
        assert_eq!(page.offset(), 0);
        assert_eq!(Pagination::new(1000, 20).limit(), 100);
        assert_eq!(Pagination::default().limit(), 10);
    }
}
