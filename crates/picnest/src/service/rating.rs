//! Rating ledger.
use super::{ConflictExt, Pagination, require_privileged};
use crate::context::AppContext;
use picnest_core::response::{ErrorCode, OrReject, Rejection};
use picnest_model::{Publication, Rating, User};

/// Rating service.
pub(crate) struct RatingService<'a> {
    ctx: &'a AppContext,
}

impl<'a> RatingService<'a> {
    /// Creates a new instance.
    #[inline]
    pub(crate) fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Rates a publication of another user.
    /// A second rating of the same publication is rejected and the first one is kept.
    pub(crate) async fn add(
        &self,
        user: &User,
        publication_id: i64,
        score: i64,
    ) -> Result<Rating, Rejection> {
        let validation = Rating::validate_score(score);
        if !validation.is_success() {
            return Err(Rejection::bad_request(validation));
        }

        let mut transaction = self.ctx.pool().begin_immediate().await?;
        let owner_id = Publication::owner_of(&mut transaction, publication_id)
            .await?
            .or_reject(ErrorCode::PublicationNotFound)?;
        if owner_id == user.id() {
            tracing::warn!(publication_id, user_id = user.id(), "self-rating is rejected");
            return Err(ErrorCode::OwnPublicationForbidden.into());
        }
        let rating = Rating::insert(&mut transaction, user.id(), publication_id, score)
            .await
            .or_conflict(&[("ratings.user_id", ErrorCode::AlreadyRated)])?;
        transaction.commit().await?;
        tracing::info!(publication_id, user_id = user.id(), score, "publication is rated");
        Ok(rating)
    }

    /// Lists the ratings given by a user.
    pub(crate) async fn list_by_user(
        &self,
        requester: &User,
        user_id: i64,
        page: Pagination,
    ) -> Result<Vec<Rating>, Rejection> {
        require_privileged(&requester.session())?;
        self.ctx
            .auth()
            .resolve_user(user_id)
            .await?
            .or_reject(ErrorCode::UserNotFound)?;
        let mut conn = self.ctx.pool().acquire().await?;
        Ok(Rating::list_by_user(&mut conn, user_id, page.limit(), page.offset()).await?)
    }

    /// Lists the users who rated a publication.
    pub(crate) async fn list_raters(
        &self,
        requester: &User,
        publication_id: i64,
        page: Pagination,
    ) -> Result<Vec<User>, Rejection> {
        require_privileged(&requester.session())?;
        let mut conn = self.ctx.pool().acquire().await?;
        Publication::owner_of(&mut conn, publication_id)
            .await?
            .or_reject(ErrorCode::PublicationNotFound)?;
        Ok(Rating::list_raters(&mut conn, publication_id, page.limit(), page.offset()).await?)
    }

    /// Removes the rating of a user.
    pub(crate) async fn delete(
        &self,
        requester: &User,
        user_id: i64,
        publication_id: i64,
    ) -> Result<Rating, Rejection> {
        require_privileged(&requester.session())?;
        let mut conn = self.ctx.pool().acquire().await?;
        let rating = Rating::delete(&mut conn, user_id, publication_id)
            .await?
            .or_reject(ErrorCode::RatingNotFound)?;
        tracing::info!(
            publication_id,
            user_id,
            moderator_id = requester.id(),
            "rating is removed"
        );
        Ok(rating)
    }
}
