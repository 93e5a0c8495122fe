//! Comment ledger.
use super::{Pagination, require_privileged};
use crate::context::AppContext;
use picnest_core::response::{ErrorCode, OrReject, Rejection};
use picnest_model::{Comment, CommentInput, Publication, User};

/// Comment service.
pub(crate) struct CommentService<'a> {
    ctx: &'a AppContext,
}

impl<'a> CommentService<'a> {
    /// Creates a new instance.
    #[inline]
    pub(crate) fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Comments on a publication.
    pub(crate) async fn add(
        &self,
        author: &User,
        publication_id: i64,
        input: CommentInput,
    ) -> Result<Comment, Rejection> {
        let validation = input.validate();
        if !validation.is_success() {
            return Err(Rejection::bad_request(validation));
        }

        let mut conn = self.ctx.pool().acquire().await?;
        Publication::owner_of(&mut conn, publication_id)
            .await?
            .or_reject(ErrorCode::PublicationNotFound)?;
        let comment = Comment::insert(&mut conn, author.id(), publication_id, &input.text).await?;
        tracing::info!(
            publication_id,
            comment_id = comment.id(),
            user_id = author.id(),
            "comment is added"
        );
        Ok(comment)
    }

    /// Replaces the text of a comment. Only the author may do this.
    pub(crate) async fn edit(
        &self,
        author: &User,
        publication_id: i64,
        comment_id: i64,
        input: CommentInput,
    ) -> Result<Comment, Rejection> {
        let validation = input.validate();
        if !validation.is_success() {
            return Err(Rejection::bad_request(validation));
        }

        let mut transaction = self.ctx.pool().begin_immediate().await?;
        let comment = Comment::find(&mut transaction, publication_id, comment_id)
            .await?
            .or_reject(ErrorCode::CommentNotFound)?;
        if comment.user_id() != author.id() {
            tracing::warn!(comment_id, user_id = author.id(), "only the author can edit");
            return Err(Rejection::forbidden());
        }
        let comment = Comment::update_text(&mut transaction, comment_id, &input.text)
            .await?
            .or_reject(ErrorCode::CommentNotFound)?;
        transaction.commit().await?;
        Ok(comment)
    }

    /// Deletes a comment. Only admins and moderators may do this.
    pub(crate) async fn delete(
        &self,
        requester: &User,
        publication_id: i64,
        comment_id: i64,
    ) -> Result<Comment, Rejection> {
        require_privileged(&requester.session())?;
        let mut transaction = self.ctx.pool().begin_immediate().await?;
        Comment::find(&mut transaction, publication_id, comment_id)
            .await?
            .or_reject(ErrorCode::CommentNotFound)?;
        let comment = Comment::delete(&mut transaction, comment_id)
            .await?
            .or_reject(ErrorCode::CommentNotFound)?;
        transaction.commit().await?;
        tracing::info!(
            publication_id,
            comment_id,
            moderator_id = requester.id(),
            "comment is deleted"
        );
        Ok(comment)
    }

    /// Lists the comments of a publication, oldest first.
    pub(crate) async fn list(
        &self,
        publication_id: i64,
        page: Pagination,
    ) -> Result<Vec<Comment>, Rejection> {
        let mut conn = self.ctx.pool().acquire().await?;
        Publication::owner_of(&mut conn, publication_id)
            .await?
            .or_reject(ErrorCode::PublicationNotFound)?;
        Ok(Comment::list(&mut conn, publication_id, page.limit(), page.offset()).await?)
    }

    /// Returns a comment of a publication.
    pub(crate) async fn get(&self, publication_id: i64, comment_id: i64) -> Result<Comment, Rejection> {
        let mut conn = self.ctx.pool().acquire().await?;
        Comment::find(&mut conn, publication_id, comment_id)
            .await?
            .or_reject(ErrorCode::CommentNotFound)
    }
}
