//! Tag catalog.
use crate::context::AppContext;
use picnest_core::{
    response::{ErrorCode, OrReject, Rejection},
    validation::Validation,
};
use picnest_model::{Publication, Tag, validate_tag_name};

/// Tag service.
pub(crate) struct TagService<'a> {
    ctx: &'a AppContext,
}

impl<'a> TagService<'a> {
    /// Creates a new instance.
    #[inline]
    pub(crate) fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Gets or creates each of the tags in one transaction.
    pub(crate) async fn create_many(&self, names: &[String]) -> Result<Vec<Tag>, Rejection> {
        let mut validation = Validation::new();
        for name in names {
            validate_tag_name(&mut validation, name);
        }
        if !validation.is_success() {
            return Err(Rejection::bad_request(validation));
        }

        let names = names.to_vec();
        self.ctx
            .pool()
            .transaction(move |conn| {
                Box::pin(async move {
                    let mut tags: Vec<Tag> = Vec::with_capacity(names.len());
                    for name in &names {
                        let tag = Tag::get_or_create(conn, name).await?;
                        if !tags.contains(&tag) {
                            tags.push(tag);
                        }
                    }
                    Ok::<_, Rejection>(tags)
                })
            })
            .await
    }

    /// Lists the tags of a publication.
    pub(crate) async fn list_for_publication(
        &self,
        publication_id: i64,
    ) -> Result<Vec<Tag>, Rejection> {
        let mut conn = self.ctx.pool().acquire().await?;
        Publication::owner_of(&mut conn, publication_id)
            .await?
            .or_reject(ErrorCode::PublicationNotFound)?;
        Ok(Tag::list_for_publication(&mut conn, publication_id).await?)
    }
}
