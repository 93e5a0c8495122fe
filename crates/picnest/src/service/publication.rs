//! The publication aggregate: a publication with its image, tags, ratings and comments.
use super::{
    ConflictExt, Pagination,
    image::{parse_transformation, select_source, transform_blob},
    require_privileged,
};
use crate::context::AppContext;
use picnest_auth::resolve_effective_scope;
use picnest_core::response::{ErrorCode, OrReject, Rejection};
use picnest_model::{
    ImageUpdate, MAX_TAGS_PER_PUBLICATION, PubImage, Publication, PublicationDetail,
    PublicationInput, PublicationUpdate, Tag, User, validate_tag_name,
};
use picnest_orm::DatabaseConnection;
use picnest_storage::{BlobPath, BlobStore, Purpose};

/// Publication service.
pub(crate) struct PublicationService<'a> {
    ctx: &'a AppContext,
}

impl<'a> PublicationService<'a> {
    /// Creates a new instance.
    #[inline]
    pub(crate) fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Publishes the temporary image of the owner.
    ///
    /// The rows are inserted and the temporary blobs are moved to the publication folder
    /// in one transaction. If the commit fails, the blobs are moved back.
    pub(crate) async fn create(
        &self,
        owner: &User,
        input: PublicationInput,
    ) -> Result<PublicationDetail, Rejection> {
        let validation = input.validate();
        if !validation.is_success() {
            return Err(Rejection::bad_request(validation));
        }
        if input.exceeds_tag_limit() {
            return Err(ErrorCode::TagLimitExceeded.into());
        }

        let blob_store = self.ctx.blob_store();
        let current = BlobPath::temp(owner.email(), Purpose::CurrentImg);
        let updated = current.with_purpose(Purpose::UpdatedImg);
        if !blob_exists(blob_store, &current).await? {
            return Err(ErrorCode::ImageRequired.into());
        }
        let has_updated = blob_exists(blob_store, &updated).await?;

        let mut transaction = self.ctx.pool().begin_immediate().await?;
        let image = PubImage::insert_empty(&mut transaction).await?;
        let publication = Publication::insert(&mut transaction, owner.id(), &input).await?;
        let publication_id = publication.id();
        PubImage::link(&mut transaction, image.id(), publication_id).await?;
        for name in input.tag_names() {
            let tag = Tag::get_or_create(&mut transaction, name).await?;
            tag.attach(&mut transaction, publication_id).await?;
        }

        let mut sources = vec![&current];
        if has_updated {
            sources.push(&updated);
        }
        let mut promoted = Vec::with_capacity(sources.len());
        let mut image_update = ImageUpdate::default();
        for source in sources {
            let target = source.promote(publication_id);
            match blob_store.rename(source, &target).await {
                Ok(url) => {
                    if source.purpose() == Purpose::CurrentImg {
                        image_update.current_img = Some(url);
                    } else {
                        image_update.updated_img = Some(url);
                    }
                    promoted.push((source.clone(), target));
                }
                Err(err) => {
                    restore_blobs(blob_store, &promoted).await;
                    return Err(Rejection::upstream_unavailable(err));
                }
            }
        }

        let result: Result<PublicationDetail, sqlx::Error> = async {
            PubImage::update(&mut transaction, publication_id, &image_update).await?;
            PublicationDetail::load(&mut transaction, publication).await
        }
        .await;
        let detail = match result {
            Ok(detail) => detail,
            Err(err) => {
                restore_blobs(blob_store, &promoted).await;
                return Err(err.into());
            }
        };
        if let Err(err) = transaction.commit().await {
            restore_blobs(blob_store, &promoted).await;
            return Err(err.into());
        }
        tracing::info!(
            publication_id,
            user_id = owner.id(),
            num_tags = detail.tags().len(),
            "publication is created"
        );
        Ok(detail)
    }

    /// Returns a publication visible to the requester.
    pub(crate) async fn get(
        &self,
        requester: &User,
        id: i64,
    ) -> Result<PublicationDetail, Rejection> {
        let mut conn = self.ctx.pool().acquire().await?;
        let publication = find_visible(&mut conn, requester, id).await?;
        Ok(PublicationDetail::load(&mut conn, publication).await?)
    }

    /// Lists the publications of the owner, newest first.
    pub(crate) async fn list_by_owner(
        &self,
        owner: &User,
        page: Pagination,
    ) -> Result<Vec<PublicationDetail>, Rejection> {
        let mut conn = self.ctx.pool().acquire().await?;
        let publications =
            Publication::list_by_owner(&mut conn, owner.id(), page.limit(), page.offset()).await?;
        Ok(PublicationDetail::load_many(&mut conn, publications).await?)
    }

    /// Lists all publications, newest first. Only admins and moderators may do this.
    pub(crate) async fn list_all(
        &self,
        requester: &User,
        page: Pagination,
    ) -> Result<Vec<PublicationDetail>, Rejection> {
        require_privileged(&requester.session())?;
        let mut conn = self.ctx.pool().acquire().await?;
        let publications = Publication::list_all(&mut conn, page.limit(), page.offset()).await?;
        Ok(PublicationDetail::load_many(&mut conn, publications).await?)
    }

    /// Overwrites the supplied title and description.
    pub(crate) async fn update_text(
        &self,
        requester: &User,
        id: i64,
        update: PublicationUpdate,
    ) -> Result<PublicationDetail, Rejection> {
        let validation = update.validate();
        if !validation.is_success() {
            return Err(Rejection::bad_request(validation));
        }

        let mut transaction = self.ctx.pool().begin_immediate().await?;
        let owner_id = effective_owner(&mut transaction, requester, id).await?;
        let publication = Publication::update_text(&mut transaction, id, owner_id, &update)
            .await?
            .or_reject(ErrorCode::PublicationNotFound)?;
        let detail = PublicationDetail::load(&mut transaction, publication).await?;
        transaction.commit().await?;
        Ok(detail)
    }

    /// Overwrites the supplied image references.
    pub(crate) async fn update_image(
        &self,
        requester: &User,
        id: i64,
        update: ImageUpdate,
    ) -> Result<PublicationDetail, Rejection> {
        let mut transaction = self.ctx.pool().begin_immediate().await?;
        let publication = find_visible(&mut transaction, requester, id).await?;
        if !update.is_empty() {
            PubImage::update(&mut transaction, id, &update).await?;
            Publication::touch(&mut transaction, id).await?;
        }
        let publication = Publication::find(&mut transaction, publication.id())
            .await?
            .or_reject(ErrorCode::PublicationNotFound)?;
        let detail = PublicationDetail::load(&mut transaction, publication).await?;
        transaction.commit().await?;
        Ok(detail)
    }

    /// Deletes a publication and then the blobs in its folder.
    /// A failure of the blob store is logged and does not fail the deletion.
    pub(crate) async fn delete(&self, requester: &User, id: i64) -> Result<Publication, Rejection> {
        let mut transaction = self.ctx.pool().begin_immediate().await?;
        let owner_id = effective_owner(&mut transaction, requester, id).await?;
        let owner = User::find_by_id(&mut transaction, owner_id)
            .await?
            .or_reject(ErrorCode::PublicationNotFound)?;
        let publication = Publication::delete_scoped(&mut transaction, id, owner_id)
            .await?
            .or_reject(ErrorCode::PublicationNotFound)?;
        transaction.commit().await?;
        tracing::info!(publication_id = id, user_id = requester.id(), "publication is deleted");

        let prefix = BlobPath::publication_prefix(owner.email(), id);
        if let Err(err) = self.ctx.blob_store().delete_prefix(&prefix).await {
            tracing::error!(publication_id = id, "fail to delete the publication blobs: {err}");
        }
        Ok(publication)
    }

    /// Attaches a tag to a publication, creating the tag if absent.
    pub(crate) async fn add_tag(
        &self,
        requester: &User,
        id: i64,
        name: &str,
    ) -> Result<Tag, Rejection> {
        let mut validation = picnest_core::validation::Validation::new();
        validate_tag_name(&mut validation, name);
        if !validation.is_success() {
            return Err(Rejection::bad_request(validation));
        }

        let mut transaction = self.ctx.pool().begin_immediate().await?;
        find_visible(&mut transaction, requester, id).await?;
        let num_tags = Tag::count_for_publication(&mut transaction, id).await?;
        if usize::try_from(num_tags).unwrap_or(usize::MAX) >= MAX_TAGS_PER_PUBLICATION {
            return Err(ErrorCode::TagLimitExceeded.into());
        }
        let tag = Tag::get_or_create(&mut transaction, name).await?;
        tag.attach(&mut transaction, id).await.or_conflict(&[(
            "publication_tag.tag_id",
            ErrorCode::TagAlreadyPresent,
        )])?;
        Publication::touch(&mut transaction, id).await?;
        transaction.commit().await?;
        Ok(tag)
    }

    /// Detaches a tag from a publication. The tag itself is kept.
    pub(crate) async fn remove_tag(
        &self,
        requester: &User,
        id: i64,
        name: &str,
    ) -> Result<Tag, Rejection> {
        let mut transaction = self.ctx.pool().begin_immediate().await?;
        find_visible(&mut transaction, requester, id).await?;
        let tag = Tag::find_by_name(&mut transaction, name)
            .await?
            .or_reject(ErrorCode::TagNotFound)?;
        if !tag.detach(&mut transaction, id).await? {
            return Err(ErrorCode::TagNotFound.into());
        }
        Publication::touch(&mut transaction, id).await?;
        transaction.commit().await?;
        Ok(tag)
    }

    /// Detaches every tag from a publication and returns the number of detached tags.
    pub(crate) async fn remove_all_tags(&self, requester: &User, id: i64) -> Result<u64, Rejection> {
        let mut transaction = self.ctx.pool().begin_immediate().await?;
        find_visible(&mut transaction, requester, id).await?;
        let num_detached = Tag::detach_all(&mut transaction, id).await?;
        Publication::touch(&mut transaction, id).await?;
        transaction.commit().await?;
        Ok(num_detached)
    }

    /// Transforms the published image and records it as `updated_img`.
    /// A previous transformation is applied upon.
    pub(crate) async fn transform_image(
        &self,
        requester: &User,
        id: i64,
        key: &str,
    ) -> Result<PubImage, Rejection> {
        let transformation = parse_transformation(key)?;
        let mut transaction = self.ctx.pool().begin_immediate().await?;
        let (publication, owner) = find_visible_with_owner(&mut transaction, requester, id).await?;

        let blob_store = self.ctx.blob_store();
        let current = BlobPath::publication(owner.email(), publication.id(), Purpose::CurrentImg);
        let updated = current.with_purpose(Purpose::UpdatedImg);
        let source = select_source(blob_store, &updated, &current).await?;
        let url = transform_blob(blob_store, source, &updated, transformation).await?;

        let update = ImageUpdate {
            updated_img: Some(url),
            ..ImageUpdate::default()
        };
        let image = PubImage::update(&mut transaction, id, &update)
            .await?
            .or_reject(ErrorCode::ImageRequired)?;
        Publication::touch(&mut transaction, id).await?;
        transaction.commit().await?;
        Ok(image)
    }

    /// Encodes the URL of the published image as a QR code and records it as `qr_code_img`.
    pub(crate) async fn generate_qr_code(
        &self,
        requester: &User,
        id: i64,
    ) -> Result<PubImage, Rejection> {
        let mut transaction = self.ctx.pool().begin_immediate().await?;
        let (publication, owner) = find_visible_with_owner(&mut transaction, requester, id).await?;
        let image = PubImage::find_by_publication(&mut transaction, id)
            .await?
            .or_reject(ErrorCode::ImageRequired)?;
        let image_url = image
            .updated_img()
            .or(image.current_img())
            .or_reject(ErrorCode::ImageRequired)?;

        let bytes = self.ctx.qr_generator().encode(image_url)?;
        let path = BlobPath::publication(owner.email(), publication.id(), Purpose::QrCodeImg);
        let url = self
            .ctx
            .blob_store()
            .put(&path, bytes)
            .await
            .map_err(Rejection::upstream_unavailable)?;

        let update = ImageUpdate {
            qr_code_img: Some(url),
            ..ImageUpdate::default()
        };
        let image = PubImage::update(&mut transaction, id, &update)
            .await?
            .or_reject(ErrorCode::ImageRequired)?;
        transaction.commit().await?;
        Ok(image)
    }
}

/// Resolves the owner whose publications the requester may access for the publication.
async fn effective_owner(
    conn: &mut DatabaseConnection,
    requester: &User,
    id: i64,
) -> Result<i64, Rejection> {
    let owner_id = Publication::owner_of(conn, id)
        .await?
        .or_reject(ErrorCode::PublicationNotFound)?;
    Ok(resolve_effective_scope(&requester.session(), owner_id))
}

/// Finds a publication within the scope of the requester.
pub(super) async fn find_visible(
    conn: &mut DatabaseConnection,
    requester: &User,
    id: i64,
) -> Result<Publication, Rejection> {
    let owner_id = effective_owner(conn, requester, id).await?;
    Publication::find_scoped(conn, id, owner_id)
        .await?
        .or_reject(ErrorCode::PublicationNotFound)
}

async fn find_visible_with_owner(
    conn: &mut DatabaseConnection,
    requester: &User,
    id: i64,
) -> Result<(Publication, User), Rejection> {
    let publication = find_visible(conn, requester, id).await?;
    let owner = User::find_by_id(conn, publication.user_id())
        .await?
        .or_reject(ErrorCode::PublicationNotFound)?;
    Ok((publication, owner))
}

async fn blob_exists(blob_store: &dyn BlobStore, path: &BlobPath) -> Result<bool, Rejection> {
    blob_store
        .exists(path)
        .await
        .map_err(Rejection::upstream_unavailable)
}

/// Moves the promoted blobs back to their temporary paths.
async fn restore_blobs(blob_store: &dyn BlobStore, promoted: &[(BlobPath, BlobPath)]) {
    for (source, target) in promoted {
        if let Err(err) = blob_store.rename(target, source).await {
            tracing::error!(source = %source, target = %target, "fail to restore the blob: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{service::Pagination, testing};
    use picnest_core::{BoxFuture, error::Error, response::ErrorCode};
    use picnest_model::{CommentInput, ImageUpdate, PublicationInput, PublicationUpdate};
    use picnest_storage::{BlobPath, BlobStore, Folder, OpendalStore, Purpose};
    use std::sync::Arc;

    /// A blob store which can not move the temporary `updated_img`.
    struct BrokenRenameStore {
        inner: OpendalStore,
    }

    impl BlobStore for BrokenRenameStore {
        fn exists<'a>(&'a self, path: &'a BlobPath) -> BoxFuture<'a, Result<bool, Error>> {
            self.inner.exists(path)
        }

        fn put<'a>(
            &'a self,
            path: &'a BlobPath,
            bytes: Vec<u8>,
        ) -> BoxFuture<'a, Result<String, Error>> {
            self.inner.put(path, bytes)
        }

        fn read<'a>(&'a self, path: &'a BlobPath) -> BoxFuture<'a, Result<Vec<u8>, Error>> {
            self.inner.read(path)
        }

        fn rename<'a>(
            &'a self,
            from: &'a BlobPath,
            to: &'a BlobPath,
        ) -> BoxFuture<'a, Result<String, Error>> {
            if from.folder() == Folder::Temp && from.purpose() == Purpose::UpdatedImg {
                Box::pin(async { Err(Error::new("storage is unreachable")) })
            } else {
                self.inner.rename(from, to)
            }
        }

        fn delete<'a>(&'a self, path: &'a BlobPath) -> BoxFuture<'a, Result<(), Error>> {
            self.inner.delete(path)
        }

        fn delete_prefix<'a>(&'a self, prefix: &'a str) -> BoxFuture<'a, Result<(), Error>> {
            self.inner.delete_prefix(prefix)
        }

        fn url(&self, path: &BlobPath) -> String {
            self.inner.url(path)
        }
    }

    #[tokio::test]
    async fn it_moves_uploaded_images_into_the_publication_folder() {
        let (ctx, _) = testing::context().await;
        let alice = testing::sign_up(&ctx, "alice").await;
        ctx.images()
            .upload_temp(&alice, testing::png_bytes(16, 12))
            .await
            .unwrap();
        ctx.images().transform_temp(&alice, "grayscale").await.unwrap();

        let input = PublicationInput {
            title: Some("Sunset".to_owned()),
            description: None,
            tags: vec!["sunset".to_owned(), "beach".to_owned(), "sunset".to_owned()],
        };
        let detail = ctx.publications().create(&alice, input).await.unwrap();
        let id = detail.publication().id();
        let image = detail.image().unwrap();
        assert_eq!(
            image.current_img(),
            Some(format!("http://localhost:6080/blobs/alice@x.com/publications/{id}/current_img").as_str())
        );
        assert!(image.updated_img().is_some());
        assert_eq!(detail.tags().len(), 2);
        assert_eq!(detail.average_rating(), None);

        let blob_store = ctx.blob_store();
        let temp = BlobPath::temp("alice@x.com", Purpose::CurrentImg);
        assert!(!blob_store.exists(&temp).await.unwrap());
        assert!(blob_store.exists(&temp.promote(id)).await.unwrap());
    }

    #[tokio::test]
    async fn it_rolls_back_when_images_can_not_be_moved() {
        let inner = OpendalStore::memory("http://localhost:6080/blobs").unwrap();
        let (ctx, _) = testing::context_with_blob_store(Arc::new(BrokenRenameStore { inner })).await;
        let alice = testing::sign_up(&ctx, "alice").await;
        ctx.images()
            .upload_temp(&alice, testing::png_bytes(16, 12))
            .await
            .unwrap();
        ctx.images().transform_temp(&alice, "grayscale").await.unwrap();

        let input = PublicationInput {
            title: Some("Sunset".to_owned()),
            description: None,
            tags: vec!["sunset".to_owned()],
        };
        let rejection = ctx.publications().create(&alice, input).await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::UpstreamUnavailable);

        let mut conn = ctx.pool().acquire().await.unwrap();
        for table in ["publications", "pub_images", "publication_tag"] {
            let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(&mut *conn)
                .await
                .unwrap();
            assert_eq!(count, 0, "rows left in `{table}`");
        }
        drop(conn);

        let blob_store = ctx.blob_store();
        let current = BlobPath::temp("alice@x.com", Purpose::CurrentImg);
        assert!(blob_store.exists(&current).await.unwrap());
        assert!(!blob_store.exists(&current.promote(1)).await.unwrap());
        let updated = current.with_purpose(Purpose::UpdatedImg);
        assert!(blob_store.exists(&updated).await.unwrap());
    }

    #[tokio::test]
    async fn it_requires_an_uploaded_image() {
        let (ctx, _) = testing::context().await;
        let alice = testing::sign_up(&ctx, "alice").await;
        let input = PublicationInput {
            title: Some("Sunset".to_owned()),
            ..PublicationInput::default()
        };
        let rejection = ctx.publications().create(&alice, input).await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::ImageRequired);

        let input = PublicationInput {
            tags: ["one", "two", "three", "four", "five", "six"]
                .map(|tag| format!("{tag}-tag"))
                .to_vec(),
            ..PublicationInput::default()
        };
        let rejection = ctx.publications().create(&alice, input).await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::TagLimitExceeded);
    }

    #[tokio::test]
    async fn it_limits_tags_per_publication() {
        let (ctx, _) = testing::context().await;
        let alice = testing::sign_up(&ctx, "alice").await;
        let tags = ["sea", "sky", "sand", "sun", "surf"];
        let detail = testing::publish(&ctx, &alice, "Beach", &tags).await;
        let id = detail.publication().id();

        let publications = ctx.publications();
        let rejection = publications.add_tag(&alice, id, "wind").await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::TagLimitExceeded);
        let rejection = publications.add_tag(&alice, id, "sea").await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::TagLimitExceeded);
        assert_eq!(ctx.tags().list_for_publication(id).await.unwrap().len(), 5);

        let tag = publications.remove_tag(&alice, id, "surf").await.unwrap();
        assert_eq!(tag.name(), "surf");
        let rejection = publications.remove_tag(&alice, id, "surf").await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::TagNotFound);
        let rejection = publications.add_tag(&alice, id, "sea").await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::TagAlreadyPresent);
        publications.add_tag(&alice, id, "wind").await.unwrap();

        assert_eq!(publications.remove_all_tags(&alice, id).await.unwrap(), 5);
        assert!(ctx.tags().list_for_publication(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn it_scopes_publications_to_owners() {
        let (ctx, _) = testing::context().await;
        let admin = testing::sign_up(&ctx, "admin").await;
        let alice = testing::sign_up(&ctx, "alice").await;
        let bob = testing::sign_up(&ctx, "bob").await;
        let id = testing::publish(&ctx, &alice, "Sunset", &[])
            .await
            .publication()
            .id();

        let publications = ctx.publications();
        let detail = publications.get(&admin, id).await.unwrap();
        assert_eq!(detail.publication().user_id(), alice.id());
        let rejection = publications.get(&bob, id).await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::PublicationNotFound);
        let rejection = publications.delete(&bob, id).await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::PublicationNotFound);
        let rejection = publications.add_tag(&bob, id, "stolen").await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::PublicationNotFound);

        let rejection = publications
            .list_all(&bob, Pagination::default())
            .await
            .unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::Forbidden);
        let all = publications
            .list_all(&admin, Pagination::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert!(
            publications
                .list_by_owner(&bob, Pagination::default())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn it_updates_text_partially() {
        let (ctx, _) = testing::context().await;
        let alice = testing::sign_up(&ctx, "alice").await;
        let id = testing::publish(&ctx, &alice, "Sunset", &[])
            .await
            .publication()
            .id();

        let update = PublicationUpdate {
            title: Some("Sunrise".to_owned()),
            description: None,
        };
        let detail = ctx
            .publications()
            .update_text(&alice, id, update)
            .await
            .unwrap();
        assert_eq!(detail.publication().title(), Some("Sunrise"));
        assert_eq!(detail.publication().description(), Some("A quiet morning"));

        let update = PublicationUpdate {
            title: Some(String::new()),
            description: None,
        };
        let rejection = ctx
            .publications()
            .update_text(&alice, id, update)
            .await
            .unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::ValidationFailed);

        let update = ImageUpdate {
            qr_code_img: Some("http://cdn.example.com/qr.png".to_owned()),
            ..ImageUpdate::default()
        };
        let detail = ctx
            .publications()
            .update_image(&alice, id, update)
            .await
            .unwrap();
        let image = detail.image().unwrap();
        assert_eq!(image.qr_code_img(), Some("http://cdn.example.com/qr.png"));
        assert!(image.current_img().is_some());
    }

    #[tokio::test]
    async fn it_transforms_published_images() {
        let (ctx, _) = testing::context().await;
        let alice = testing::sign_up(&ctx, "alice").await;
        let id = testing::publish(&ctx, &alice, "Sunset", &[])
            .await
            .publication()
            .id();

        let publications = ctx.publications();
        let rejection = publications
            .transform_image(&alice, id, "sepia")
            .await
            .unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::InvalidTransformation);

        let image = publications.transform_image(&alice, id, "left").await.unwrap();
        let updated_img = image.updated_img().unwrap().to_owned();
        assert!(updated_img.ends_with(&format!("/publications/{id}/updated_img")));

        let image = publications.generate_qr_code(&alice, id).await.unwrap();
        assert_eq!(image.updated_img(), Some(updated_img.as_str()));
        let path = BlobPath::publication("alice@x.com", id, Purpose::QrCodeImg);
        let bytes = ctx.blob_store().read(&path).await.unwrap();
        assert!(::image::load_from_memory(&bytes).is_ok());
        assert!(image.qr_code_img().is_some());
    }

    #[tokio::test]
    async fn it_deletes_publications_with_children() {
        let (ctx, _) = testing::context().await;
        let alice = testing::sign_up(&ctx, "alice").await;
        let bob = testing::sign_up(&ctx, "bob").await;
        let first = testing::publish(&ctx, &alice, "Sunset", &["shared"])
            .await
            .publication()
            .id();
        let second = testing::publish(&ctx, &alice, "Sunrise", &["shared"])
            .await
            .publication()
            .id();
        ctx.ratings().add(&bob, first, 4).await.unwrap();
        let input = CommentInput {
            text: "Lovely colors".to_owned(),
        };
        ctx.comments().add(&bob, first, input).await.unwrap();

        let publication = ctx.publications().delete(&alice, first).await.unwrap();
        assert_eq!(publication.id(), first);
        let rejection = ctx.publications().get(&alice, first).await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::PublicationNotFound);
        let rejection = ctx
            .comments()
            .list(first, Pagination::default())
            .await
            .unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::PublicationNotFound);

        let tags = ctx.tags().list_for_publication(second).await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name(), "shared");

        let path = BlobPath::publication("alice@x.com", first, Purpose::CurrentImg);
        assert!(!ctx.blob_store().exists(&path).await.unwrap());
        let path = BlobPath::publication("alice@x.com", second, Purpose::CurrentImg);
        assert!(ctx.blob_store().exists(&path).await.unwrap());
    }
}
