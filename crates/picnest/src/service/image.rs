//! Temporary images which are uploaded before a publication is created.
use crate::context::AppContext;
use picnest_core::response::{ErrorCode, Rejection};
use picnest_model::User;
use picnest_storage::{BlobPath, BlobStore, Purpose, Transformation};

/// Temporary image service.
pub(crate) struct ImageService<'a> {
    ctx: &'a AppContext,
}

impl<'a> ImageService<'a> {
    /// Creates a new instance.
    #[inline]
    pub(crate) fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Stores the uploaded image as the temporary `current_img` of the owner
    /// and discards the stale transformed image.
    pub(crate) async fn upload_temp(&self, owner: &User, bytes: Vec<u8>) -> Result<String, Rejection> {
        check_image(&bytes)?;
        let blob_store = self.ctx.blob_store();
        let current = BlobPath::temp(owner.email(), Purpose::CurrentImg);
        let updated = current.with_purpose(Purpose::UpdatedImg);
        let url = blob_store
            .put(&current, bytes)
            .await
            .map_err(Rejection::upstream_unavailable)?;
        blob_store
            .delete(&updated)
            .await
            .map_err(Rejection::upstream_unavailable)?;
        tracing::info!(user_id = owner.id(), "temporary image is uploaded");
        Ok(url)
    }

    /// Transforms the temporary image and stores the result as `updated_img`.
    /// A previous transformation is applied upon.
    pub(crate) async fn transform_temp(&self, owner: &User, key: &str) -> Result<String, Rejection> {
        let transformation = parse_transformation(key)?;
        let blob_store = self.ctx.blob_store();
        let current = BlobPath::temp(owner.email(), Purpose::CurrentImg);
        let updated = current.with_purpose(Purpose::UpdatedImg);
        let source = select_source(blob_store, &updated, &current).await?;
        transform_blob(blob_store, source, &updated, transformation).await
    }
}

/// Rejects the bytes if they are not in a supported image format.
pub(super) fn check_image(bytes: &[u8]) -> Result<(), Rejection> {
    if bytes.is_empty() {
        return Err(ErrorCode::ImageRequired.into());
    }
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Png | image::ImageFormat::Jpeg) => Ok(()),
        Ok(format) => Err(Rejection::from_validation_entry(
            "file",
            picnest_core::error::Error::new(format!("unsupported image format `{format:?}`")),
        )),
        Err(err) => Err(Rejection::from_validation_entry("file", err)),
    }
}

/// Parses the name of a transformation.
pub(super) fn parse_transformation(key: &str) -> Result<Transformation, Rejection> {
    key.parse::<Transformation>().map_err(|err| {
        tracing::warn!(key, "unknown image transformation");
        Rejection::with_error(ErrorCode::InvalidTransformation, err)
    })
}

/// Returns the preferred path if it exists, or the fallback one,
/// or an `ImageRequired` rejection if neither does.
pub(super) async fn select_source<'p>(
    blob_store: &dyn BlobStore,
    preferred: &'p BlobPath,
    fallback: &'p BlobPath,
) -> Result<&'p BlobPath, Rejection> {
    for path in [preferred, fallback] {
        if blob_store
            .exists(path)
            .await
            .map_err(Rejection::upstream_unavailable)?
        {
            return Ok(path);
        }
    }
    Err(ErrorCode::ImageRequired.into())
}

/// Reads the source, applies the transformation and writes the target.
pub(super) async fn transform_blob(
    blob_store: &dyn BlobStore,
    source: &BlobPath,
    target: &BlobPath,
    transformation: Transformation,
) -> Result<String, Rejection> {
    let bytes = blob_store
        .read(source)
        .await
        .map_err(Rejection::upstream_unavailable)?;
    let output = transformation
        .apply(&bytes)
        .map_err(|err| Rejection::from_validation_entry("file", err))?;
    let url = blob_store
        .put(target, output)
        .await
        .map_err(Rejection::upstream_unavailable)?;
    tracing::info!(source = %source, target = %target, %transformation, "image is transformed");
    Ok(url)
}
