//! Request handlers.
use axum::extract::Multipart;
use picnest_core::response::{ErrorCode, Rejection};

pub(crate) mod auth;
pub(crate) mod comment;
pub(crate) mod health;
pub(crate) mod publication;
pub(crate) mod rating;
pub(crate) mod tag;
pub(crate) mod user;

/// Reads the bytes of the `file` field in a multipart form.
async fn read_file(mut multipart: Multipart) -> Result<Vec<u8>, Rejection> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| Rejection::from_validation_entry("file", err))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|err| Rejection::from_validation_entry("file", err))?;
            return Ok(bytes.to_vec());
        }
    }
    Err(ErrorCode::ImageRequired.into())
}
