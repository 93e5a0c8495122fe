#![doc = include_str!("../README.md")]

mod blob_path;
mod blob_store;
mod opendal_store;
mod qr_code;
mod transformation;

pub use blob_path::{BlobPath, Folder, ParseBlobPathError, Purpose};
pub use blob_store::BlobStore;
pub use opendal_store::OpendalStore;
pub use qr_code::QrCodeGenerator;
pub use transformation::Transformation;
