use super::BlobPath;
use picnest_core::{BoxFuture, error::Error};

/// Object storage for image blobs.
///
/// Every call is keyed by a stable path, so repeating a `put`, `rename`
/// or `delete_prefix` after a partial failure is safe.
pub trait BlobStore: Send + Sync {
    /// Returns `true` if a blob exists at the path.
    fn exists<'a>(&'a self, path: &'a BlobPath) -> BoxFuture<'a, Result<bool, Error>>;

    /// Writes the bytes to the path, overwriting any existing blob, and returns its URL.
    fn put<'a>(&'a self, path: &'a BlobPath, bytes: Vec<u8>)
    -> BoxFuture<'a, Result<String, Error>>;

    /// Reads the blob at the path.
    fn read<'a>(&'a self, path: &'a BlobPath) -> BoxFuture<'a, Result<Vec<u8>, Error>>;

    /// Moves a blob to another path and returns the new URL.
    fn rename<'a>(
        &'a self,
        from: &'a BlobPath,
        to: &'a BlobPath,
    ) -> BoxFuture<'a, Result<String, Error>>;

    /// Deletes the blob at the path if it exists.
    fn delete<'a>(&'a self, path: &'a BlobPath) -> BoxFuture<'a, Result<(), Error>>;

    /// Deletes every blob under the prefix.
    fn delete_prefix<'a>(&'a self, prefix: &'a str) -> BoxFuture<'a, Result<(), Error>>;

    /// Returns the public URL of the path.
    fn url(&self, path: &BlobPath) -> String;
}
