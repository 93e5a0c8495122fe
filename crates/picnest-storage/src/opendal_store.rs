use super::{BlobPath, BlobStore};
use opendal::{
    ErrorKind, Operator,
    layers::TracingLayer,
    services::{Fs, Memory},
};
use picnest_core::{BoxFuture, error::Error, extension::TomlTableExt};
use toml::Table;

/// Blob store built on the top of [`opendal`](https://crates.io/crates/opendal).
#[derive(Debug, Clone)]
pub struct OpendalStore {
    /// Operator.
    operator: Operator,
    /// Base URL of the public blobs.
    public_url: String,
}

impl OpendalStore {
    /// Creates a new instance.
    #[inline]
    pub fn new(operator: Operator, public_url: impl Into<String>) -> Self {
        let public_url = public_url.into();
        Self {
            operator,
            public_url: public_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Creates a new instance with the `[storage]` config.
    ///
    /// Supported schemes are `fs` and `memory`.
    pub fn with_config(config: &Table) -> Result<Self, Error> {
        let scheme = config.get_str("scheme").unwrap_or("fs");
        let public_url = config
            .get_str("public-url")
            .unwrap_or("http://localhost:6080/blobs");
        let operator = match scheme {
            "fs" => {
                let root = config.get_str("root").unwrap_or("local/blobs");
                let mut builder = Fs::default().root(root);
                if let Some(atomic_write_dir) = config.get_str("atomic-write-dir") {
                    builder = builder.atomic_write_dir(atomic_write_dir);
                }
                Operator::new(builder)?.layer(TracingLayer).finish()
            }
            "memory" => Operator::new(Memory::default())?
                .layer(TracingLayer)
                .finish(),
            _ => picnest_core::bail!("storage scheme `{scheme}` is not supported"),
        };
        tracing::info!(scheme, public_url, "blob store is configured");
        Ok(Self::new(operator, public_url))
    }

    /// Creates an in-memory store.
    pub fn memory(public_url: impl Into<String>) -> Result<Self, Error> {
        let operator = Operator::new(Memory::default())?.finish();
        Ok(Self::new(operator, public_url))
    }

    /// Returns a reference to the operator.
    #[inline]
    pub fn operator(&self) -> &Operator {
        &self.operator
    }
}

impl BlobStore for OpendalStore {
    fn exists<'a>(&'a self, path: &'a BlobPath) -> BoxFuture<'a, Result<bool, Error>> {
        Box::pin(async move {
            match self.operator.stat(&path.to_string()).await {
                Ok(metadata) => Ok(metadata.is_file()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
                Err(err) => Err(Error::with_source(format!("fail to stat `{path}`"), err)),
            }
        })
    }

    fn put<'a>(
        &'a self,
        path: &'a BlobPath,
        bytes: Vec<u8>,
    ) -> BoxFuture<'a, Result<String, Error>> {
        Box::pin(async move {
            let size = bytes.len();
            self.operator
                .write(&path.to_string(), bytes)
                .await
                .map_err(|err| Error::with_source(format!("fail to write `{path}`"), err))?;
            tracing::debug!(path = %path, size, "blob is stored");
            Ok(self.url(path))
        })
    }

    fn read<'a>(&'a self, path: &'a BlobPath) -> BoxFuture<'a, Result<Vec<u8>, Error>> {
        Box::pin(async move {
            let buffer = self
                .operator
                .read(&path.to_string())
                .await
                .map_err(|err| Error::with_source(format!("fail to read `{path}`"), err))?;
            Ok(buffer.to_vec())
        })
    }

    fn rename<'a>(
        &'a self,
        from: &'a BlobPath,
        to: &'a BlobPath,
    ) -> BoxFuture<'a, Result<String, Error>> {
        Box::pin(async move {
            let (source, target) = (from.to_string(), to.to_string());
            if self.operator.info().full_capability().rename {
                self.operator
                    .rename(&source, &target)
                    .await
                    .map_err(|err| Error::with_source(format!("fail to rename `{from}`"), err))?;
            } else {
                // Backends without native renames get a copy followed by a delete.
                let buffer = self
                    .operator
                    .read(&source)
                    .await
                    .map_err(|err| Error::with_source(format!("fail to read `{from}`"), err))?;
                self.operator
                    .write(&target, buffer)
                    .await
                    .map_err(|err| Error::with_source(format!("fail to write `{to}`"), err))?;
                self.operator
                    .delete(&source)
                    .await
                    .map_err(|err| Error::with_source(format!("fail to delete `{from}`"), err))?;
            }
            tracing::debug!(from = %from, to = %to, "blob is moved");
            Ok(self.url(to))
        })
    }

    fn delete<'a>(&'a self, path: &'a BlobPath) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            self.operator
                .delete(&path.to_string())
                .await
                .map_err(|err| Error::with_source(format!("fail to delete `{path}`"), err))
        })
    }

    fn delete_prefix<'a>(&'a self, prefix: &'a str) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            // A trailing slash keeps `7` from matching the folder `70`.
            let dir = format!("{}/", prefix.trim_end_matches('/'));
            let entries = match self.operator.list_with(&dir).recursive(true).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
                Err(err) => {
                    return Err(Error::with_source(format!("fail to list `{dir}`"), err));
                }
            };
            let mut num_deleted = 0;
            for entry in entries {
                if entry.metadata().is_file() {
                    self.operator.delete(entry.path()).await.map_err(|err| {
                        Error::with_source(format!("fail to delete `{}`", entry.path()), err)
                    })?;
                    num_deleted += 1;
                }
            }
            tracing::debug!(prefix = %dir, num_deleted, "blobs are deleted");
            Ok(())
        })
    }

    #[inline]
    fn url(&self, path: &BlobPath) -> String {
        format!("{}/{path}", self.public_url)
    }
}
