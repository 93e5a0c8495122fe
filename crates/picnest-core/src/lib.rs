#![doc = include_str!("../README.md")]
#![allow(async_fn_in_trait)]

pub mod crypto;
pub mod error;
pub mod extension;
pub mod response;
pub mod state;
pub mod trace;
pub mod validation;

#[doc(no_inline)]
pub use serde_json::json;

/// A JSON value.
pub type JsonValue = serde_json::Value;

/// A JSON key-value type.
pub type Map = serde_json::Map<String, JsonValue>;

/// A TOML table.
pub type TomlTable = toml::Table;

/// A value which is initialized on the first access.
pub type LazyLock<T> = std::sync::LazyLock<T>;

/// An allocation-optimized string.
pub type SharedString = std::borrow::Cow<'static, str>;

/// Combined date and time in UTC.
pub type DateTime = chrono::DateTime<chrono::Utc>;

/// An owned dynamically typed error.
pub type BoxError = Box<dyn std::error::Error + Sync + Send + 'static>;

/// An owned dynamically typed future.
pub type BoxFuture<'a, T = ()> =
    std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;
