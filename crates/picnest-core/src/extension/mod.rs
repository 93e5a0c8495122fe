//! Extension traits for the configuration values.

mod duration;
mod toml_table;

pub use duration::{ParseDurationError, parse_duration};
pub use toml_table::TomlTableExt;
