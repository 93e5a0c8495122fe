#![doc = include_str!("../README.md")]

mod constraint;
mod pool;
mod schema;
mod transaction;

pub use constraint::ConstraintViolation;
pub use pool::ConnectionPool;
pub use schema::migrate;

/// Driver-specific database.
pub type DatabaseDriver = sqlx::Sqlite;

/// Driver-specific database connection.
pub type DatabaseConnection = sqlx::SqliteConnection;

/// Driver-specific database pool.
pub type DatabasePool = sqlx::SqlitePool;

/// Driver-specific database row.
pub type DatabaseRow = sqlx::sqlite::SqliteRow;

/// An in-progress database transaction.
pub type DatabaseTransaction = sqlx::Transaction<'static, DatabaseDriver>;
