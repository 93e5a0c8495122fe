use super::{DatabasePool, DatabaseTransaction};
use picnest_core::{error::Error, extension::TomlTableExt};
use sqlx::{
    pool::{PoolConnection, PoolOptions},
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
};
use std::{
    str::FromStr,
    sync::atomic::{AtomicBool, Ordering::Relaxed},
    time::Duration,
};
use toml::Table;

/// A database connection pool with a name and availability flag.
#[derive(Debug)]
pub struct ConnectionPool {
    /// Name.
    name: String,
    /// Database.
    database: String,
    /// Pool.
    pool: DatabasePool,
    /// Availability.
    available: AtomicBool,
}

impl ConnectionPool {
    /// Creates a new instance.
    #[inline]
    pub fn new(name: impl Into<String>, database: impl Into<String>, pool: DatabasePool) -> Self {
        Self {
            name: name.into(),
            database: database.into(),
            pool,
            available: AtomicBool::new(true),
        }
    }

    /// Connects lazily to the database according to the `[database]` config.
    pub fn with_config(config: &Table) -> Result<Self, Error> {
        let name = config.get_str("name").unwrap_or("main");
        let database = config.get_str("database").unwrap_or("local/data/picnest.db");
        let mut connect_options = if database.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(database)?
        } else {
            SqliteConnectOptions::new()
                .filename(database)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        };
        let busy_timeout = config
            .get_duration("busy-timeout")
            .unwrap_or_else(|| Duration::from_secs(5));
        connect_options = connect_options
            .foreign_keys(true)
            .busy_timeout(busy_timeout);
        if let Some(statement_cache_capacity) = config.get_usize("statement-cache-capacity") {
            connect_options = connect_options.statement_cache_capacity(statement_cache_capacity);
        }

        let max_connections = config.get_u32("max-connections").unwrap_or(16);
        let min_connections = config.get_u32("min-connections").unwrap_or(1);
        let max_lifetime = config
            .get_duration("max-lifetime")
            .unwrap_or_else(|| Duration::from_secs(24 * 60 * 60));
        let idle_timeout = config
            .get_duration("idle-timeout")
            .unwrap_or_else(|| Duration::from_secs(60 * 60));
        let acquire_timeout = config
            .get_duration("acquire-timeout")
            .unwrap_or_else(|| Duration::from_secs(60));
        let pool = PoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .max_lifetime(max_lifetime)
            .idle_timeout(idle_timeout)
            .acquire_timeout(acquire_timeout)
            .connect_lazy_with(connect_options);
        Ok(Self::new(name, database, pool))
    }

    /// Connects to a private in-memory database.
    ///
    /// The pool holds a single connection which never expires,
    /// since every new connection would open an empty database.
    pub async fn connect_memory() -> Result<Self, Error> {
        let connect_options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = PoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_options)
            .await?;
        Ok(Self::new("memory", ":memory:", pool))
    }

    /// Returns the name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the database.
    #[inline]
    pub fn database(&self) -> &str {
        self.database.as_str()
    }

    /// Returns a reference to the pool.
    #[inline]
    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Returns `true` if the connection pool is available.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.available.load(Relaxed)
    }

    /// Stores the availability of the connection pool.
    #[inline]
    pub fn store_availability(&self, available: bool) {
        self.available.store(available, Relaxed);
    }

    /// Retrieves a connection from the pool.
    pub async fn acquire(&self) -> Result<PoolConnection<super::DatabaseDriver>, Error> {
        match self.pool.acquire().await {
            Ok(conn) => {
                self.store_availability(true);
                Ok(conn)
            }
            Err(err) => {
                let name = self.name();
                tracing::error!("fail to acquire a connection for the `{name}` service: {err}");
                self.store_availability(false);
                Err(err.into())
            }
        }
    }

    /// Begins a new transaction.
    pub async fn begin(&self) -> Result<DatabaseTransaction, Error> {
        self.pool.begin().await.map_err(|err| {
            self.store_availability(false);
            Error::with_source("fail to begin a transaction", err)
        })
    }

    /// Begins a new transaction which takes the write lock up front.
    ///
    /// A deferred transaction that reads before writing can not wait for
    /// the lock held by another writer, so every write path should use this.
    pub async fn begin_immediate(&self) -> Result<DatabaseTransaction, Error> {
        self.pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|err| {
                self.store_availability(false);
                Error::with_source("fail to begin an immediate transaction", err)
            })
    }

    /// Checks the availability of the connection pool.
    pub async fn check_availability(&self) -> bool {
        let name = self.name();
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => {
                tracing::info!("acquire a connection for the `{name}` service successfully");
                self.store_availability(true);
                true
            }
            Err(err) => {
                tracing::error!("fail to acquire a connection for the `{name}` service: {err}");
                self.store_availability(false);
                false
            }
        }
    }

    /// Shuts down the connection pool.
    pub async fn close(&self) {
        let name = self.name();
        tracing::warn!("closing the connection pool for the `{name}` service");
        self.pool.close().await;
    }
}

impl AsRef<DatabasePool> for ConnectionPool {
    #[inline]
    fn as_ref(&self) -> &DatabasePool {
        &self.pool
    }
}

