use super::ConnectionPool;
use picnest_core::error::Error;

/// Table definitions, in dependency order.
const TABLES: [(&str, &str); 7] = [
    (
        "users",
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user'
                CHECK (role IN ('admin', 'moderator', 'user')),
            confirmed BOOLEAN NOT NULL DEFAULT FALSE,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            about TEXT,
            avatar TEXT,
            refresh_token TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
    (
        "tags",
        "CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )",
    ),
    (
        "publications",
        "CREATE TABLE IF NOT EXISTS publications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            title TEXT,
            description TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
    (
        "pub_images",
        "CREATE TABLE IF NOT EXISTS pub_images (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            publication_id INTEGER UNIQUE REFERENCES publications (id) ON DELETE CASCADE,
            current_img TEXT,
            updated_img TEXT,
            qr_code_img TEXT
        )",
    ),
    (
        "publication_tag",
        "CREATE TABLE IF NOT EXISTS publication_tag (
            publication_id INTEGER NOT NULL REFERENCES publications (id) ON DELETE CASCADE,
            tag_id INTEGER NOT NULL REFERENCES tags (id) ON DELETE CASCADE,
            PRIMARY KEY (publication_id, tag_id)
        )",
    ),
    (
        "ratings",
        "CREATE TABLE IF NOT EXISTS ratings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            publication_id INTEGER NOT NULL REFERENCES publications (id) ON DELETE CASCADE,
            score INTEGER NOT NULL CHECK (score BETWEEN 1 AND 5),
            created_at TEXT NOT NULL,
            UNIQUE (user_id, publication_id)
        )",
    ),
    (
        "comments",
        "CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            publication_id INTEGER NOT NULL REFERENCES publications (id) ON DELETE CASCADE,
            text TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
];

/// Secondary indexes.
const INDEXES: [&str; 4] = [
    "CREATE INDEX IF NOT EXISTS publications_user_id_index ON publications (user_id, created_at)",
    "CREATE INDEX IF NOT EXISTS ratings_publication_id_index ON ratings (publication_id)",
    "CREATE INDEX IF NOT EXISTS comments_publication_id_index ON comments (publication_id, created_at)",
    "CREATE INDEX IF NOT EXISTS publication_tag_tag_id_index ON publication_tag (tag_id)",
];

/// Creates the tables and indexes if they do not exist.
pub async fn migrate(pool: &ConnectionPool) -> Result<(), Error> {
    let name = pool.name();
    let mut transaction = pool.begin_immediate().await?;
    for (table_name, sql) in TABLES {
        sqlx::query(sql).execute(&mut *transaction).await.map_err(|err| {
            Error::with_source(format!("fail to create the table `{table_name}`"), err)
        })?;
    }
    for sql in INDEXES {
        sqlx::query(sql).execute(&mut *transaction).await?;
    }
    transaction.commit().await?;
    tracing::info!(
        pool = name,
        num_tables = TABLES.len(),
        "migrated the database schema"
    );
    Ok(())
}
