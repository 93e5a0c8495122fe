use crate::{NewUser, Publication, PublicationInput, User};
use picnest_auth::Role;
use picnest_orm::{ConnectionPool, migrate};
use sqlx::pool::PoolConnection;

/// Connects to a migrated in-memory database.
pub(crate) async fn connect() -> PoolConnection<sqlx::Sqlite> {
    let pool = ConnectionPool::connect_memory().await.unwrap();
    migrate(&pool).await.unwrap();
    pool.acquire().await.unwrap()
}

/// Inserts a user with a placeholder password hash.
pub(crate) async fn insert_user(conn: &mut sqlx::SqliteConnection, name: &str, role: Role) -> User {
    let user = NewUser {
        username: name.to_owned(),
        email: format!("{name}@x.com"),
        password_hash: "$argon2id$placeholder".to_owned(),
        role,
        about: None,
    };
    User::insert(conn, &user).await.unwrap()
}

/// Inserts a publication with a title.
pub(crate) async fn insert_publication(
    conn: &mut sqlx::SqliteConnection,
    owner: &User,
    title: &str,
) -> Publication {
    let input = PublicationInput {
        title: Some(title.to_owned()),
        description: Some("A quiet morning".to_owned()),
        tags: Vec::new(),
    };
    Publication::insert(conn, owner.id(), &input).await.unwrap()
}
