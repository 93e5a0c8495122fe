//! The `user` model and related queries.

use picnest_auth::{Role, UserSession};
use picnest_core::{DateTime, validation::Validation};
use picnest_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The `user` model.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    // Basic fields.
    id: i64,
    username: String,
    email: String,
    #[serde(skip)]
    password_hash: String,
    #[sqlx(try_from = "String")]
    role: Role,

    // Status fields.
    confirmed: bool,
    is_active: bool,

    // Profile fields.
    about: Option<String>,
    avatar: Option<String>,

    // Session fields.
    #[serde(skip)]
    refresh_token: Option<String>,

    // Revisions.
    created_at: DateTime,
    updated_at: DateTime,
}

/// Data for a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Argon2 password hash.
    pub password_hash: String,
    /// Role.
    pub role: Role,
    /// Optional self-description.
    pub about: Option<String>,
}

/// Signup data submitted by a visitor.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupInput {
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Raw password.
    pub password: String,
    /// Optional self-description.
    #[serde(default)]
    pub about: Option<String>,
}

impl SignupInput {
    /// Validates the signup data.
    pub fn validate(&self) -> Validation {
        let mut validation = Validation::new();
        User::validate_username(&mut validation, &self.username);
        validation.validate_format("email", &self.email, "email");
        validation.validate_length("password", &self.password, 6, 15);
        if let Some(about) = &self.about {
            User::validate_about(&mut validation, about);
        }
        validation
    }
}

impl User {
    /// Returns the `id`.
    #[inline]
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Returns the `username`.
    #[inline]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the `email`.
    #[inline]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the `password_hash`.
    #[inline]
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    /// Returns the `role`.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns `true` if the email has been confirmed.
    #[inline]
    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    /// Returns `true` if the user is not blocked.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the `about`.
    #[inline]
    pub fn about(&self) -> Option<&str> {
        self.about.as_deref()
    }

    /// Returns the `avatar`.
    #[inline]
    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    /// Returns the stored refresh token.
    #[inline]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Returns the `created_at`.
    #[inline]
    pub fn created_at(&self) -> DateTime {
        self.created_at
    }

    /// Returns the session of the user as a requester.
    #[inline]
    pub fn session(&self) -> UserSession {
        UserSession::new(self.id, self.role)
    }

    /// Validates a username.
    pub fn validate_username(validation: &mut Validation, username: &str) {
        validation.validate_length("username", username, 3, 50);
    }

    /// Validates a self-description.
    pub fn validate_about(validation: &mut Validation, about: &str) {
        validation.validate_length("about", about, 1, 255);
    }
}

impl User {
    /// Counts all users.
    pub async fn count(conn: &mut DatabaseConnection) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *conn)
            .await
    }

    /// Inserts a new user.
    pub async fn insert(conn: &mut DatabaseConnection, user: &NewUser) -> Result<Self, sqlx::Error> {
        let now = chrono::Utc::now();
        sqlx::query_as(
            "INSERT INTO users (username, email, password_hash, role, about, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.about)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
    }

    /// Finds a user by ID.
    pub async fn find_by_id(
        conn: &mut DatabaseConnection,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Finds a user by the email address.
    pub async fn find_by_email(
        conn: &mut DatabaseConnection,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Finds a user by the username.
    pub async fn find_by_username(
        conn: &mut DatabaseConnection,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Marks the email of the user as confirmed.
    pub async fn confirm_email(
        conn: &mut DatabaseConnection,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            "UPDATE users SET confirmed = TRUE, updated_at = ? WHERE email = ? RETURNING *",
        )
        .bind(chrono::Utc::now())
        .bind(email)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Blocks or unblocks the user. Blocking also revokes the refresh token.
    pub async fn set_active(
        conn: &mut DatabaseConnection,
        id: i64,
        is_active: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            "UPDATE users SET is_active = ?, \
             refresh_token = CASE WHEN ? THEN refresh_token ELSE NULL END, \
             updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(is_active)
        .bind(is_active)
        .bind(chrono::Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Stores or revokes the refresh token.
    pub async fn set_refresh_token(
        conn: &mut DatabaseConnection,
        id: i64,
        refresh_token: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET refresh_token = ? WHERE id = ?")
            .bind(refresh_token)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Changes the username.
    pub async fn update_username(
        conn: &mut DatabaseConnection,
        id: i64,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("UPDATE users SET username = ?, updated_at = ? WHERE id = ? RETURNING *")
            .bind(username)
            .bind(chrono::Utc::now())
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Changes the self-description.
    pub async fn update_about(
        conn: &mut DatabaseConnection,
        id: i64,
        about: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("UPDATE users SET about = ?, updated_at = ? WHERE id = ? RETURNING *")
            .bind(about)
            .bind(chrono::Utc::now())
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Changes the avatar URL.
    pub async fn update_avatar(
        conn: &mut DatabaseConnection,
        id: i64,
        avatar: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("UPDATE users SET avatar = ?, updated_at = ? WHERE id = ? RETURNING *")
            .bind(avatar)
            .bind(chrono::Utc::now())
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::{SignupInput, User};
    use crate::testing;
    use picnest_auth::Role;
    use picnest_orm::ConstraintViolation;

    #[test]
    fn it_validates_signup_data() {
        let input = SignupInput {
            username: "al".to_owned(),
            email: "alice.example.com".to_owned(),
            password: "12345".to_owned(),
            about: Some(String::new()),
        };
        let validation = input.validate();
        assert_eq!(
            validation.invalid_params(),
            vec!["username", "email", "password", "about"]
        );
    }

    #[tokio::test]
    async fn it_keeps_usernames_and_emails_unique() {
        let mut conn = testing::connect().await;
        let alice = testing::insert_user(&mut conn, "alice", Role::Admin).await;
        assert_eq!(alice.role(), Role::Admin);
        assert!(alice.is_active());
        assert!(!alice.is_confirmed());
        assert_eq!(User::count(&mut conn).await.unwrap(), 1);

        let bob = testing::insert_user(&mut conn, "bob", Role::User).await;
        let err = User::update_username(&mut conn, bob.id(), "alice")
            .await
            .unwrap_err();
        assert!(err.violates_unique("users.username"));

        let user = User::find_by_email(&mut conn, "bob@x.com").await.unwrap();
        assert_eq!(user.map(|u| u.username().to_owned()), Some("bob".to_owned()));
    }

    #[tokio::test]
    async fn it_revokes_refresh_tokens_when_blocking() {
        let mut conn = testing::connect().await;
        let bob = testing::insert_user(&mut conn, "bob", Role::User).await;
        User::set_refresh_token(&mut conn, bob.id(), Some("token"))
            .await
            .unwrap();
        let blocked = User::set_active(&mut conn, bob.id(), false)
            .await
            .unwrap()
            .unwrap();
        assert!(!blocked.is_active());
        assert_eq!(blocked.refresh_token(), None);

        let confirmed = User::confirm_email(&mut conn, "bob@x.com")
            .await
            .unwrap()
            .unwrap();
        assert!(confirmed.is_confirmed());
    }
}
