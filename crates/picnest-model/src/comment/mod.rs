//! The `comment` model.

use picnest_core::{DateTime, validation::Validation};
use picnest_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The `comment` model.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Comment {
    id: i64,
    user_id: i64,
    publication_id: i64,
    text: String,
    created_at: DateTime,
    updated_at: DateTime,
}

/// Text of a new or edited comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentInput {
    /// Comment text with 1 to 250 characters.
    pub text: String,
}

impl CommentInput {
    /// Validates the text.
    pub fn validate(&self) -> Validation {
        let mut validation = Validation::new();
        validation.validate_length("text", &self.text, 1, 250);
        validation
    }
}

impl Comment {
    /// Returns the `id`.
    #[inline]
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Returns the `user_id`.
    #[inline]
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Returns the `publication_id`.
    #[inline]
    pub fn publication_id(&self) -> i64 {
        self.publication_id
    }

    /// Returns the `text`.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the `updated_at`.
    #[inline]
    pub fn updated_at(&self) -> DateTime {
        self.updated_at
    }

    /// Inserts a comment.
    pub async fn insert(
        conn: &mut DatabaseConnection,
        user_id: i64,
        publication_id: i64,
        text: &str,
    ) -> Result<Self, sqlx::Error> {
        let now = chrono::Utc::now();
        sqlx::query_as(
            "INSERT INTO comments (user_id, publication_id, text, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(user_id)
        .bind(publication_id)
        .bind(text)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
    }

    /// Finds a comment of a publication.
    pub async fn find(
        conn: &mut DatabaseConnection,
        publication_id: i64,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM comments WHERE id = ? AND publication_id = ?")
            .bind(id)
            .bind(publication_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Replaces the text of a comment.
    pub async fn update_text(
        conn: &mut DatabaseConnection,
        id: i64,
        text: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("UPDATE comments SET text = ?, updated_at = ? WHERE id = ? RETURNING *")
            .bind(text)
            .bind(chrono::Utc::now())
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Deletes a comment.
    pub async fn delete(
        conn: &mut DatabaseConnection,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("DELETE FROM comments WHERE id = ? RETURNING *")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Lists the comments of a publication, oldest first.
    pub async fn list(
        conn: &mut DatabaseConnection,
        publication_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM comments WHERE publication_id = ? ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(publication_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::{Comment, CommentInput};
    use crate::testing;
    use picnest_auth::Role;

    #[test]
    fn it_validates_text_length() {
        let input = CommentInput {
            text: String::new(),
        };
        assert!(!input.validate().is_success());
        let input = CommentInput {
            text: "é".repeat(250),
        };
        assert!(input.validate().is_success());
        let input = CommentInput {
            text: "x".repeat(251),
        };
        assert!(!input.validate().is_success());
    }

    #[tokio::test]
    async fn it_lists_comments_oldest_first() {
        let mut conn = testing::connect().await;
        let owner = testing::insert_user(&mut conn, "bob", Role::User).await;
        let publication = testing::insert_publication(&mut conn, &owner, "Harbor").await;
        for text in ["first", "second", "third"] {
            Comment::insert(&mut conn, owner.id(), publication.id(), text)
                .await
                .unwrap();
        }

        let comments = Comment::list(&mut conn, publication.id(), 2, 0).await.unwrap();
        let texts = comments.iter().map(|c| c.text()).collect::<Vec<_>>();
        assert_eq!(texts, ["first", "second"]);

        let comments = Comment::list(&mut conn, publication.id(), 10, 2).await.unwrap();
        assert_eq!(comments[0].text(), "third");

        let edited = Comment::update_text(&mut conn, comments[0].id(), "edited")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(edited.text(), "edited");
        assert!(edited.updated_at() >= comments[0].updated_at());
    }
}
