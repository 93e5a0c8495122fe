//! The `rating` model.

use crate::User;
use picnest_core::{DateTime, validation::Validation};
use picnest_orm::DatabaseConnection;
use serde::Serialize;
use sqlx::FromRow;

/// The `rating` model.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Rating {
    id: i64,
    user_id: i64,
    publication_id: i64,
    score: i64,
    created_at: DateTime,
}

/// Returns the arithmetic mean of the scores, or `None` if there are no scores.
pub fn average_rating(scores: &[i64]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let sum = scores.iter().sum::<i64>();
    Some(sum as f64 / scores.len() as f64)
}

impl Rating {
    /// Validates a score.
    pub fn validate_score(score: i64) -> Validation {
        let mut validation = Validation::new();
        validation.validate_range("score", score, 1, 5);
        validation
    }

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

    /// Returns the `score`.
    #[inline]
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Inserts a rating.
    /// A second rating by the same user fails with a unique violation on `ratings`.
    pub async fn insert(
        conn: &mut DatabaseConnection,
        user_id: i64,
        publication_id: i64,
        score: i64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO ratings (user_id, publication_id, score, created_at) \
             VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(user_id)
        .bind(publication_id)
        .bind(score)
        .bind(chrono::Utc::now())
        .fetch_one(&mut *conn)
        .await
    }

    /// Returns the scores of a publication.
    pub async fn scores_for_publication(
        conn: &mut DatabaseConnection,
        publication_id: i64,
    ) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT score FROM ratings WHERE publication_id = ?")
            .bind(publication_id)
            .fetch_all(&mut *conn)
            .await
    }

    /// Lists the ratings given by a user, newest first.
    pub async fn list_by_user(
        conn: &mut DatabaseConnection,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM ratings WHERE user_id = ? ORDER BY id DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await
    }

    /// Lists the users who rated a publication, in rating order.
    pub async fn list_raters(
        conn: &mut DatabaseConnection,
        publication_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as(
            "SELECT users.* FROM users JOIN ratings ON ratings.user_id = users.id \
             WHERE ratings.publication_id = ? ORDER BY ratings.id LIMIT ? OFFSET ?",
        )
        .bind(publication_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await
    }

    /// Deletes the rating of a user on a publication.
    pub async fn delete(
        conn: &mut DatabaseConnection,
        user_id: i64,
        publication_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("DELETE FROM ratings WHERE user_id = ? AND publication_id = ? RETURNING *")
            .bind(user_id)
            .bind(publication_id)
            .fetch_optional(&mut *conn)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::{Rating, average_rating};
    use crate::testing;
    use picnest_auth::Role;
    use picnest_orm::ConstraintViolation;

    #[test]
    fn it_averages_scores() {
        assert_eq!(average_rating(&[]), None);
        assert_eq!(average_rating(&[3, 5]), Some(4.0));
        assert_eq!(average_rating(&[1, 1, 1, 5]), Some(2.0));
        assert_eq!(average_rating(&[5]), Some(5.0));
    }

    #[test]
    fn it_validates_scores() {
        assert!(Rating::validate_score(1).is_success());
        assert!(Rating::validate_score(5).is_success());
        assert!(!Rating::validate_score(0).is_success());
        assert!(!Rating::validate_score(6).is_success());
    }

    #[tokio::test]
    async fn it_allows_one_rating_per_user() {
        let mut conn = testing::connect().await;
        let owner = testing::insert_user(&mut conn, "bob", Role::User).await;
        let rater = testing::insert_user(&mut conn, "carol", Role::User).await;
        let publication = testing::insert_publication(&mut conn, &owner, "Harbor").await;

        Rating::insert(&mut conn, rater.id(), publication.id(), 4)
            .await
            .unwrap();
        let err = Rating::insert(&mut conn, rater.id(), publication.id(), 2)
            .await
            .unwrap_err();
        assert!(err.violates_unique("ratings.user_id"));

        let err = Rating::insert(&mut conn, owner.id(), publication.id(), 9)
            .await
            .unwrap_err();
        assert!(err.is_check_violation());

        let scores = Rating::scores_for_publication(&mut conn, publication.id())
            .await
            .unwrap();
        assert_eq!(scores, vec![4]);

        let raters = Rating::list_raters(&mut conn, publication.id(), 10, 0)
            .await
            .unwrap();
        assert_eq!(raters.len(), 1);
        assert_eq!(raters[0].username(), "carol");

        let deleted = Rating::delete(&mut conn, rater.id(), publication.id())
            .await
            .unwrap();
        assert_eq!(deleted.map(|r| r.score()), Some(4));
        assert!(
            Rating::delete(&mut conn, rater.id(), publication.id())
                .await
                .unwrap()
                .is_none()
        );
    }
}
