//! The `tag` model and the publication-tag associations.

use picnest_core::validation::Validation;
use picnest_orm::DatabaseConnection;
use serde::Serialize;
use sqlx::FromRow;

/// Maximum number of tags attached to a publication.
pub const MAX_TAGS_PER_PUBLICATION: usize = 5;

/// The `tag` model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Tag {
    id: i64,
    name: String,
}

/// Validates a tag name. Names are case-sensitive and have 3 to 15 characters.
pub fn validate_tag_name(validation: &mut Validation, name: &str) {
    validation.validate_length("tags", name, 3, 15);
}

impl Tag {
    /// Returns the `id`.
    #[inline]
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Returns the `name`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finds a tag by the exact name.
    pub async fn find_by_name(
        conn: &mut DatabaseConnection,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT id, name FROM tags WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Returns the tag with the name, creating it if absent.
    ///
    /// Concurrent creations of the same name are resolved by the unique index.
    pub async fn get_or_create(
        conn: &mut DatabaseConnection,
        name: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query("INSERT INTO tags (name) VALUES (?) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(&mut *conn)
            .await?;
        sqlx::query_as("SELECT id, name FROM tags WHERE name = ?")
            .bind(name)
            .fetch_one(&mut *conn)
            .await
    }

    /// Lists the tags attached to a publication.
    pub async fn list_for_publication(
        conn: &mut DatabaseConnection,
        publication_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            "SELECT tags.id, tags.name FROM tags \
             JOIN publication_tag ON publication_tag.tag_id = tags.id \
             WHERE publication_tag.publication_id = ? ORDER BY tags.id",
        )
        .bind(publication_id)
        .fetch_all(&mut *conn)
        .await
    }

    /// Counts the tags attached to a publication.
    pub async fn count_for_publication(
        conn: &mut DatabaseConnection,
        publication_id: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM publication_tag WHERE publication_id = ?")
            .bind(publication_id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Attaches the tag to a publication.
    /// A second attachment fails with a unique violation on `publication_tag`.
    pub async fn attach(
        &self,
        conn: &mut DatabaseConnection,
        publication_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO publication_tag (publication_id, tag_id) VALUES (?, ?)")
            .bind(publication_id)
            .bind(self.id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Detaches the tag from a publication and returns `true` if it was attached.
    pub async fn detach(
        &self,
        conn: &mut DatabaseConnection,
        publication_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM publication_tag WHERE publication_id = ? AND tag_id = ?")
                .bind(publication_id)
                .bind(self.id)
                .execute(&mut *conn)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Detaches every tag from a publication.
    pub async fn detach_all(
        conn: &mut DatabaseConnection,
        publication_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM publication_tag WHERE publication_id = ?")
            .bind(publication_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}
