//! The `pub_image` model: blob references of a publication.

use picnest_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The `pub_image` model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, FromRow)]
pub struct PubImage {
    #[serde(skip)]
    id: i64,
    #[serde(skip)]
    publication_id: Option<i64>,
    current_img: Option<String>,
    updated_img: Option<String>,
    qr_code_img: Option<String>,
}

/// Partial update of the image references. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageUpdate {
    /// URL of the original image.
    pub current_img: Option<String>,
    /// URL of the transformed image.
    pub updated_img: Option<String>,
    /// URL of the QR code.
    pub qr_code_img: Option<String>,
}

impl ImageUpdate {
    /// Returns `true` if no field is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current_img.is_none() && self.updated_img.is_none() && self.qr_code_img.is_none()
    }
}

impl PubImage {
    /// Returns the `id`.
    #[inline]
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Returns the `publication_id`.
    #[inline]
    pub fn publication_id(&self) -> Option<i64> {
        self.publication_id
    }

    /// Returns the `current_img`.
    #[inline]
    pub fn current_img(&self) -> Option<&str> {
        self.current_img.as_deref()
    }

    /// Returns the `updated_img`.
    #[inline]
    pub fn updated_img(&self) -> Option<&str> {
        self.updated_img.as_deref()
    }

    /// Returns the `qr_code_img`.
    #[inline]
    pub fn qr_code_img(&self) -> Option<&str> {
        self.qr_code_img.as_deref()
    }

    /// Creates an image record which is not linked to a publication yet.
    pub async fn insert_empty(conn: &mut DatabaseConnection) -> Result<Self, sqlx::Error> {
        sqlx::query_as("INSERT INTO pub_images DEFAULT VALUES RETURNING *")
            .fetch_one(&mut *conn)
            .await
    }

    /// Links the image record to a publication.
    pub async fn link(
        conn: &mut DatabaseConnection,
        id: i64,
        publication_id: i64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as("UPDATE pub_images SET publication_id = ? WHERE id = ? RETURNING *")
            .bind(publication_id)
            .bind(id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Finds the image record of a publication.
    pub async fn find_by_publication(
        conn: &mut DatabaseConnection,
        publication_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM pub_images WHERE publication_id = ?")
            .bind(publication_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Overwrites the supplied references of a publication's image.
    pub async fn update(
        conn: &mut DatabaseConnection,
        publication_id: i64,
        update: &ImageUpdate,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            "UPDATE pub_images SET \
             current_img = COALESCE(?, current_img), \
             updated_img = COALESCE(?, updated_img), \
             qr_code_img = COALESCE(?, qr_code_img) \
             WHERE publication_id = ? RETURNING *",
        )
        .bind(&update.current_img)
        .bind(&update.updated_img)
        .bind(&update.qr_code_img)
        .bind(publication_id)
        .fetch_optional(&mut *conn)
        .await
    }
}
