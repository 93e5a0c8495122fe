//! The `publication` model and its aggregate view.

use crate::{MAX_TAGS_PER_PUBLICATION, PubImage, Rating, Tag, average_rating, validate_tag_name};
use picnest_core::{DateTime, validation::Validation};
use picnest_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The `publication` model.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Publication {
    id: i64,
    user_id: i64,
    title: Option<String>,
    description: Option<String>,
    created_at: DateTime,
    updated_at: DateTime,
}

/// Fields of a new publication.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PublicationInput {
    /// Optional title with 1 to 50 characters.
    pub title: Option<String>,
    /// Optional description with 1 to 255 characters.
    pub description: Option<String>,
    /// Tag names.
    pub tags: Vec<String>,
}

impl PublicationInput {
    /// Validates the title, the description and each tag name.
    /// The tag limit is checked separately by [`exceeds_tag_limit`](Self::exceeds_tag_limit).
    pub fn validate(&self) -> Validation {
        let mut validation = Validation::new();
        if let Some(title) = self.title.as_deref() {
            validation.validate_length("title", title, 1, 50);
        }
        if let Some(description) = self.description.as_deref() {
            validation.validate_length("description", description, 1, 255);
        }
        for name in &self.tags {
            validate_tag_name(&mut validation, name);
        }
        validation
    }

    /// Returns the distinct tag names in their original order.
    pub fn tag_names(&self) -> Vec<&str> {
        let mut names = Vec::with_capacity(self.tags.len());
        for name in &self.tags {
            if !names.contains(&name.as_str()) {
                names.push(name.as_str());
            }
        }
        names
    }

    /// Returns `true` if there are more distinct tags than a publication may hold.
    #[inline]
    pub fn exceeds_tag_limit(&self) -> bool {
        self.tag_names().len() > MAX_TAGS_PER_PUBLICATION
    }
}

/// Partial update of the text fields. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PublicationUpdate {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
}

impl PublicationUpdate {
    /// Validates the supplied fields.
    pub fn validate(&self) -> Validation {
        let mut validation = Validation::new();
        if let Some(title) = self.title.as_deref() {
            validation.validate_length("title", title, 1, 50);
        }
        if let Some(description) = self.description.as_deref() {
            validation.validate_length("description", description, 1, 255);
        }
        validation
    }
}

impl Publication {
    /// Returns the `id`.
    #[inline]
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Returns the `user_id` of the owner.
    #[inline]
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Returns the `title`.
    #[inline]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the `description`.
    #[inline]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the `updated_at`.
    #[inline]
    pub fn updated_at(&self) -> DateTime {
        self.updated_at
    }

    /// Inserts the publication row.
    pub async fn insert(
        conn: &mut DatabaseConnection,
        user_id: i64,
        input: &PublicationInput,
    ) -> Result<Self, sqlx::Error> {
        let now = chrono::Utc::now();
        sqlx::query_as(
            "INSERT INTO publications (user_id, title, description, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(user_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
    }

    /// Returns the owner of a publication.
    pub async fn owner_of(
        conn: &mut DatabaseConnection,
        id: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT user_id FROM publications WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Finds a publication regardless of the owner.
    pub async fn find(
        conn: &mut DatabaseConnection,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM publications WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Finds a publication of the owner.
    pub async fn find_scoped(
        conn: &mut DatabaseConnection,
        id: i64,
        owner_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM publications WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Lists the publications of the owner, newest first.
    pub async fn list_by_owner(
        conn: &mut DatabaseConnection,
        owner_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM publications WHERE user_id = ? ORDER BY id DESC LIMIT ? OFFSET ?",
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await
    }

    /// Lists all publications, newest first.
    pub async fn list_all(
        conn: &mut DatabaseConnection,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM publications ORDER BY id DESC LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await
    }

    /// Counts the publications of the owner.
    pub async fn count_by_owner(
        conn: &mut DatabaseConnection,
        owner_id: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM publications WHERE user_id = ?")
            .bind(owner_id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Overwrites the supplied text fields of a publication of the owner.
    pub async fn update_text(
        conn: &mut DatabaseConnection,
        id: i64,
        owner_id: i64,
        update: &PublicationUpdate,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            "UPDATE publications SET \
             title = COALESCE(?, title), \
             description = COALESCE(?, description), \
             updated_at = ? \
             WHERE id = ? AND user_id = ? RETURNING *",
        )
        .bind(&update.title)
        .bind(&update.description)
        .bind(chrono::Utc::now())
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Touches the `updated_at` of a publication.
    pub async fn touch(conn: &mut DatabaseConnection, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE publications SET updated_at = ? WHERE id = ?")
            .bind(chrono::Utc::now())
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Deletes a publication of the owner.
    /// The image, the tag links, the ratings and the comments are removed by cascade.
    pub async fn delete_scoped(
        conn: &mut DatabaseConnection,
        id: i64,
        owner_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as("DELETE FROM publications WHERE id = ? AND user_id = ? RETURNING *")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&mut *conn)
            .await
    }
}

/// A publication with its image, tags and the derived average rating.
#[derive(Debug, Clone, Serialize)]
pub struct PublicationDetail {
    #[serde(flatten)]
    publication: Publication,
    image: Option<PubImage>,
    tags: Vec<Tag>,
    average_rating: Option<f64>,
}

impl PublicationDetail {
    /// Loads the children of a publication.
    pub async fn load(
        conn: &mut DatabaseConnection,
        publication: Publication,
    ) -> Result<Self, sqlx::Error> {
        let id = publication.id();
        let image = PubImage::find_by_publication(conn, id).await?;
        let tags = Tag::list_for_publication(conn, id).await?;
        let scores = Rating::scores_for_publication(conn, id).await?;
        Ok(Self {
            publication,
            image,
            tags,
            average_rating: average_rating(&scores),
        })
    }

    /// Loads the children of each publication.
    pub async fn load_many(
        conn: &mut DatabaseConnection,
        publications: Vec<Publication>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut details = Vec::with_capacity(publications.len());
        for publication in publications {
            details.push(Self::load(conn, publication).await?);
        }
        Ok(details)
    }

    /// Returns the publication.
    #[inline]
    pub fn publication(&self) -> &Publication {
        &self.publication
    }

    /// Returns the image record.
    #[inline]
    pub fn image(&self) -> Option<&PubImage> {
        self.image.as_ref()
    }

    /// Returns the tags.
    #[inline]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Returns the average rating.
    #[inline]
    pub fn average_rating(&self) -> Option<f64> {
        self.average_rating
    }
}

#[cfg(test)]
mod tests {
    use super::{Publication, PublicationDetail, PublicationInput, PublicationUpdate};
    use crate::{PubImage, Rating, Tag, testing};
    use picnest_auth::Role;

    #[test]
    fn it_validates_input() {
        let input = PublicationInput {
            title: Some("x".repeat(51)),
            description: None,
            tags: vec!["ok-tag".to_owned(), "no".to_owned()],
        };
        let validation = input.validate();
        assert_eq!(validation.invalid_params(), vec!["title", "tags"]);

        let input = PublicationInput {
            tags: ["sea", "sky", "sea", "sun", "bay", "fog", "sky"]
                .map(String::from)
                .to_vec(),
            ..PublicationInput::default()
        };
        assert!(input.validate().is_success());
        assert_eq!(input.tag_names(), ["sea", "sky", "sun", "bay", "fog"]);
        assert!(!input.exceeds_tag_limit());
    }

    #[tokio::test]
    async fn it_updates_supplied_text_only() {
        let mut conn = testing::connect().await;
        let owner = testing::insert_user(&mut conn, "bob", Role::User).await;
        let other = testing::insert_user(&mut conn, "carol", Role::User).await;
        let publication = testing::insert_publication(&mut conn, &owner, "Harbor").await;

        let update = PublicationUpdate {
            title: Some("X".to_owned()),
            description: None,
        };
        let missing = Publication::update_text(&mut conn, publication.id(), other.id(), &update)
            .await
            .unwrap();
        assert!(missing.is_none());

        Publication::update_text(&mut conn, publication.id(), owner.id(), &update)
            .await
            .unwrap();
        let updated = Publication::find_scoped(&mut conn, publication.id(), owner.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title(), Some("X"));
        assert_eq!(updated.description(), publication.description());
    }

    #[tokio::test]
    async fn it_cascades_deletes_but_keeps_shared_tags() {
        let mut conn = testing::connect().await;
        let owner = testing::insert_user(&mut conn, "bob", Role::User).await;
        let rater = testing::insert_user(&mut conn, "carol", Role::User).await;
        let first = testing::insert_publication(&mut conn, &owner, "Harbor").await;
        let second = testing::insert_publication(&mut conn, &owner, "Dunes").await;

        let image = PubImage::insert_empty(&mut conn).await.unwrap();
        PubImage::link(&mut conn, image.id(), first.id()).await.unwrap();
        let tag = Tag::get_or_create(&mut conn, "coast").await.unwrap();
        tag.attach(&mut conn, first.id()).await.unwrap();
        tag.attach(&mut conn, second.id()).await.unwrap();
        Rating::insert(&mut conn, rater.id(), first.id(), 3).await.unwrap();
        Rating::insert(&mut conn, owner.id(), first.id(), 5).await.unwrap();

        let detail = PublicationDetail::load(&mut conn, first.clone()).await.unwrap();
        assert_eq!(detail.average_rating(), Some(4.0));
        assert_eq!(detail.tags().len(), 1);
        assert!(detail.image().is_some());

        let deleted = Publication::delete_scoped(&mut conn, first.id(), rater.id())
            .await
            .unwrap();
        assert!(deleted.is_none());
        let deleted = Publication::delete_scoped(&mut conn, first.id(), owner.id())
            .await
            .unwrap();
        assert_eq!(deleted.map(|p| p.id()), Some(first.id()));

        assert!(
            PubImage::find_by_publication(&mut conn, first.id())
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            Rating::scores_for_publication(&mut conn, first.id())
                .await
                .unwrap()
                .is_empty()
        );
        assert!(Tag::find_by_name(&mut conn, "coast").await.unwrap().is_some());
        assert_eq!(
            Tag::count_for_publication(&mut conn, second.id()).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn it_lists_newest_first() {
        let mut conn = testing::connect().await;
        let owner = testing::insert_user(&mut conn, "bob", Role::User).await;
        for title in ["one", "two", "three"] {
            testing::insert_publication(&mut conn, &owner, title).await;
        }
        let publications = Publication::list_by_owner(&mut conn, owner.id(), 2, 0)
            .await
            .unwrap();
        let titles = publications.iter().filter_map(|p| p.title()).collect::<Vec<_>>();
        assert_eq!(titles, ["three", "two"]);
        assert_eq!(
            Publication::count_by_owner(&mut conn, owner.id()).await.unwrap(),
            3
        );
    }
}
