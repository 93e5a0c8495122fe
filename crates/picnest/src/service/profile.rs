//! Public profiles and profile changes.
use super::ConflictExt;
use crate::context::AppContext;
use picnest_core::{
    response::{ErrorCode, OrReject, Rejection},
    validation::Validation,
};
use picnest_model::{Publication, User};
use picnest_storage::BlobPath;
use serde::Serialize;

/// A public profile.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Profile {
    /// User.
    #[serde(flatten)]
    pub(crate) user: User,
    /// Number of publications.
    pub(crate) publications_count: i64,
    /// Days since the signup.
    pub(crate) usage_days: i64,
}

/// Profile service.
pub(crate) struct ProfileService<'a> {
    ctx: &'a AppContext,
}

impl<'a> ProfileService<'a> {
    /// Creates a new instance.
    #[inline]
    pub(crate) fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Returns the profile of the username.
    pub(crate) async fn view(&self, username: &str) -> Result<Profile, Rejection> {
        let mut conn = self.ctx.pool().acquire().await?;
        let user = User::find_by_username(&mut conn, username)
            .await?
            .or_reject(ErrorCode::UserNotFound)?;
        let publications_count = Publication::count_by_owner(&mut conn, user.id()).await?;
        let usage_days = (chrono::Utc::now() - user.created_at()).num_days();
        Ok(Profile {
            user,
            publications_count,
            usage_days,
        })
    }

    /// Changes the username.
    pub(crate) async fn change_username(
        &self,
        user: &User,
        username: &str,
    ) -> Result<User, Rejection> {
        let mut validation = Validation::new();
        User::validate_username(&mut validation, username);
        if !validation.is_success() {
            return Err(Rejection::bad_request(validation));
        }

        let mut conn = self.ctx.pool().acquire().await?;
        if User::find_by_username(&mut conn, username)
            .await?
            .is_some_and(|other| other.id() != user.id())
        {
            return Err(ErrorCode::UsernameTaken.into());
        }
        User::update_username(&mut conn, user.id(), username)
            .await
            .or_conflict(&[("users.username", ErrorCode::UsernameTaken)])?
            .or_reject(ErrorCode::UserNotFound)
    }

    /// Changes the self-description. An empty value clears it.
    pub(crate) async fn change_about(
        &self,
        user: &User,
        about: Option<&str>,
    ) -> Result<User, Rejection> {
        let about = about.filter(|s| !s.is_empty());
        if let Some(about) = about {
            let mut validation = Validation::new();
            User::validate_about(&mut validation, about);
            if !validation.is_success() {
                return Err(Rejection::bad_request(validation));
            }
        }

        let mut conn = self.ctx.pool().acquire().await?;
        User::update_about(&mut conn, user.id(), about)
            .await?
            .or_reject(ErrorCode::UserNotFound)
    }

    /// Stores a new avatar image.
    pub(crate) async fn change_avatar(
        &self,
        user: &User,
        bytes: Vec<u8>,
    ) -> Result<User, Rejection> {
        super::image::check_image(&bytes)?;
        let path = BlobPath::avatar(user.email());
        let url = self
            .ctx
            .blob_store()
            .put(&path, bytes)
            .await
            .map_err(Rejection::upstream_unavailable)?;

        let mut conn = self.ctx.pool().acquire().await?;
        User::update_avatar(&mut conn, user.id(), &url)
            .await?
            .or_reject(ErrorCode::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use crate::testing;
    use picnest_core::response::ErrorCode;

    #[tokio::test]
    async fn it_changes_profiles() {
        let (ctx, _) = testing::context().await;
        let alice = testing::sign_up(&ctx, "alice").await;
        testing::sign_up(&ctx, "bob").await;
        testing::publish(&ctx, &alice, "Sunset", &[]).await;

        let profiles = ctx.profiles();
        let profile = profiles.view("alice").await.unwrap();
        assert_eq!(profile.publications_count, 1);
        assert_eq!(profile.usage_days, 0);
        let rejection = profiles.view("nobody").await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::UserNotFound);

        let rejection = profiles.change_username(&alice, "bob").await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::UsernameTaken);
        let alice = profiles.change_username(&alice, "alicia").await.unwrap();
        assert_eq!(alice.username(), "alicia");

        let alice = profiles.change_about(&alice, Some("Photographer")).await.unwrap();
        assert_eq!(alice.about(), Some("Photographer"));
        let alice = profiles.change_about(&alice, Some("")).await.unwrap();
        assert_eq!(alice.about(), None);

        let rejection = profiles
            .change_avatar(&alice, b"plain text".to_vec())
            .await
            .unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::ValidationFailed);
        let alice = profiles
            .change_avatar(&alice, testing::png_bytes(8, 8))
            .await
            .unwrap();
        assert_eq!(
            alice.avatar(),
            Some("http://localhost:6080/blobs/alice@x.com/avatar/avatar")
        );
    }
}
