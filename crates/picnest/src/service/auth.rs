//! Accounts, credentials and token sessions.
use super::ConflictExt;
use crate::context::AppContext;
use picnest_auth::{Role, TokenScope};
use picnest_core::{
    crypto,
    response::{ErrorCode, OrReject, Rejection},
};
use picnest_model::{NewUser, SignupInput, User};
use serde::Serialize;

/// A pair of access and refresh tokens.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct TokenPair {
    /// Access token.
    pub(crate) access_token: String,
    /// Refresh token.
    pub(crate) refresh_token: String,
    /// Token type.
    pub(crate) token_type: &'static str,
}

/// Account service.
pub(crate) struct AuthService<'a> {
    ctx: &'a AppContext,
}

impl<'a> AuthService<'a> {
    /// Creates a new instance.
    #[inline]
    pub(crate) fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Creates an account and sends the confirmation email.
    /// The first account becomes an admin.
    pub(crate) async fn signup(&self, input: SignupInput) -> Result<User, Rejection> {
        let validation = input.validate();
        if !validation.is_success() {
            return Err(Rejection::bad_request(validation));
        }

        let password_hash = crypto::hash_password(&input.password)?;
        let mut transaction = self.ctx.pool().begin_immediate().await?;
        if User::find_by_email(&mut transaction, &input.email)
            .await?
            .is_some()
        {
            return Err(ErrorCode::AccountAlreadyExists.into());
        }
        if User::find_by_username(&mut transaction, &input.username)
            .await?
            .is_some()
        {
            return Err(ErrorCode::UsernameTaken.into());
        }

        let role = if User::count(&mut transaction).await? == 0 {
            Role::Admin
        } else {
            Role::User
        };
        let new_user = NewUser {
            username: input.username,
            email: input.email,
            password_hash,
            role,
            about: input.about,
        };
        let user = User::insert(&mut transaction, &new_user)
            .await
            .or_conflict(&[
                ("users.email", ErrorCode::AccountAlreadyExists),
                ("users.username", ErrorCode::UsernameTaken),
            ])?;
        transaction.commit().await?;
        tracing::info!(user_id = user.id(), role = role.as_str(), "user signed up");

        self.send_confirmation(&user).await;
        Ok(user)
    }

    /// Confirms the email encoded in the token.
    pub(crate) async fn confirm_email(&self, token: &str) -> Result<User, Rejection> {
        let claims = self
            .ctx
            .jwt_key()
            .verify(token, TokenScope::EmailToken)
            .map_err(|err| Rejection::with_error(ErrorCode::InvalidToken, err))?;
        let email = claims.subject().or_reject(ErrorCode::InvalidToken)?;
        let mut conn = self.ctx.pool().acquire().await?;
        let user = User::confirm_email(&mut conn, email)
            .await?
            .or_reject(ErrorCode::UserNotFound)?;
        tracing::info!(user_id = user.id(), "email is confirmed");
        Ok(user)
    }

    /// Sends the confirmation email again.
    /// Returns `false` if the email is already confirmed.
    /// Unknown addresses are not revealed.
    pub(crate) async fn request_email(&self, email: &str) -> Result<bool, Rejection> {
        match self.resolve_user_by_email(email).await? {
            Some(user) if user.is_confirmed() => Ok(false),
            Some(user) => {
                self.send_confirmation(&user).await;
                Ok(true)
            }
            None => {
                tracing::warn!("confirmation requested for an unknown email");
                Ok(true)
            }
        }
    }

    /// Checks the credentials and starts a session.
    pub(crate) async fn login(&self, email: &str, password: &str) -> Result<TokenPair, Rejection> {
        let mut conn = self.ctx.pool().acquire().await?;
        let user = User::find_by_email(&mut conn, email)
            .await?
            .or_reject(ErrorCode::InvalidCredentials)?;
        if !crypto::verify_password(password, user.password_hash())? {
            tracing::warn!(user_id = user.id(), "invalid password");
            return Err(ErrorCode::InvalidCredentials.into());
        }
        if !user.is_confirmed() {
            return Err(ErrorCode::EmailNotConfirmed.into());
        }
        if !user.is_active() {
            return Err(ErrorCode::UserBlocked.into());
        }

        let tokens = self.issue_tokens(&user)?;
        User::set_refresh_token(&mut conn, user.id(), Some(&tokens.refresh_token)).await?;
        tracing::info!(user_id = user.id(), "user logged in");
        Ok(tokens)
    }

    /// Exchanges the stored refresh token for a new pair of tokens.
    /// A token which does not match the stored one revokes the session.
    pub(crate) async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, Rejection> {
        let mut conn = self.ctx.pool().acquire().await?;
        let user = self
            .verify_user(&mut conn, refresh_token, TokenScope::RefreshToken)
            .await?;
        if user.refresh_token() != Some(refresh_token) {
            User::set_refresh_token(&mut conn, user.id(), None).await?;
            tracing::warn!(user_id = user.id(), "stale refresh token is presented");
            return Err(ErrorCode::InvalidToken.into());
        }
        if !user.is_active() {
            return Err(ErrorCode::UserBlocked.into());
        }

        let tokens = self.issue_tokens(&user)?;
        User::set_refresh_token(&mut conn, user.id(), Some(&tokens.refresh_token)).await?;
        Ok(tokens)
    }

    /// Revokes the stored refresh token.
    pub(crate) async fn logout(&self, refresh_token: &str) -> Result<(), Rejection> {
        let mut conn = self.ctx.pool().acquire().await?;
        let user = self
            .verify_user(&mut conn, refresh_token, TokenScope::RefreshToken)
            .await?;
        if user.refresh_token() != Some(refresh_token) {
            return Err(ErrorCode::InvalidToken.into());
        }
        User::set_refresh_token(&mut conn, user.id(), None).await?;
        tracing::info!(user_id = user.id(), "user logged out");
        Ok(())
    }

    /// Resolves the user of an access token.
    pub(crate) async fn authenticate(&self, access_token: &str) -> Result<User, Rejection> {
        let mut conn = self.ctx.pool().acquire().await?;
        let user = self
            .verify_user(&mut conn, access_token, TokenScope::AccessToken)
            .await?;
        if !user.is_active() {
            return Err(ErrorCode::UserBlocked.into());
        }
        Ok(user)
    }

    /// Blocks or unblocks a user. Only admins may do this.
    pub(crate) async fn set_active(
        &self,
        requester: &User,
        user_id: i64,
        is_active: bool,
    ) -> Result<User, Rejection> {
        if !requester.session().is_admin() {
            return Err(Rejection::forbidden());
        }
        let mut conn = self.ctx.pool().acquire().await?;
        let user = User::set_active(&mut conn, user_id, is_active)
            .await?
            .or_reject(ErrorCode::UserNotFound)?;
        tracing::warn!(
            user_id,
            is_active,
            admin_id = requester.id(),
            "user activity is changed"
        );
        Ok(user)
    }

    /// Finds a user by ID.
    pub(crate) async fn resolve_user(&self, id: i64) -> Result<Option<User>, Rejection> {
        let mut conn = self.ctx.pool().acquire().await?;
        Ok(User::find_by_id(&mut conn, id).await?)
    }

    /// Finds a user by the email address.
    pub(crate) async fn resolve_user_by_email(&self, email: &str) -> Result<Option<User>, Rejection> {
        let mut conn = self.ctx.pool().acquire().await?;
        Ok(User::find_by_email(&mut conn, email).await?)
    }

    async fn verify_user(
        &self,
        conn: &mut picnest_orm::DatabaseConnection,
        token: &str,
        scope: TokenScope,
    ) -> Result<User, Rejection> {
        let claims = self
            .ctx
            .jwt_key()
            .verify(token, scope)
            .map_err(|err| Rejection::with_error(ErrorCode::InvalidToken, err))?;
        let email = claims.subject().or_reject(ErrorCode::InvalidToken)?;
        User::find_by_email(conn, email)
            .await?
            .or_reject(ErrorCode::InvalidToken)
    }

    fn issue_tokens(&self, user: &User) -> Result<TokenPair, Rejection> {
        let jwt_key = self.ctx.jwt_key();
        Ok(TokenPair {
            access_token: jwt_key.issue(user.email(), TokenScope::AccessToken)?,
            refresh_token: jwt_key.issue(user.email(), TokenScope::RefreshToken)?,
            token_type: "bearer",
        })
    }

    async fn send_confirmation(&self, user: &User) {
        let token = match self.ctx.jwt_key().issue(user.email(), TokenScope::EmailToken) {
            Ok(token) => token,
            Err(err) => {
                tracing::error!(user_id = user.id(), "fail to issue the email token: {err}");
                return;
            }
        };
        let message = self
            .ctx
            .mail_template()
            .confirmation(user.email(), user.username(), &token);
        if let Err(err) = self.ctx.mailer().send(&message).await {
            tracing::error!(user_id = user.id(), "fail to send the confirmation email: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::testing;
    use picnest_auth::Role;
    use picnest_core::response::ErrorCode;
    use picnest_model::SignupInput;

    fn signup_input(name: &str) -> SignupInput {
        SignupInput {
            username: name.to_owned(),
            email: format!("{name}@x.com"),
            password: "secret1".to_owned(),
            about: None,
        }
    }

    #[tokio::test]
    async fn it_makes_the_first_account_an_admin() {
        let (ctx, mailer) = testing::context().await;
        let auth = ctx.auth();
        let alice = auth.signup(signup_input("alice")).await.unwrap();
        let bob = auth.signup(signup_input("bob")).await.unwrap();
        assert_eq!(alice.role(), Role::Admin);
        assert_eq!(bob.role(), Role::User);
        assert!(!bob.is_confirmed());
        assert_eq!(mailer.sent_messages().len(), 2);

        let rejection = auth.signup(signup_input("alice")).await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::AccountAlreadyExists);

        let mut input = signup_input("bob");
        input.email = "robert@x.com".to_owned();
        let rejection = auth.signup(input).await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::UsernameTaken);

        let mut input = signup_input("carol");
        input.password = "123".to_owned();
        let rejection = auth.signup(input).await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn it_confirms_emails_and_rotates_tokens() {
        let (ctx, mailer) = testing::context().await;
        let auth = ctx.auth();
        auth.signup(signup_input("alice")).await.unwrap();

        let rejection = auth.login("alice@x.com", "secret1").await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::EmailNotConfirmed);
        let rejection = auth.login("alice@x.com", "secret2").await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::InvalidCredentials);

        let message = mailer.sent_messages().pop().unwrap();
        assert_eq!(message.to, "alice@x.com");
        let token = message
            .body
            .lines()
            .find_map(|line| line.split("/auth/confirmed_email/").nth(1))
            .unwrap();
        let user = auth.confirm_email(token).await.unwrap();
        assert!(user.is_confirmed());
        assert!(!auth.request_email("alice@x.com").await.unwrap());
        let rejection = auth.confirm_email("not.a.token").await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::InvalidToken);

        let tokens = auth.login("alice@x.com", "secret1").await.unwrap();
        let user = auth.authenticate(&tokens.access_token).await.unwrap();
        assert_eq!(user.username(), "alice");
        let rejection = auth.authenticate(&tokens.refresh_token).await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::InvalidToken);

        let rotated = auth.refresh(&tokens.refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, tokens.refresh_token);

        // Replaying the old token revokes the session.
        let rejection = auth.refresh(&tokens.refresh_token).await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::InvalidToken);
        let rejection = auth.refresh(&rotated.refresh_token).await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::InvalidToken);

        let tokens = auth.login("alice@x.com", "secret1").await.unwrap();
        auth.logout(&tokens.refresh_token).await.unwrap();
        let rejection = auth.refresh(&tokens.refresh_token).await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::InvalidToken);
    }

    #[tokio::test]
    async fn it_blocks_users() {
        let (ctx, _) = testing::context().await;
        let admin = testing::sign_up(&ctx, "admin").await;
        let alice = testing::sign_up(&ctx, "alice").await;
        let auth = ctx.auth();
        let tokens = auth.login("alice@x.com", "secret1").await.unwrap();

        let rejection = auth.set_active(&alice, admin.id(), false).await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::Forbidden);

        let user = auth.set_active(&admin, alice.id(), false).await.unwrap();
        assert!(!user.is_active());
        let rejection = auth.authenticate(&tokens.access_token).await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::UserBlocked);
        let rejection = auth.login("alice@x.com", "secret1").await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::UserBlocked);
        let rejection = auth.set_active(&admin, 404, false).await.unwrap_err();
        assert_eq!(rejection.code(), ErrorCode::UserNotFound);

        auth.set_active(&admin, alice.id(), true).await.unwrap();
        assert!(auth.authenticate(&tokens.access_token).await.is_ok());
    }
}
