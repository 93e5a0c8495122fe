use jwt_simple::{
    algorithms::{HS256Key, MACLike},
    claims::{Claims, JWTClaims},
    common::VerificationOptions,
};
use picnest_core::{error::Error, extension::TomlTableExt};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    sync::atomic::{AtomicU64, Ordering::Relaxed},
    time::Duration,
};
use strum::{AsRefStr, Display};
use toml::Table;

/// Purpose of a JWT token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TokenScope {
    /// Short-lived token for API requests.
    AccessToken,
    /// Long-lived token for issuing new access tokens.
    RefreshToken,
    /// Token sent by email for confirming the address.
    EmailToken,
}

/// Custom claims carried by every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScopeClaims {
    /// Token scope.
    scope: TokenScope,
}

/// Verified JWT claims.
#[derive(Debug)]
pub struct JwtClaims(JWTClaims<ScopeClaims>);

impl JwtClaims {
    /// Returns the subject, which is the email address of the user.
    #[inline]
    pub fn subject(&self) -> Option<&str> {
        self.0.subject.as_deref()
    }

    /// Returns the token scope.
    #[inline]
    pub fn scope(&self) -> TokenScope {
        self.0.custom.scope
    }

    /// Returns the JWT ID.
    #[inline]
    pub fn jwt_id(&self) -> Option<&str> {
        self.0.jwt_id.as_deref()
    }
}

/// HMAC-SHA256 key with the token lifetimes from the `[jwt]` config.
pub struct JwtHmacKey {
    /// Signing key.
    key: HS256Key,
    /// Issuer.
    issuer: String,
    /// Access token lifetime.
    access_token_ttl: Duration,
    /// Refresh token lifetime.
    refresh_token_ttl: Duration,
    /// Email token lifetime.
    email_token_ttl: Duration,
    /// Time tolerance for the expiration checks.
    time_tolerance: Duration,
}

impl JwtHmacKey {
    /// Creates a new instance with the secret and the default lifetimes.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: HS256Key::from_bytes(secret),
            issuer: "picnest".to_owned(),
            access_token_ttl: Duration::from_secs(15 * 60),
            refresh_token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            email_token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            time_tolerance: Duration::from_secs(60),
        }
    }

    /// Creates a new instance from the `[jwt]` config.
    pub fn with_config(config: &Table) -> Result<Self, Error> {
        let secret = config
            .get_str("secret")
            .ok_or_else(|| Error::new("the `jwt.secret` field should be specified"))?;
        if secret.len() < 16 {
            picnest_core::bail!("the `jwt.secret` field should have at least 16 bytes");
        }

        let mut key = Self::new(secret.as_bytes());
        if let Some(issuer) = config.get_str("issuer") {
            key.issuer = issuer.to_owned();
        }
        if let Some(ttl) = config.get_duration("access-token-ttl") {
            key.access_token_ttl = ttl;
        }
        if let Some(ttl) = config.get_duration("refresh-token-ttl") {
            key.refresh_token_ttl = ttl;
        }
        if let Some(ttl) = config.get_duration("email-token-ttl") {
            key.email_token_ttl = ttl;
        }
        if let Some(tolerance) = config.get_duration("time-tolerance") {
            key.time_tolerance = tolerance;
        }
        Ok(key)
    }

    /// Returns the lifetime of tokens with the scope.
    #[inline]
    pub fn ttl(&self, scope: TokenScope) -> Duration {
        match scope {
            TokenScope::AccessToken => self.access_token_ttl,
            TokenScope::RefreshToken => self.refresh_token_ttl,
            TokenScope::EmailToken => self.email_token_ttl,
        }
    }

    /// Issues a signed token for the subject.
    pub fn issue(&self, subject: impl ToString, scope: TokenScope) -> Result<String, Error> {
        let jwt_id = format!(
            "{:x}-{:x}",
            chrono::Utc::now().timestamp_micros(),
            TOKEN_SEQUENCE.fetch_add(1, Relaxed)
        );
        let claims = Claims::with_custom_claims(ScopeClaims { scope }, self.ttl(scope).into())
            .with_subject(subject)
            .with_issuer(&self.issuer)
            .with_jwt_id(jwt_id);
        self.key
            .authenticate(claims)
            .map_err(|err| Error::new(format!("fail to sign the `{scope}`: {err}")))
    }

    /// Verifies the signature, issuer, expiration and scope of the token.
    pub fn verify(&self, token: &str, scope: TokenScope) -> Result<JwtClaims, Error> {
        let options = VerificationOptions {
            allowed_issuers: Some(HashSet::from([self.issuer.clone()])),
            time_tolerance: Some(self.time_tolerance.into()),
            ..VerificationOptions::default()
        };
        let claims = self
            .key
            .verify_token::<ScopeClaims>(token, Some(options))
            .map_err(|err| Error::new(format!("invalid token: {err}")))?;
        if claims.custom.scope != scope {
            let actual_scope = claims.custom.scope;
            tracing::warn!(%actual_scope, %scope, "token scope mismatch");
            picnest_core::bail!("invalid scope for the token: expected `{scope}`");
        }
        if claims.subject.is_none() {
            picnest_core::bail!("the subject of a JWT token should be specified");
        }
        Ok(JwtClaims(claims))
    }
}

/// Sequence for the JWT IDs issued by this process.
static TOKEN_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[cfg(test)]
mod tests {
    use super::{JwtHmacKey, TokenScope};

    #[test]
    fn it_verifies_token_scopes() {
        let key = JwtHmacKey::new(b"an-insecure-test-secret");
        let token = key.issue(42, TokenScope::AccessToken).unwrap();
        let claims = key.verify(&token, TokenScope::AccessToken).unwrap();
        assert_eq!(claims.subject(), Some("42"));
        assert_eq!(claims.scope(), TokenScope::AccessToken);
        assert!(key.verify(&token, TokenScope::RefreshToken).is_err());

        let refresh_token = key.issue(42, TokenScope::RefreshToken).unwrap();
        let rotated_token = key.issue(42, TokenScope::RefreshToken).unwrap();
        assert_ne!(refresh_token, rotated_token);

        let other_key = JwtHmacKey::new(b"another-test-secret-value");
        assert!(other_key.verify(&token, TokenScope::AccessToken).is_err());
        assert!(key.verify("not.a.token", TokenScope::AccessToken).is_err());
    }

    #[test]
    fn it_reads_lifetimes_from_config() {
        let config: toml::Table = toml::from_str(
            r#"
            secret = "0123456789abcdef0123"
            access-token-ttl = "30m"
            email-token-ttl = "1d"
            "#,
        )
        .unwrap();
        let key = JwtHmacKey::with_config(&config).unwrap();
        assert_eq!(key.ttl(TokenScope::AccessToken).as_secs(), 1800);
        assert_eq!(key.ttl(TokenScope::EmailToken).as_secs(), 86400);
        assert_eq!(key.ttl(TokenScope::RefreshToken).as_secs(), 7 * 86400);

        let config: toml::Table = toml::from_str(r#"secret = "short""#).unwrap();
        assert!(JwtHmacKey::with_config(&config).is_err());
    }
}
