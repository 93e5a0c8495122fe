use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// User roles.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    /// Full access, including blocking users.
    Admin,
    /// Moderation of publications, ratings and comments.
    Moderator,
    /// A regular user.
    #[default]
    User,
}

impl Role {
    /// Returns the role as `&'static str`.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Returns `true` if the role can act on behalf of other users.
    #[inline]
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Admin | Self::Moderator)
    }

    /// Returns `true` if the role is `admin`.
    #[inline]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// An error which can be returned when parsing a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError(String);

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid role `{}`", self.0)
    }
}

impl std::error::Error for ParseRoleError {}

impl TryFrom<String> for Role {
    type Error = ParseRoleError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Role::from_str(&value).map_err(|_| ParseRoleError(value))
    }
}

#[cfg(test)]
mod tests {
    use super::Role;

    #[test]
    fn it_parses_roles() {
        assert_eq!(Role::try_from("moderator".to_owned()), Ok(Role::Moderator));
        assert!(Role::try_from("root".to_owned()).is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
        assert!(Role::Admin.is_privileged());
        assert!(Role::Moderator.is_privileged());
        assert!(!Role::User.is_privileged());
        assert!(!Role::Moderator.is_admin());
    }
}
