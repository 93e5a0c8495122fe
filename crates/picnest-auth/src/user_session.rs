use super::Role;

/// An authenticated requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserSession {
    /// User ID.
    user_id: i64,
    /// Role.
    role: Role,
}

impl UserSession {
    /// Creates a new instance.
    #[inline]
    pub fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Returns the user ID.
    #[inline]
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Returns the role.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns `true` if the requester has the `admin` or `moderator` role.
    #[inline]
    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }

    /// Returns `true` if the requester has the `admin` role.
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Resolves the owner scope in which a lookup for the target is performed.
///
/// A privileged requester is substituted by the actual owner of the target,
/// so the persistence layer stays owner-scoped for every caller. A regular
/// requester keeps its own scope and sees only what it owns.
#[inline]
pub fn resolve_effective_scope(requester: &UserSession, target_owner_id: i64) -> i64 {
    if requester.is_privileged() {
        target_owner_id
    } else {
        requester.user_id()
    }
}

#[cfg(test)]
mod tests {
    use super::{Role, UserSession, resolve_effective_scope};

    #[test]
    fn it_substitutes_owner_for_privileged_requesters() {
        let admin = UserSession::new(1, Role::Admin);
        let moderator = UserSession::new(2, Role::Moderator);
        let user = UserSession::new(3, Role::User);
        assert_eq!(resolve_effective_scope(&admin, 7), 7);
        assert_eq!(resolve_effective_scope(&moderator, 7), 7);
        assert_eq!(resolve_effective_scope(&user, 7), 3);
        assert_eq!(resolve_effective_scope(&user, 3), 3);
    }
}
