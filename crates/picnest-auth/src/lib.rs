#![doc = include_str!("../README.md")]

mod jwt_claims;
mod role;
mod user_session;

pub use jwt_claims::{JwtClaims, JwtHmacKey, TokenScope};
pub use role::{ParseRoleError, Role};
pub use user_session::{UserSession, resolve_effective_scope};
