//! `eventsphere-auth`: identity, credentials and authorization policy.
//!
//! Nothing here knows about HTTP or storage.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{AuthzError, CommandAuthorization, authorize, ensure_self_or_admin};
pub use claims::{JwtClaims, TokenError, validate_claims};
pub use jwt::{Hs256Jwt, JwtValidator};
pub use password::{PasswordError, PasswordHash};
pub use permissions::Permission;
pub use principal::Principal;
pub use roles::Role;
pub use user::{NewUser, User, UserProfile, UserUpdate, normalize_email};
