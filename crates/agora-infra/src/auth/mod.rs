//! Bearer token validation for identities issued by the auth collaborator.

mod jwt;

pub use jwt::{JwtConfig, JwtTokenService};
