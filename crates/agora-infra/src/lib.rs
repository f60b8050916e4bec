//! # Agora Infrastructure
//!
//! Concrete implementations of the ports defined in `agora-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL post store and vote ledger via SeaORM
//! - `auth` - JWT bearer token validation

pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use database::{DatabaseConfig, InMemoryStore};

// Re-exports - PostgreSQL
#[cfg(feature = "postgres")]
pub use database::{
    DatabaseConnections, PostgresPostRepository, PostgresUserRepository, PostgresVoteStore,
};

#[cfg(feature = "auth")]
pub use auth::{JwtConfig, JwtTokenService};
