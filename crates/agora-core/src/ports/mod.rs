//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod ledger;
mod repository;

pub use auth::{AuthError, TokenClaims, TokenService};
pub use ledger::{LedgerTransaction, LockedPost, VoteStore};
pub use repository::{PostRepository, UserRepository};
