//! # Agora Core
//!
//! The domain layer of the Agora forum backend: posts, the vote ledger and
//! the ranked feed. This crate contains pure business logic with zero
//! infrastructure dependencies; storage is reached only through [`ports`].

pub mod domain;
pub mod error;
pub mod ports;
pub mod retry;
pub mod services;

pub use error::DomainError;
pub use retry::RetryPolicy;
pub use services::{FeedService, PostService, VoteService};
