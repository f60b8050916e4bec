//! SeaORM entities for the forum tables.

pub mod post;
pub mod user;
pub mod vote;
