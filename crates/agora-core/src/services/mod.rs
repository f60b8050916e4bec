//! Services - use cases composed from ports.

mod feed;
mod post;
mod vote;

pub use feed::FeedService;
pub use post::PostService;
pub use vote::VoteService;
