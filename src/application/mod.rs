//! Application services: placement writes and the cached home feed.

pub mod error;
pub mod feed;
pub mod placement;
pub mod repos;
