//! In-process fan-out of newly created comments to live subscribers.

pub mod hub;
pub mod subscription;

pub use hub::{CommentHub, DEFAULT_SUBSCRIBER_BUFFER};
pub use subscription::Subscription;
