pub mod comment_body;
pub mod page;

pub use comment_body::{CommentBody, MAX_COMMENT_CHARS};
pub use page::{PageRequest, DEFAULT_PAGE_LIMIT};
