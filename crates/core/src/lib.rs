pub mod domain;
pub mod error;
pub mod ids;
pub mod types;

pub use error::{CoreError, ErrorKind};
