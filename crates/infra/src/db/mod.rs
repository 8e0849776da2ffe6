pub mod migrations;
pub mod pool;

pub use migrations::run_migrations;
pub use pool::{connect_lazy, DbPool, DbPoolError};
