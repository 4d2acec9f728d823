pub mod config;
pub mod error;
pub mod registry;
pub mod database;
pub mod collection;
pub mod timestamp;
pub mod instance;

pub use collection::Collection;
pub use config::Config;
pub use database::Database;
pub use error::{ErrorKind, FilerDbError, Result};
pub use instance::{Instance, Status};
pub use registry::Databases;
pub use timestamp::Timestamp;
