pub mod types;
pub mod store;
pub mod reconcile;
pub mod config;
pub mod error;

pub use types::*;
pub use store::{CallStore, MemoryCallStore};
pub use reconcile::{reconcile, DEFAULT_MATCH_WINDOW_SECS};
pub use config::Config;
pub use error::StoreError;
