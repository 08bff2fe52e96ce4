pub mod error;
pub mod feed;
pub mod normalize;
pub mod elevenlabs;
pub mod voximplant;
pub mod service;

pub use error::{FeedError, SyncError};
pub use feed::{CallDetail, CallFeed, CallPage, MAX_SYNC_PAGES};
pub use service::{SyncReport, SyncService};
