pub mod cache;
pub mod error;
pub mod indexing;
pub mod logging;
pub mod model;
pub mod rank;

pub use cache::{CacheStore, WriteMode};
pub use error::{RelscopeError, Result};
pub use indexing::{FULL_REINDEX_THRESHOLD, IndexEngine};
pub use model::{CacheEntry, IndexMode, IndexReport, IndexState, SkipReason, WriteFailure};
