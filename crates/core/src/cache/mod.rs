mod store;

pub use store::{CacheStore, WriteMode};
