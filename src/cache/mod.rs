//! Durable key/value cache with a time-to-live envelope.
//!
//! This module provides the persistence layer between pipeline runs:
//! - Typed payloads wrapped in an envelope recording when they were stored
//! - Entries past their TTL are treated as misses, never returned
//! - Malformed entries deserialize to a miss, never an error
//! - Writes update an in-memory view synchronously and persist in the
//!   background (store-and-forget)

mod storage;
mod store;
mod traits;

pub use storage::{MemoryStorage, NoopStorage, SqliteStorage};
pub use store::{CacheHit, CacheStore};
pub use traits::CacheStorage;
