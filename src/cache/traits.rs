//! Storage backend trait for the durable cache.

use color_eyre::Result;

/// Byte-oriented key/value persistence backend.
///
/// Backends survive process restarts (except the in-memory ones) but make no
/// durability promises beyond that; losing an entry to storage eviction is
/// acceptable and simply costs a refetch.
pub trait CacheStorage: Send + Sync {
  /// Read the bytes stored under `key`, or `None` if absent.
  fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

  /// Write `bytes` under `key`, overwriting any prior value.
  fn write(&self, key: &str, bytes: &[u8]) -> Result<()>;

  /// Remove the entry under `key`, if any.
  fn delete(&self, key: &str) -> Result<()>;
}
