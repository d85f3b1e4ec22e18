//! TTL-enveloped cache store over a byte-oriented storage backend.

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

use super::traits::CacheStorage;

/// Envelope persisted around every cached payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
  payload: serde_json::Value,
  stored_at: DateTime<Utc>,
}

/// A fresh cache entry returned from [`CacheStore::get`].
#[derive(Debug, Clone)]
pub struct CacheHit<T> {
  pub payload: T,
  pub stored_at: DateTime<Utc>,
}

/// Durable cache with a fixed time-to-live per entry.
///
/// Reads consult an in-memory view first, then the storage backend. Writes
/// land in the in-memory view synchronously - a `get` later in the same
/// pipeline run sees them - while the backend write happens on a background
/// task that nothing joins (store-and-forget).
///
/// Expired and malformed entries are misses; no method here returns an
/// error to its caller.
pub struct CacheStore {
  storage: Arc<dyn CacheStorage>,
  overlay: Mutex<HashMap<String, Envelope>>,
  /// How long an entry stays valid. An entry exactly this old is a miss.
  ttl: Duration,
}

impl CacheStore {
  /// Create a store with the default 5-minute TTL.
  pub fn new(storage: Arc<dyn CacheStorage>) -> Self {
    Self {
      storage,
      overlay: Mutex::new(HashMap::new()),
      ttl: Duration::minutes(5),
    }
  }

  /// Override the TTL.
  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  fn lock_overlay(&self) -> MutexGuard<'_, HashMap<String, Envelope>> {
    // Recover from poisoning; the map holds plain values and stays coherent.
    self.overlay.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  fn is_fresh(&self, stored_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - stored_at < self.ttl
  }

  /// Look up `key`, returning the payload only if present, well-formed, and
  /// younger than the TTL.
  pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<CacheHit<T>> {
    let now = Utc::now();

    let envelope = match self.lock_overlay().get(key).cloned() {
      Some(env) => Some(env),
      None => self.read_from_storage(key),
    };

    let envelope = envelope?;
    if !self.is_fresh(envelope.stored_at, now) {
      debug!(key, "cache entry expired");
      return None;
    }

    match serde_json::from_value(envelope.payload) {
      Ok(payload) => Some(CacheHit {
        payload,
        stored_at: envelope.stored_at,
      }),
      Err(e) => {
        debug!(key, error = %e, "cache entry malformed, treating as miss");
        None
      }
    }
  }

  fn read_from_storage(&self, key: &str) -> Option<Envelope> {
    let bytes = match self.storage.read(key) {
      Ok(Some(bytes)) => bytes,
      Ok(None) => return None,
      Err(e) => {
        warn!(key, error = %e, "cache read failed, treating as miss");
        return None;
      }
    };

    match serde_json::from_slice(&bytes) {
      Ok(envelope) => Some(envelope),
      Err(e) => {
        debug!(key, error = %e, "cache entry malformed, treating as miss");
        None
      }
    }
  }

  /// Store `payload` under `key` with the current timestamp.
  ///
  /// Must be called from within a Tokio runtime: the backend write runs on a
  /// detached blocking task.
  pub fn set<T: Serialize>(&self, key: &str, payload: &T) {
    let payload = match serde_json::to_value(payload) {
      Ok(v) => v,
      Err(e) => {
        warn!(key, error = %e, "failed to serialize cache payload, skipping write");
        return;
      }
    };

    let envelope = Envelope {
      payload,
      stored_at: Utc::now(),
    };

    self.lock_overlay().insert(key.to_string(), envelope.clone());

    let bytes = match serde_json::to_vec(&envelope) {
      Ok(b) => b,
      Err(e) => {
        warn!(key, error = %e, "failed to serialize cache envelope, skipping write");
        return;
      }
    };

    let storage = Arc::clone(&self.storage);
    let key = key.to_string();
    tokio::task::spawn_blocking(move || {
      if let Err(e) = storage.write(&key, &bytes) {
        warn!(key = %key, error = %e, "background cache write failed");
      }
    });
  }

  /// Remove the entry under `key` from both the in-memory view and storage.
  pub fn delete(&self, key: &str) {
    self.lock_overlay().remove(key);
    if let Err(e) = self.storage.delete(key) {
      warn!(key, error = %e, "cache delete failed");
    }
  }
}
