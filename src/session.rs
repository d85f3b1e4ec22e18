//! In-memory record of domains already loaded this process lifetime.
//!
//! Distinct from the durable cache: a domain present here is not re-checked
//! against the cache or the network on a repeat visit. Cleared on subject
//! change and on explicit refresh-all.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use crate::domain::Domain;

#[derive(Debug, Default)]
pub struct SessionLoadState {
  loaded: Mutex<HashSet<Domain>>,
}

impl SessionLoadState {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, HashSet<Domain>> {
    // A poisoned lock only means some holder panicked; the set itself is
    // still coherent, so recover it rather than propagating.
    self.loaded.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  pub fn mark_loaded(&self, domain: Domain) {
    self.lock().insert(domain);
  }

  pub fn is_loaded(&self, domain: Domain) -> bool {
    self.lock().contains(&domain)
  }

  pub fn clear_domain(&self, domain: Domain) {
    self.lock().remove(&domain);
  }

  pub fn clear(&self) {
    self.lock().clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mark_and_clear() {
    let session = SessionLoadState::new();
    assert!(!session.is_loaded(Domain::Workout));

    session.mark_loaded(Domain::Workout);
    session.mark_loaded(Domain::Analytics);
    assert!(session.is_loaded(Domain::Workout));

    session.clear_domain(Domain::Workout);
    assert!(!session.is_loaded(Domain::Workout));
    assert!(session.is_loaded(Domain::Analytics));

    session.clear();
    assert!(!session.is_loaded(Domain::Analytics));
  }

  #[test]
  fn test_calendar_months_tracked_independently() {
    let session = SessionLoadState::new();
    let jan = Domain::Calendar { year: 2026, month: 1 };
    let feb = Domain::Calendar { year: 2026, month: 2 };

    session.mark_loaded(jan);
    assert!(session.is_loaded(jan));
    assert!(!session.is_loaded(feb));
  }
}
