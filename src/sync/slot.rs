//! Published view-model slot with stale-publish protection.
//!
//! Each domain owns one slot. Every pipeline run takes a sequence number
//! from the slot before doing any work; a publish carrying a lower sequence
//! than the last accepted one is discarded, so a slow run that was
//! superseded by a forced refresh can complete harmlessly without clobbering
//! the newer result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::warn;

/// Loading state of a domain as observed by the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPhase {
  #[default]
  Idle,
  Loading,
  Ready,
}

#[derive(Debug)]
struct SlotInner<V> {
  phase: LoadPhase,
  view: Option<V>,
  error: Option<String>,
  /// True while the analytics intelligence phase is in flight.
  intelligence_loading: bool,
  /// Sequence of the run whose publish currently owns the slot.
  published_seq: u64,
}

#[derive(Debug)]
pub struct Slot<V> {
  run_seq: AtomicU64,
  inner: Mutex<SlotInner<V>>,
}

impl<V: Clone> Slot<V> {
  pub(crate) fn new() -> Self {
    Self {
      run_seq: AtomicU64::new(0),
      inner: Mutex::new(SlotInner {
        phase: LoadPhase::Idle,
        view: None,
        error: None,
        intelligence_loading: false,
        published_seq: 0,
      }),
    }
  }

  fn lock(&self) -> MutexGuard<'_, SlotInner<V>> {
    self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  /// Allocate the sequence number for a new pipeline run.
  pub(crate) fn begin_run(&self) -> u64 {
    self.run_seq.fetch_add(1, Ordering::SeqCst) + 1
  }

  pub(crate) fn mark_loading(&self, seq: u64) {
    let mut inner = self.lock();
    if seq >= inner.published_seq {
      inner.phase = LoadPhase::Loading;
    }
  }

  /// Publish `view` for run `seq`. Returns false, changing nothing, if a
  /// newer run already published.
  pub(crate) fn publish(&self, seq: u64, view: V) -> bool {
    self.publish_inner(seq, view, None)
  }

  /// Publish a degraded default alongside a user-visible error string.
  pub(crate) fn publish_degraded(&self, seq: u64, view: V, error: String) -> bool {
    self.publish_inner(seq, view, Some(error))
  }

  fn publish_inner(&self, seq: u64, view: V, error: Option<String>) -> bool {
    let mut inner = self.lock();
    if seq < inner.published_seq {
      warn!(seq, published = inner.published_seq, "discarding publish from superseded run");
      return false;
    }
    inner.published_seq = seq;
    inner.view = Some(view);
    inner.error = error;
    inner.phase = LoadPhase::Ready;
    // A fresh publish supersedes any older run's pending intelligence work;
    // the new run re-asserts the flag if it has a phase of its own.
    inner.intelligence_loading = false;
    true
  }

  /// Mutate the published view in place, only if run `seq` still owns the
  /// slot. Returns whether the mutation was applied.
  pub(crate) fn amend_if_current(&self, seq: u64, f: impl FnOnce(&mut V)) -> bool {
    let mut inner = self.lock();
    if inner.published_seq != seq {
      return false;
    }
    match inner.view.as_mut() {
      Some(view) => {
        f(view);
        true
      }
      None => false,
    }
  }

  pub(crate) fn set_intelligence_loading(&self, seq: u64, loading: bool) {
    let mut inner = self.lock();
    if inner.published_seq == seq {
      inner.intelligence_loading = loading;
    }
  }

  /// Drop all published state and invalidate every run already started.
  /// Used on subject change: publishes from in-flight runs for the previous
  /// subject land after the fence and are discarded.
  pub(crate) fn reset(&self) {
    let fence = self.run_seq.fetch_add(1, Ordering::SeqCst) + 1;
    let mut inner = self.lock();
    inner.published_seq = fence;
    inner.phase = LoadPhase::Idle;
    inner.view = None;
    inner.error = None;
    inner.intelligence_loading = false;
  }

  pub fn phase(&self) -> LoadPhase {
    self.lock().phase
  }

  /// Snapshot of the current view model, if any run has published.
  pub fn view(&self) -> Option<V> {
    self.lock().view.clone()
  }

  pub fn error(&self) -> Option<String> {
    self.lock().error.clone()
  }

  pub fn intelligence_loading(&self) -> bool {
    self.lock().intelligence_loading
  }
}
