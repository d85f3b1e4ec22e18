//! Data orchestration between the UI and the Vitals backend.
//!
//! One [`DataSync`] instance owns the three domain pipelines (analytics,
//! workout, calendar), the session load flags, and the durable cache. The
//! UI drives it with [`DataSync::load`], [`DataSync::invalidate`] and
//! [`DataSync::refresh_all`], reads view models and loading flags off the
//! per-domain slots, and listens on the event channel to know when to
//! re-render.

mod analytics;
mod calendar;
pub mod project;
mod slot;
mod view;
mod workout;

pub use slot::{LoadPhase, Slot};
pub use view::{
  AnalyticsView, CalendarView, TargetSource, Targets, TargetsInfo, WorkoutView,
  BASELINE_TARGETS,
};

use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::api::{Backend, HttpBackend};
use crate::cache::{CacheStorage, CacheStore, SqliteStorage};
use crate::config::Config;
use crate::domain::{Domain, SubjectId};
use crate::fetch::{DEADLINE_INSIGHT, DEADLINE_MULTI, DEADLINE_READ};
use crate::session::SessionLoadState;
use color_eyre::Result;

/// Notifications for the UI event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
  /// A domain published a new view model.
  Published(Domain),
  /// The analytics intelligence phase settled (result or timeout).
  IntelligenceSettled,
  /// A pipeline degraded to its default view after a merge failure.
  Degraded(Domain, String),
}

/// Per-call-class deadlines. Overridable so tests run on millisecond scales.
#[derive(Debug, Clone, Copy)]
pub struct Deadlines {
  /// Plain deterministic reads.
  pub read: Duration,
  /// Multi-step reads.
  pub multi: Duration,
  /// LLM-derived reads.
  pub insight: Duration,
}

impl Default for Deadlines {
  fn default() -> Self {
    Self {
      read: DEADLINE_READ,
      multi: DEADLINE_MULTI,
      insight: DEADLINE_INSIGHT,
    }
  }
}

/// Orchestration facade over the three data domains.
///
/// Cheap to clone; all state is shared. Pipelines for different domains run
/// independently and may interleave freely - only runs within one domain
/// are ordered, by the slot's sequence numbers.
#[derive(Clone)]
pub struct DataSync {
  backend: Arc<dyn Backend>,
  cache: Arc<CacheStore>,
  session: Arc<SessionLoadState>,
  subject: Arc<RwLock<SubjectId>>,
  deadlines: Deadlines,
  events: mpsc::UnboundedSender<SyncEvent>,
  analytics: Arc<Slot<AnalyticsView>>,
  workout: Arc<Slot<WorkoutView>>,
  calendar: Arc<Slot<CalendarView>>,
}

impl DataSync {
  pub fn new(
    backend: Arc<dyn Backend>,
    cache: CacheStore,
    events: mpsc::UnboundedSender<SyncEvent>,
  ) -> Self {
    Self {
      backend,
      cache: Arc::new(cache),
      session: Arc::new(SessionLoadState::new()),
      subject: Arc::new(RwLock::new(SubjectId::anonymous())),
      deadlines: Deadlines::default(),
      events,
      analytics: Arc::new(Slot::new()),
      workout: Arc::new(Slot::new()),
      calendar: Arc::new(Slot::new()),
    }
  }

  /// Build the production wiring: HTTP backend plus SQLite-backed cache.
  pub fn from_config(config: &Config, events: mpsc::UnboundedSender<SyncEvent>) -> Result<Self> {
    let backend = Arc::new(HttpBackend::new(config)?);

    let storage: Arc<dyn CacheStorage> = match &config.cache_path {
      Some(path) => Arc::new(SqliteStorage::open_at(path)?),
      None => Arc::new(SqliteStorage::open()?),
    };
    let mut cache = CacheStore::new(storage);
    if let Some(minutes) = config.cache_ttl_minutes {
      cache = cache.with_ttl(chrono::Duration::minutes(minutes));
    }

    Ok(Self::new(backend, cache, events))
  }

  /// Override the per-call deadlines.
  pub fn with_deadlines(mut self, deadlines: Deadlines) -> Self {
    self.deadlines = deadlines;
    self
  }

  /// The subject whose data is currently being orchestrated.
  pub fn subject(&self) -> SubjectId {
    self
      .subject
      .read()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .clone()
  }

  /// Switch subjects, purging everything held for the previous one.
  ///
  /// In-flight pipeline runs for the old subject are fenced off by the slot
  /// resets: their late publishes and cache writes are discarded, so the
  /// new subject can never observe the previous subject's data.
  pub fn set_subject(&self, subject: SubjectId) {
    {
      let mut current = self
        .subject
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
      if *current == subject {
        return;
      }
      *current = subject;
    }

    self.session.clear();
    self.analytics.reset();
    self.workout.reset();
    self.calendar.reset();
  }

  /// Load a domain. With `force` false this is a no-op when the domain was
  /// already loaded this session, and serves from the durable cache when a
  /// valid entry exists; with `force` true it always refetches (a
  /// successful fetch overwrites the cache entry, so the entry is not
  /// deleted up front).
  pub async fn load(&self, domain: Domain, force: bool) {
    match domain {
      Domain::Analytics => self.load_analytics(force).await,
      Domain::Workout => self.load_workout(force).await,
      Domain::Calendar { year, month } => self.load_calendar(year, month, force).await,
    }
  }

  /// Drop a domain's session flag and cache entry, optionally refetching
  /// right away. Used when a write in one domain must show up in another
  /// domain's derived view without waiting out the TTL.
  pub async fn invalidate(&self, domain: Domain, refetch: bool) {
    self.session.clear_domain(domain);
    self.cache.delete(&domain.cache_key(&self.subject()));
    if refetch {
      self.load(domain, true).await;
    }
  }

  /// Clear every session flag and force analytics and workout to reload
  /// concurrently. Calendar is refreshed on its own cadence, keyed by the
  /// month the UI is looking at.
  pub async fn refresh_all(&self) {
    self.session.clear();
    tokio::join!(self.load_analytics(true), self.load_workout(true));
  }

  pub fn analytics(&self) -> &Slot<AnalyticsView> {
    &self.analytics
  }

  pub fn workout(&self) -> &Slot<WorkoutView> {
    &self.workout
  }

  pub fn calendar(&self) -> &Slot<CalendarView> {
    &self.calendar
  }

  fn send(&self, event: SyncEvent) {
    // Best effort - the host may have dropped the receiver during teardown.
    let _ = self.events.send(event);
  }
}
