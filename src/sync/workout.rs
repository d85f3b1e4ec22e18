//! Workout pipeline: a single deadline-raced read.

use tracing::debug;

use super::view::WorkoutView;
use super::{DataSync, SyncEvent};
use crate::domain::Domain;
use crate::fetch::race_with_timeout;

impl DataSync {
  pub(crate) async fn load_workout(&self, force: bool) {
    let domain = Domain::Workout;
    let subject = self.subject();
    let key = domain.cache_key(&subject);

    if !force {
      if self.session.is_loaded(domain) {
        debug!(%domain, "already loaded this session");
        return;
      }
      if let Some(hit) = self.cache.get::<WorkoutView>(&key) {
        debug!(%domain, "serving from cache");
        let seq = self.workout.begin_run();
        if self.workout.publish(seq, hit.payload) {
          self.session.mark_loaded(domain);
          self.send(SyncEvent::Published(domain));
        }
        return;
      }
    }

    let seq = self.workout.begin_run();
    self.workout.mark_loading(seq);

    let plan = {
      let (b, s) = (self.backend.clone(), subject.clone());
      race_with_timeout("workout_today", self.deadlines.read, None, async move {
        b.workout_today(&s).await
      })
      .await
    };

    // A timed-out or failed read resolves to None, which renders exactly
    // like a rest day.
    let view = WorkoutView {
      plan: plan.into_value(),
    };

    if self.workout.publish(seq, view.clone()) {
      self.cache.set(&key, &view);
      self.session.mark_loaded(domain);
      self.send(SyncEvent::Published(domain));
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::Ordering;
  use std::time::Duration;

  use chrono::Utc;

  use crate::api::types::WorkoutPlan;
  use crate::cache::CacheStore;
  use crate::cache::CacheStorage;
  use crate::domain::Domain;
  use crate::sync::testutil::{harness, harness_with, FakeBackend};
  use crate::sync::view::WorkoutView;
  use crate::sync::{DataSync, Deadlines, LoadPhase};
  use std::sync::Arc;
  use tokio::sync::mpsc;

  fn push_day() -> WorkoutPlan {
    WorkoutPlan {
      plan: "Push Day".to_string(),
      focus: Some("chest".to_string()),
      exercises: vec!["bench press".to_string()],
    }
  }

  #[tokio::test]
  async fn test_load_publishes_plan_and_caches_it() {
    let h = harness();
    h.backend
      .workouts
      .lock()
      .unwrap()
      .insert("u1".to_string(), push_day());

    let before = Utc::now();
    h.sync.load(Domain::Workout, false).await;

    let view = h.sync.workout().view().unwrap();
    assert_eq!(view.plan.as_ref().unwrap().plan, "Push Day");
    assert_eq!(h.sync.workout().phase(), LoadPhase::Ready);

    let key = Domain::Workout.cache_key(&h.sync.subject());
    let hit = h.sync.cache.get::<WorkoutView>(&key).unwrap();
    assert!(hit.stored_at >= before && hit.stored_at <= Utc::now());
  }

  #[tokio::test]
  async fn test_restart_within_ttl_hits_cache_past_ttl_refetches() {
    let backend = Arc::new(FakeBackend::new());
    backend
      .workouts
      .lock()
      .unwrap()
      .insert("u1".to_string(), push_day());
    let storage = Arc::new(crate::cache::MemoryStorage::new());

    // Short TTL so the test can outwait it.
    let make_sync = |events| {
      let cache = CacheStore::new(storage.clone() as Arc<dyn CacheStorage>)
        .with_ttl(chrono::Duration::milliseconds(200));
      DataSync::new(backend.clone(), cache, events).with_deadlines(Deadlines {
        read: Duration::from_millis(100),
        multi: Duration::from_millis(150),
        insight: Duration::from_millis(400),
      })
    };

    let (tx, _rx) = mpsc::unbounded_channel();
    let sync = make_sync(tx);
    sync.set_subject(crate::domain::SubjectId::new("u1"));
    sync.load(Domain::Workout, false).await;
    assert_eq!(backend.count("workout_today"), 1);
    // Let the background persist land before "restarting".
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Fresh process, entry still fresh: served from the durable cache.
    let (tx, _rx) = mpsc::unbounded_channel();
    let sync2 = make_sync(tx);
    sync2.set_subject(crate::domain::SubjectId::new("u1"));
    sync2.load(Domain::Workout, false).await;
    assert_eq!(backend.count("workout_today"), 1);
    assert_eq!(
      sync2.workout().view().unwrap().plan.unwrap().plan,
      "Push Day"
    );

    // Past the TTL the entry is a miss and the call is re-issued.
    tokio::time::sleep(Duration::from_millis(250)).await;
    let (tx, _rx) = mpsc::unbounded_channel();
    let sync3 = make_sync(tx);
    sync3.set_subject(crate::domain::SubjectId::new("u1"));
    sync3.load(Domain::Workout, false).await;
    assert_eq!(backend.count("workout_today"), 2);
  }

  #[tokio::test]
  async fn test_failed_read_is_indistinguishable_from_rest_day() {
    let h = harness();
    h.backend.fail_workout.store(true, Ordering::SeqCst);

    h.sync.load(Domain::Workout, false).await;

    let view = h.sync.workout().view().unwrap();
    assert!(view.plan.is_none());
    assert!(!view.has_workout());
    // No user-visible error: failure renders as the empty state.
    assert!(h.sync.workout().error().is_none());
    assert_eq!(h.sync.workout().phase(), LoadPhase::Ready);
  }

  #[tokio::test]
  async fn test_cached_rest_day_still_counts_as_loaded() {
    let h = harness();

    h.sync.load(Domain::Workout, false).await;
    assert_eq!(h.backend.count("workout_today"), 1);

    // Second visit in the same session: no cache read, no network.
    h.sync.load(Domain::Workout, false).await;
    assert_eq!(h.backend.count("workout_today"), 1);
    assert!(h.sync.workout().view().unwrap().plan.is_none());
  }

  #[tokio::test]
  async fn test_restart_hits_cache_via_storage() {
    let h = harness();
    h.backend
      .workouts
      .lock()
      .unwrap()
      .insert("u1".to_string(), push_day());

    h.sync.load(Domain::Workout, false).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let h2 = harness_with(h.backend.clone(), h.storage.clone());
    h2.sync.load(Domain::Workout, false).await;
    assert_eq!(h2.backend.count("workout_today"), 1);
  }
}
