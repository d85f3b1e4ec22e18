//! Calendar pipeline: month logs, cycle tracking, weekly aggregate.

use tracing::{debug, warn};

use super::project;
use super::view::CalendarView;
use super::{DataSync, SyncEvent};
use crate::domain::Domain;
use crate::fetch::race_with_timeout;

impl DataSync {
  pub(crate) async fn load_calendar(&self, year: i32, month: u32, force: bool) {
    let domain = Domain::Calendar { year, month };
    let subject = self.subject();
    let key = domain.cache_key(&subject);

    if !force {
      if self.session.is_loaded(domain) {
        debug!(%domain, "already loaded this session");
        return;
      }
      if let Some(hit) = self.cache.get::<CalendarView>(&key) {
        debug!(%domain, "serving from cache");
        let seq = self.calendar.begin_run();
        if self.calendar.publish(seq, hit.payload) {
          self.session.mark_loaded(domain);
          self.send(SyncEvent::Published(domain));
        }
        return;
      }
    }

    let seq = self.calendar.begin_run();
    self.calendar.mark_loading(seq);
    let deadlines = self.deadlines;

    let (days, settings, week) = tokio::join!(
      {
        let (b, s) = (self.backend.clone(), subject.clone());
        race_with_timeout("month_logs", deadlines.multi, Vec::new(), async move {
          b.month_logs(&s, year, month).await
        })
      },
      {
        let (b, s) = (self.backend.clone(), subject.clone());
        race_with_timeout("cycle_settings", deadlines.read, None, async move {
          b.cycle_settings(&s).await.map(Some)
        })
      },
      {
        let (b, s) = (self.backend.clone(), subject.clone());
        race_with_timeout("week_aggregate", deadlines.read, None, async move {
          b.week_aggregate(&s).await.map(Some)
        })
      },
    );

    // The cycle detail read only happens for subjects who enabled tracking;
    // everyone else never triggers the call at all. A failed settings read
    // counts as disabled.
    let tracking_enabled = settings
      .into_value()
      .map(|s| s.tracking_enabled)
      .unwrap_or(false);
    let cycle = if tracking_enabled {
      let (b, s) = (self.backend.clone(), subject.clone());
      race_with_timeout("cycle_current", deadlines.read, None, async move {
        b.cycle_current(&s).await.map(Some)
      })
      .await
      .into_value()
    } else {
      None
    };

    let view = match project::project_calendar(
      year,
      month,
      days.into_value(),
      cycle,
      week.into_value(),
    ) {
      Ok(view) => view,
      Err(e) => {
        warn!(%domain, error = %e, "projection failed, degrading to defaults");
        let message = format!("calendar unavailable: {}", e);
        if self
          .calendar
          .publish_degraded(seq, CalendarView::empty(year, month), message.clone())
        {
          self.send(SyncEvent::Degraded(domain, message));
        }
        return;
      }
    };

    if self.calendar.publish(seq, view.clone()) {
      self.cache.set(&key, &view);
      self.session.mark_loaded(domain);
      self.send(SyncEvent::Published(domain));
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::Ordering;

  use crate::domain::Domain;
  use crate::sync::testutil::harness;
  use crate::sync::LoadPhase;

  #[tokio::test]
  async fn test_cycle_detail_skipped_when_tracking_disabled() {
    let h = harness();

    h.sync
      .load(Domain::Calendar { year: 2026, month: 8 }, false)
      .await;

    assert_eq!(h.backend.count("cycle_settings"), 1);
    assert_eq!(h.backend.count("cycle_current"), 0);

    let view = h.sync.calendar().view().unwrap();
    assert!(view.cycle.is_none());
    assert!(!view.days.is_empty());
    assert!(view.week.is_some());
  }

  #[tokio::test]
  async fn test_cycle_detail_fetched_when_tracking_enabled() {
    let h = harness();
    h.backend.cycle_tracking_enabled.store(true, Ordering::SeqCst);

    h.sync
      .load(Domain::Calendar { year: 2026, month: 8 }, false)
      .await;

    assert_eq!(h.backend.count("cycle_current"), 1);
    let view = h.sync.calendar().view().unwrap();
    assert_eq!(view.cycle.unwrap().phase, "follicular");
  }

  #[tokio::test]
  async fn test_months_cached_independently() {
    let h = harness();

    h.sync
      .load(Domain::Calendar { year: 2026, month: 7 }, false)
      .await;
    h.sync
      .load(Domain::Calendar { year: 2026, month: 8 }, false)
      .await;
    assert_eq!(h.backend.count("month_logs"), 2);

    // Revisiting an already-loaded month is a session no-op.
    h.sync
      .load(Domain::Calendar { year: 2026, month: 7 }, false)
      .await;
    assert_eq!(h.backend.count("month_logs"), 2);
  }

  #[tokio::test]
  async fn test_invalid_month_degrades_with_error_flag() {
    let h = harness();

    h.sync
      .load(Domain::Calendar { year: 2026, month: 13 }, false)
      .await;

    // Never stuck in Loading: the pipeline lands on a safe default.
    assert_eq!(h.sync.calendar().phase(), LoadPhase::Ready);
    let view = h.sync.calendar().view().unwrap();
    assert!(view.days.is_empty());
    assert!(h.sync.calendar().error().is_some());
  }
}
