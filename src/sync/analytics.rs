//! Analytics pipeline: a fast deterministic phase the UI waits on, then a
//! detached intelligence phase for the LLM-derived fields.

use tracing::{debug, warn};

use super::project::{self, AnalyticsSources};
use super::view::AnalyticsView;
use super::{DataSync, SyncEvent};
use crate::api::types::{DigestionInsight, HealthState, InsightNarrative, InsightsSummary};
use crate::domain::{Domain, SubjectId};
use crate::fetch::race_with_timeout;

impl DataSync {
  /// Load the analytics domain.
  ///
  /// Phase one races six deterministic reads against short deadlines,
  /// projects the outcomes into a view model and publishes it - that ends
  /// the state the UI is waiting on. Phase two then runs on a detached task
  /// with long deadlines and amends the published view in place with the
  /// narrative and digestion fields. The cache write is deferred until
  /// phase two settles, so a later cache hit always yields a complete view,
  /// never a partial one.
  pub(crate) async fn load_analytics(&self, force: bool) {
    let domain = Domain::Analytics;
    let subject = self.subject();
    let key = domain.cache_key(&subject);

    if !force {
      if self.session.is_loaded(domain) {
        debug!(%domain, "already loaded this session");
        return;
      }
      if let Some(hit) = self.cache.get::<AnalyticsView>(&key) {
        debug!(%domain, "serving from cache");
        let seq = self.analytics.begin_run();
        if self.analytics.publish(seq, hit.payload) {
          self.session.mark_loaded(domain);
          self.send(SyncEvent::Published(domain));
        }
        return;
      }
    }

    let seq = self.analytics.begin_run();
    self.analytics.mark_loading(seq);
    let deadline = self.deadlines.read;

    let (commentary, metric_cards, insight_cards, weekly, dashboard, health_state) = tokio::join!(
      {
        let (b, s) = (self.backend.clone(), subject.clone());
        race_with_timeout("insights_summary", deadline, InsightsSummary::default(), async move {
          b.insights_summary(&s).await
        })
      },
      {
        let (b, s) = (self.backend.clone(), subject.clone());
        race_with_timeout("derived_metrics", deadline, Vec::new(), async move {
          b.derived_metrics(&s).await
        })
      },
      {
        let (b, s) = (self.backend.clone(), subject.clone());
        race_with_timeout("insight_cards", deadline, Vec::new(), async move {
          b.insight_cards(&s).await
        })
      },
      {
        let (b, s) = (self.backend.clone(), subject.clone());
        race_with_timeout("weekly_summaries", deadline, Vec::new(), async move {
          b.weekly_summaries(&s).await
        })
      },
      {
        let (b, s) = (self.backend.clone(), subject.clone());
        race_with_timeout("dashboard_today", deadline, None, async move {
          b.dashboard_today(&s).await.map(Some)
        })
      },
      {
        let (b, s) = (self.backend.clone(), subject.clone());
        race_with_timeout("health_state", deadline, HealthState::default(), async move {
          b.health_state(&s).await
        })
      },
    );

    let sources = AnalyticsSources {
      commentary: commentary.into_value(),
      metric_cards: metric_cards.into_value(),
      insight_cards: insight_cards.into_value(),
      weekly: weekly.into_value(),
      dashboard: dashboard.into_value(),
      health_state: health_state.into_value(),
    };

    let view = match project::project_analytics(sources) {
      Ok(view) => view,
      Err(e) => {
        warn!(%domain, error = %e, "projection failed, degrading to defaults");
        let message = format!("analytics unavailable: {}", e);
        if self
          .analytics
          .publish_degraded(seq, AnalyticsView::default(), message.clone())
        {
          self.send(SyncEvent::Degraded(domain, message));
        }
        return;
      }
    };

    if !self.analytics.publish(seq, view) {
      // A newer run owns the slot; leave the rest to it.
      return;
    }
    self.session.mark_loaded(domain);
    self.send(SyncEvent::Published(domain));

    // Intelligence phase: detached on purpose. Nothing joins the task; the
    // slot's sequence check makes a late landing harmless.
    self.analytics.set_intelligence_loading(seq, true);
    let sync = self.clone();
    tokio::spawn(async move {
      sync.run_intelligence_phase(seq, subject, key).await;
    });
  }

  async fn run_intelligence_phase(&self, seq: u64, subject: SubjectId, key: String) {
    let deadline = self.deadlines.insight;

    let (narrative, digestion) = tokio::join!(
      {
        let (b, s) = (self.backend.clone(), subject.clone());
        race_with_timeout("insight_narrative", deadline, None, async move {
          b.insight_narrative(&s).await.map(Some)
        })
      },
      {
        let (b, s) = (self.backend.clone(), subject.clone());
        race_with_timeout("digestion_insight", deadline, None, async move {
          b.digestion_insight(&s).await.map(Some)
        })
      },
    );

    let narrative: Option<InsightNarrative> = narrative.into_value();
    let digestion: Option<DigestionInsight> = digestion.into_value();

    let current = self.analytics.amend_if_current(seq, |view| {
      if let Some(narrative) = narrative {
        view.delta_commentary = Some(
          narrative
            .delta_commentary
            .unwrap_or(narrative.narrative),
        );
      }
      if let Some(digestion) = digestion {
        view.delta_insights = Some(digestion);
      }
    });
    self.analytics.set_intelligence_loading(seq, false);

    if current {
      // Now, and only now, does the completed view reach the cache.
      if let Some(view) = self.analytics.view() {
        self.cache.set(&key, &view);
      }
      self.send(SyncEvent::IntelligenceSettled);
    } else {
      debug!("intelligence phase settled for a superseded run, discarding");
    }
  }
}
