//! UI-ready view models produced by the domain pipelines.

use serde::{Deserialize, Serialize};

use crate::api::types::{
  CausalPattern, CycleDetail, DailySummary, DayLog, DigestionInsight, HealthState, InsightCard,
  InsightsSummary, MetricCard, WeekAggregate, WorkoutPlan,
};

/// Effective daily targets shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Targets {
  pub calories: f64,
  pub protein_g: f64,
  pub water_ml: f64,
  pub sleep_hours: f64,
  /// Whether the backend personalized these numbers for the subject.
  pub personalized: bool,
}

/// Targets used when the dashboard read fails or carries no targets.
pub const BASELINE_TARGETS: Targets = Targets {
  calories: 2000.0,
  protein_g: 120.0,
  water_ml: 2000.0,
  sleep_hours: 8.0,
  personalized: false,
};

impl Default for Targets {
  fn default() -> Self {
    BASELINE_TARGETS
  }
}

/// Where the effective targets came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetSource {
  /// Hardcoded baseline, used when the dashboard read failed.
  #[default]
  Baseline,
  /// The dashboard's configured targets.
  Dashboard,
  /// Dashboard targets with workout-day overrides applied field by field.
  WorkoutOverride,
}

/// How the effective targets were derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetsInfo {
  pub source: TargetSource,
  pub workout_day: bool,
}

/// Analytics view model.
///
/// Progressively filled: everything except `delta_commentary` and
/// `delta_insights` is published by the fast phase; those two are attached
/// in place when the intelligence phase settles, possibly much later.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsView {
  pub commentary: InsightsSummary,
  pub metric_cards: Vec<MetricCard>,
  pub insight_cards: Vec<InsightCard>,
  /// Rolling window of daily summaries, chronological ascending.
  pub daily_summaries: Vec<DailySummary>,
  pub targets: Targets,
  pub targets_info: TargetsInfo,
  pub health_state: HealthState,
  pub patterns: Vec<CausalPattern>,
  pub has_data: bool,
  pub delta_commentary: Option<String>,
  pub delta_insights: Option<DigestionInsight>,
}

/// Workout view model. `plan: None` renders as "no workout today" - a
/// failed read is deliberately indistinguishable from a rest day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutView {
  pub plan: Option<WorkoutPlan>,
}

impl WorkoutView {
  pub fn has_workout(&self) -> bool {
    self.plan.is_some()
  }
}

/// Calendar view model for one visible month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarView {
  pub year: i32,
  pub month: u32,
  /// Day logs, chronological ascending.
  pub days: Vec<DayLog>,
  pub cycle: Option<CycleDetail>,
  pub week: Option<WeekAggregate>,
}

impl CalendarView {
  /// The empty state for a month, also used when projection degrades.
  pub fn empty(year: i32, month: u32) -> Self {
    Self {
      year,
      month,
      days: Vec::new(),
      cycle: None,
      week: None,
    }
  }
}
