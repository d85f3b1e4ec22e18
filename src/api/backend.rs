//! Client trait for the Vitals backend.

use async_trait::async_trait;
use color_eyre::Result;

use super::types::{
  CycleDetail, CycleSettings, DailySummary, DashboardSnapshot, DayLog, DigestionInsight,
  HealthState, InsightCard, InsightNarrative, InsightsSummary, MetricCard, WeekAggregate,
  WorkoutPlan,
};
use crate::domain::SubjectId;

/// Read-only view of the Vitals backend, keyed by subject.
///
/// Every method maps to one HTTP read. Pipelines never call these directly;
/// they go through the deadline race, which turns errors and slowness into
/// documented fallback values. Implementations therefore return plain
/// errors and need no retry or timeout handling of their own.
#[async_trait]
pub trait Backend: Send + Sync {
  // Fast deterministic reads (analytics, phase one).
  async fn insights_summary(&self, subject: &SubjectId) -> Result<InsightsSummary>;
  async fn derived_metrics(&self, subject: &SubjectId) -> Result<Vec<MetricCard>>;
  async fn insight_cards(&self, subject: &SubjectId) -> Result<Vec<InsightCard>>;
  async fn weekly_summaries(&self, subject: &SubjectId) -> Result<Vec<DailySummary>>;
  async fn dashboard_today(&self, subject: &SubjectId) -> Result<DashboardSnapshot>;
  async fn health_state(&self, subject: &SubjectId) -> Result<HealthState>;

  // LLM-derived reads (analytics, intelligence phase). 5-20 s typical.
  async fn insight_narrative(&self, subject: &SubjectId) -> Result<InsightNarrative>;
  async fn digestion_insight(&self, subject: &SubjectId) -> Result<DigestionInsight>;

  // Workout. `None` means a rest day.
  async fn workout_today(&self, subject: &SubjectId) -> Result<Option<WorkoutPlan>>;

  // Calendar.
  async fn month_logs(&self, subject: &SubjectId, year: i32, month: u32) -> Result<Vec<DayLog>>;
  async fn cycle_settings(&self, subject: &SubjectId) -> Result<CycleSettings>;
  async fn cycle_current(&self, subject: &SubjectId) -> Result<CycleDetail>;
  async fn week_aggregate(&self, subject: &SubjectId) -> Result<WeekAggregate>;
}
