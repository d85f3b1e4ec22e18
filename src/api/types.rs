//! Wire types for the Vitals backend API.
//!
//! Every field a pipeline does not strictly need is optional or defaulted,
//! so a partially populated response still deserializes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Insight summary with commentary and detected causal-chain patterns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightsSummary {
  #[serde(default)]
  pub headline: Option<String>,
  #[serde(default)]
  pub commentary: Option<String>,
  #[serde(default)]
  pub patterns: Vec<CausalPattern>,
}

/// A detected cause-effect pattern ("late meals -> poor sleep").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalPattern {
  pub cause: String,
  pub effect: String,
  pub confidence: f64,
}

/// A derived metric card (30-day window).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCard {
  pub id: String,
  pub title: String,
  pub value: f64,
  pub unit: String,
  #[serde(default)]
  pub trend: Option<f64>,
}

/// A short-form insight card (14-day window).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightCard {
  pub id: String,
  pub title: String,
  pub body: String,
  #[serde(default)]
  pub severity: Option<String>,
}

/// One day's totals within the weekly summary window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
  pub date: NaiveDate,
  pub calories: f64,
  pub protein_g: f64,
  pub water_ml: f64,
  #[serde(default)]
  pub sleep_hours: Option<f64>,
}

/// Today's dashboard: the current snapshot plus configured targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
  #[serde(default)]
  pub today: Option<DaySnapshot>,
  #[serde(default)]
  pub targets: Option<BaseTargets>,
  #[serde(default)]
  pub workout_targets: Option<WorkoutTargets>,
  #[serde(default)]
  pub is_workout_day: bool,
}

/// Logged totals for the current day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySnapshot {
  pub date: NaiveDate,
  pub calories: f64,
  pub protein_g: f64,
  pub water_ml: f64,
  #[serde(default)]
  pub steps: Option<u32>,
}

/// Base nutrition/hydration/sleep targets. Partial by design: any missing
/// field falls back to the hardcoded baseline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseTargets {
  #[serde(default)]
  pub calories: Option<f64>,
  #[serde(default)]
  pub protein_g: Option<f64>,
  #[serde(default)]
  pub water_ml: Option<f64>,
  #[serde(default)]
  pub sleep_hours: Option<f64>,
  #[serde(default)]
  pub personalized: bool,
}

/// Workout-day overrides. Sleep is deliberately absent: workout days never
/// adjust the sleep target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutTargets {
  #[serde(default)]
  pub calories: Option<f64>,
  #[serde(default)]
  pub protein_g: Option<f64>,
  #[serde(default)]
  pub water_ml: Option<f64>,
}

/// Inferred health-state snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthState {
  #[serde(default)]
  pub has_data: bool,
  #[serde(default)]
  pub state: Option<String>,
  #[serde(default)]
  pub score: Option<f64>,
}

/// LLM-derived narrative over recent changes. Slow to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightNarrative {
  pub narrative: String,
  #[serde(default)]
  pub delta_commentary: Option<String>,
}

/// LLM-derived digestion insight. Slow to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestionInsight {
  pub summary: String,
  #[serde(default)]
  pub triggers: Vec<String>,
}

/// Today's workout plan. Absence means a rest day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
  pub plan: String,
  #[serde(default)]
  pub focus: Option<String>,
  #[serde(default)]
  pub exercises: Vec<String>,
}

/// One day's logging activity within a calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayLog {
  pub date: NaiveDate,
  #[serde(default)]
  pub logged_meals: u32,
  #[serde(default)]
  pub workout_completed: bool,
  #[serde(default)]
  pub calories: Option<f64>,
}

/// Cycle-tracking feature settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleSettings {
  #[serde(default)]
  pub tracking_enabled: bool,
}

/// Current cycle detail. Only fetched when tracking is enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleDetail {
  pub phase: String,
  #[serde(default)]
  pub day_in_cycle: Option<u32>,
  #[serde(default)]
  pub predicted_next: Option<NaiveDate>,
}

/// Rolling weekly aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekAggregate {
  pub avg_calories: f64,
  pub avg_protein_g: f64,
  pub avg_water_ml: f64,
  #[serde(default)]
  pub days_logged: u32,
}
