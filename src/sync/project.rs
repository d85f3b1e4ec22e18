//! Pure projection from raw upstream payloads to view models. No I/O.

use color_eyre::{eyre::eyre, Result};

use crate::api::types::{
  CycleDetail, DailySummary, DashboardSnapshot, DayLog, HealthState, InsightCard,
  InsightsSummary, MetricCard, WeekAggregate,
};
use super::view::{AnalyticsView, CalendarView, Targets, TargetSource, TargetsInfo, BASELINE_TARGETS};

/// Raw outcomes of the analytics fast phase, already resolved to fallback
/// values where calls timed out or failed.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsSources {
  pub commentary: InsightsSummary,
  pub metric_cards: Vec<MetricCard>,
  pub insight_cards: Vec<InsightCard>,
  /// Weekly window as delivered by the backend: newest day first.
  pub weekly: Vec<DailySummary>,
  pub dashboard: Option<DashboardSnapshot>,
  pub health_state: HealthState,
}

/// Merge the fast-phase outcomes into the analytics view model.
pub fn project_analytics(sources: AnalyticsSources) -> Result<AnalyticsView> {
  let (targets, targets_info) = compute_targets(sources.dashboard.as_ref());
  validate_targets(&targets)?;

  // A brand-new subject may have health-state inference before any daily
  // summary exists, or the other way around - either one counts.
  let has_data = sources
    .dashboard
    .as_ref()
    .is_some_and(|d| d.today.is_some())
    || sources.health_state.has_data;

  let patterns = sources.commentary.patterns.clone();

  Ok(AnalyticsView {
    commentary: sources.commentary,
    metric_cards: sources.metric_cards,
    insight_cards: sources.insight_cards,
    daily_summaries: chronological(sources.weekly),
    targets,
    targets_info,
    health_state: sources.health_state,
    patterns,
    has_data,
    delta_commentary: None,
    delta_insights: None,
  })
}

/// Compute effective targets from the dashboard snapshot.
///
/// Base targets come from the dashboard, falling back per field to the
/// hardcoded baseline. On a workout day, workout-specific targets override
/// the base field by field. The sleep target is never workout-day-adjusted.
pub fn compute_targets(dashboard: Option<&DashboardSnapshot>) -> (Targets, TargetsInfo) {
  let base = dashboard.and_then(|d| d.targets.as_ref());
  let workout_day = dashboard.is_some_and(|d| d.is_workout_day);

  let mut targets = Targets {
    calories: base.and_then(|b| b.calories).unwrap_or(BASELINE_TARGETS.calories),
    protein_g: base.and_then(|b| b.protein_g).unwrap_or(BASELINE_TARGETS.protein_g),
    water_ml: base.and_then(|b| b.water_ml).unwrap_or(BASELINE_TARGETS.water_ml),
    sleep_hours: base
      .and_then(|b| b.sleep_hours)
      .unwrap_or(BASELINE_TARGETS.sleep_hours),
    personalized: base.is_some_and(|b| b.personalized),
  };

  let mut source = if base.is_some() {
    TargetSource::Dashboard
  } else {
    TargetSource::Baseline
  };

  if workout_day {
    if let Some(overrides) = dashboard.and_then(|d| d.workout_targets.as_ref()) {
      if let Some(calories) = overrides.calories {
        targets.calories = calories;
      }
      if let Some(protein) = overrides.protein_g {
        targets.protein_g = protein;
      }
      if let Some(water) = overrides.water_ml {
        targets.water_ml = water;
      }
      source = TargetSource::WorkoutOverride;
    }
  }

  (targets, TargetsInfo { source, workout_day })
}

fn validate_targets(targets: &Targets) -> Result<()> {
  let fields = [
    ("calories", targets.calories),
    ("protein_g", targets.protein_g),
    ("water_ml", targets.water_ml),
    ("sleep_hours", targets.sleep_hours),
  ];
  for (name, value) in fields {
    if !value.is_finite() || value < 0.0 {
      return Err(eyre!("Computed target {} is not a usable number: {}", name, value));
    }
  }
  Ok(())
}

/// The backend delivers summary windows newest-first; the view-model
/// convention everywhere is chronological ascending.
pub fn chronological(mut days: Vec<DailySummary>) -> Vec<DailySummary> {
  days.reverse();
  days
}

/// Merge the calendar call outcomes into the calendar view model.
pub fn project_calendar(
  year: i32,
  month: u32,
  mut days: Vec<DayLog>,
  cycle: Option<CycleDetail>,
  week: Option<WeekAggregate>,
) -> Result<CalendarView> {
  if !(1..=12).contains(&month) {
    return Err(eyre!("Month out of range: {}", month));
  }

  days.sort_by_key(|d| d.date);

  Ok(CalendarView {
    year,
    month,
    days,
    cycle,
    week,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::{BaseTargets, DaySnapshot, WorkoutTargets};
  use chrono::NaiveDate;

  fn dashboard(is_workout_day: bool) -> DashboardSnapshot {
    DashboardSnapshot {
      today: None,
      targets: Some(BaseTargets {
        calories: Some(2200.0),
        protein_g: Some(140.0),
        water_ml: Some(2500.0),
        sleep_hours: Some(7.5),
        personalized: true,
      }),
      workout_targets: Some(WorkoutTargets {
        calories: Some(2600.0),
        protein_g: Some(170.0),
        water_ml: None,
      }),
      is_workout_day,
    }
  }

  #[test]
  fn test_workout_day_overrides_field_by_field() {
    let snapshot = dashboard(true);
    let (targets, info) = compute_targets(Some(&snapshot));

    assert_eq!(targets.calories, 2600.0);
    assert_eq!(targets.protein_g, 170.0);
    // No workout override for water: the base value stands.
    assert_eq!(targets.water_ml, 2500.0);
    // Sleep is never workout-day-adjusted.
    assert_eq!(targets.sleep_hours, 7.5);
    assert!(targets.personalized);
    assert_eq!(info.source, TargetSource::WorkoutOverride);
    assert!(info.workout_day);
  }

  #[test]
  fn test_rest_day_uses_base_targets() {
    let snapshot = dashboard(false);
    let (targets, info) = compute_targets(Some(&snapshot));

    assert_eq!(targets.calories, 2200.0);
    assert_eq!(targets.protein_g, 140.0);
    assert_eq!(info.source, TargetSource::Dashboard);
    assert!(!info.workout_day);
  }

  #[test]
  fn test_missing_dashboard_falls_back_to_baseline() {
    let (targets, info) = compute_targets(None);
    assert_eq!(targets, BASELINE_TARGETS);
    assert_eq!(info.source, TargetSource::Baseline);
  }

  #[test]
  fn test_partial_base_targets_fall_back_per_field() {
    let snapshot = DashboardSnapshot {
      targets: Some(BaseTargets {
        calories: Some(1800.0),
        ..Default::default()
      }),
      ..Default::default()
    };
    let (targets, _) = compute_targets(Some(&snapshot));
    assert_eq!(targets.calories, 1800.0);
    assert_eq!(targets.protein_g, BASELINE_TARGETS.protein_g);
    assert_eq!(targets.sleep_hours, BASELINE_TARGETS.sleep_hours);
  }

  fn day(d: u32, calories: f64) -> DailySummary {
    DailySummary {
      date: NaiveDate::from_ymd_opt(2026, 8, d).unwrap(),
      calories,
      protein_g: 100.0,
      water_ml: 2000.0,
      sleep_hours: None,
    }
  }

  #[test]
  fn test_weekly_window_reversed_to_ascending() {
    // Backend order: newest first.
    let weekly = vec![day(7, 2100.0), day(6, 1900.0), day(5, 2000.0)];
    let days = chronological(weekly);
    let dates: Vec<u32> = days
      .iter()
      .map(|d| chrono::Datelike::day(&d.date))
      .collect();
    assert_eq!(dates, vec![5, 6, 7]);
  }

  #[test]
  fn test_has_data_is_a_disjunction() {
    // Health state alone is enough.
    let view = project_analytics(AnalyticsSources {
      health_state: HealthState {
        has_data: true,
        ..Default::default()
      },
      ..Default::default()
    })
    .unwrap();
    assert!(view.has_data);

    // A today snapshot alone is enough.
    let view = project_analytics(AnalyticsSources {
      dashboard: Some(DashboardSnapshot {
        today: Some(DaySnapshot {
          date: NaiveDate::from_ymd_opt(2026, 8, 7).unwrap(),
          calories: 1200.0,
          protein_g: 80.0,
          water_ml: 1500.0,
          steps: None,
        }),
        ..Default::default()
      }),
      ..Default::default()
    })
    .unwrap();
    assert!(view.has_data);

    // Neither source: no data.
    let view = project_analytics(AnalyticsSources::default()).unwrap();
    assert!(!view.has_data);
  }

  #[test]
  fn test_non_finite_target_is_a_projection_error() {
    let snapshot = DashboardSnapshot {
      targets: Some(BaseTargets {
        calories: Some(f64::NAN),
        ..Default::default()
      }),
      ..Default::default()
    };
    let result = project_analytics(AnalyticsSources {
      dashboard: Some(snapshot),
      ..Default::default()
    });
    assert!(result.is_err());
  }

  #[test]
  fn test_calendar_days_sorted_ascending() {
    let logs = vec![
      DayLog {
        date: NaiveDate::from_ymd_opt(2026, 8, 9).unwrap(),
        logged_meals: 3,
        workout_completed: false,
        calories: None,
      },
      DayLog {
        date: NaiveDate::from_ymd_opt(2026, 8, 2).unwrap(),
        logged_meals: 1,
        workout_completed: true,
        calories: None,
      },
    ];
    let view = project_calendar(2026, 8, logs, None, None).unwrap();
    assert_eq!(chrono::Datelike::day(&view.days[0].date), 2);
    assert_eq!(chrono::Datelike::day(&view.days[1].date), 9);
  }

  #[test]
  fn test_calendar_month_out_of_range() {
    assert!(project_calendar(2026, 13, Vec::new(), None, None).is_err());
    assert!(project_calendar(2026, 0, Vec::new(), None, None).is_err());
  }
}
