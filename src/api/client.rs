//! HTTP implementation of the backend client.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use url::Url;

use super::backend::Backend;
use super::types::{
  CycleDetail, CycleSettings, DailySummary, DashboardSnapshot, DayLog, DigestionInsight,
  HealthState, InsightCard, InsightNarrative, InsightsSummary, MetricCard, WeekAggregate,
  WorkoutPlan,
};
use crate::config::Config;
use crate::domain::SubjectId;

/// Vitals API client over HTTPS with bearer-token auth.
#[derive(Clone)]
pub struct HttpBackend {
  base: Url,
  token: String,
  client: reqwest::Client,
}

impl HttpBackend {
  pub fn new(config: &Config) -> Result<Self> {
    let token = Config::api_token()?;

    let base = Url::parse(&config.api.url)
      .map_err(|e| eyre!("Invalid API base URL {}: {}", config.api.url, e))?;

    Ok(Self {
      base,
      token,
      client: reqwest::Client::new(),
    })
  }

  async fn get_json<T: DeserializeOwned>(&self, path: &str, subject: &SubjectId) -> Result<T> {
    let url = self
      .base
      .join(path)
      .map_err(|e| eyre!("Invalid API path {}: {}", path, e))?;

    let response = self
      .client
      .get(url)
      .bearer_auth(&self.token)
      .query(&[("subject", subject.as_str())])
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", path, e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(eyre!("Request to {} failed with status {}", path, status));
    }

    response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse response from {}: {}", path, e))
  }
}

#[async_trait]
impl Backend for HttpBackend {
  async fn insights_summary(&self, subject: &SubjectId) -> Result<InsightsSummary> {
    self.get_json("/v1/insights/summary", subject).await
  }

  async fn derived_metrics(&self, subject: &SubjectId) -> Result<Vec<MetricCard>> {
    self.get_json("/v1/metrics/derived?days=30", subject).await
  }

  async fn insight_cards(&self, subject: &SubjectId) -> Result<Vec<InsightCard>> {
    self.get_json("/v1/insights/cards?days=14", subject).await
  }

  async fn weekly_summaries(&self, subject: &SubjectId) -> Result<Vec<DailySummary>> {
    self.get_json("/v1/summaries/weekly", subject).await
  }

  async fn dashboard_today(&self, subject: &SubjectId) -> Result<DashboardSnapshot> {
    self.get_json("/v1/dashboard/today", subject).await
  }

  async fn health_state(&self, subject: &SubjectId) -> Result<HealthState> {
    self.get_json("/v1/health-state", subject).await
  }

  async fn insight_narrative(&self, subject: &SubjectId) -> Result<InsightNarrative> {
    self.get_json("/v1/insights/narrative", subject).await
  }

  async fn digestion_insight(&self, subject: &SubjectId) -> Result<DigestionInsight> {
    self.get_json("/v1/insights/digestion", subject).await
  }

  async fn workout_today(&self, subject: &SubjectId) -> Result<Option<WorkoutPlan>> {
    let url = self
      .base
      .join("/v1/workout/today")
      .map_err(|e| eyre!("Invalid API path: {}", e))?;

    let response = self
      .client
      .get(url)
      .bearer_auth(&self.token)
      .query(&[("subject", subject.as_str())])
      .send()
      .await
      .map_err(|e| eyre!("Request to /v1/workout/today failed: {}", e))?;

    // Rest days come back as 404 or an empty 204.
    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::NO_CONTENT {
      return Ok(None);
    }
    if !status.is_success() {
      return Err(eyre!("Request to /v1/workout/today failed with status {}", status));
    }

    let plan = response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse workout plan: {}", e))?;
    Ok(Some(plan))
  }

  async fn month_logs(&self, subject: &SubjectId, year: i32, month: u32) -> Result<Vec<DayLog>> {
    self
      .get_json(&format!("/v1/calendar/{}/{}/logs", year, month), subject)
      .await
  }

  async fn cycle_settings(&self, subject: &SubjectId) -> Result<CycleSettings> {
    self.get_json("/v1/cycle/settings", subject).await
  }

  async fn cycle_current(&self, subject: &SubjectId) -> Result<CycleDetail> {
    self.get_json("/v1/cycle/current", subject).await
  }

  async fn week_aggregate(&self, subject: &SubjectId) -> Result<WeekAggregate> {
    self.get_json("/v1/summaries/week-aggregate", subject).await
  }
}
