//! Data domains and subject identity.

use std::fmt;

/// Prefix shared by every cache key this crate writes.
pub const CACHE_PREFIX: &str = "vitals";

/// One independently cached and invalidated data area.
///
/// Analytics and Workout have one entry per subject; Calendar has one entry
/// per (subject, year, month) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
  Analytics,
  Workout,
  Calendar { year: i32, month: u32 },
}

impl Domain {
  /// Short name used in cache keys and log output.
  pub fn name(&self) -> &'static str {
    match self {
      Domain::Analytics => "analytics",
      Domain::Workout => "workout",
      Domain::Calendar { .. } => "calendar",
    }
  }

  /// Cache key for this domain scoped to `subject`.
  ///
  /// Format: `{prefix}:{domain}:{subject}[:{year}:{month}]`. The subject is
  /// part of the key so switching the signed-in subject can never read
  /// another subject's entry.
  pub fn cache_key(&self, subject: &SubjectId) -> String {
    match self {
      Domain::Analytics | Domain::Workout => {
        format!("{}:{}:{}", CACHE_PREFIX, self.name(), subject)
      }
      Domain::Calendar { year, month } => {
        format!("{}:{}:{}:{}:{}", CACHE_PREFIX, self.name(), subject, year, month)
      }
    }
  }
}

impl fmt::Display for Domain {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Domain::Calendar { year, month } => write!(f, "calendar {}-{:02}", year, month),
      other => f.write_str(other.name()),
    }
  }
}

/// Identity of the signed-in subject, or "anonymous" when signed out.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubjectId(String);

impl SubjectId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  /// The signed-out identity.
  pub fn anonymous() -> Self {
    Self("anonymous".to_string())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for SubjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
