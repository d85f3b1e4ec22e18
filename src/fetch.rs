//! Deadline-bounded fetch primitive.
//!
//! Every upstream call in this crate is wrapped by [`race_with_timeout`],
//! which races the call against a deadline and resolves to a value either
//! way. Slow or failing calls degrade to a caller-supplied fallback instead
//! of propagating errors, so the merge step downstream never sees a hole.

use color_eyre::Result;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Deadline for plain deterministic reads.
pub const DEADLINE_READ: Duration = Duration::from_millis(5000);
/// Deadline for multi-step reads (paginated or composed server-side).
pub const DEADLINE_MULTI: Duration = Duration::from_millis(8000);
/// Deadline for LLM-derived reads.
pub const DEADLINE_INSIGHT: Duration = Duration::from_millis(20000);

/// How a deadline-raced call resolved.
///
/// All three variants carry a usable value. `TimedOut` and `Failed` carry
/// the fallback that was substituted for the real result.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
  /// The call resolved within its deadline.
  Success(T),
  /// The deadline elapsed first; the call keeps running detached and its
  /// eventual result is discarded.
  TimedOut(T),
  /// The call returned an error within the deadline.
  Failed(T),
}

impl<T> FetchOutcome<T> {
  /// Unwrap to the carried value, whichever way the call resolved.
  pub fn into_value(self) -> T {
    match self {
      FetchOutcome::Success(v) | FetchOutcome::TimedOut(v) | FetchOutcome::Failed(v) => v,
    }
  }

  pub fn is_success(&self) -> bool {
    matches!(self, FetchOutcome::Success(_))
  }

  pub fn is_timed_out(&self) -> bool {
    matches!(self, FetchOutcome::TimedOut(_))
  }

  pub fn is_failed(&self) -> bool {
    matches!(self, FetchOutcome::Failed(_))
  }
}

/// Race `op` against `deadline`, resolving to `fallback` if the deadline
/// elapses or the call errors.
///
/// The operation runs on its own task. When the deadline wins, the task is
/// deliberately left running (the underlying calls are side-effect-free
/// reads, so abandoning them is safe) and its result is dropped on
/// completion. This function never returns an error.
pub async fn race_with_timeout<T, F>(
  label: &'static str,
  deadline: Duration,
  fallback: T,
  op: F,
) -> FetchOutcome<T>
where
  T: Send + 'static,
  F: Future<Output = Result<T>> + Send + 'static,
{
  let handle = tokio::spawn(op);

  tokio::select! {
    joined = handle => match joined {
      Ok(Ok(value)) => FetchOutcome::Success(value),
      Ok(Err(e)) => {
        warn!(call = label, error = %e, "upstream call failed, substituting fallback");
        FetchOutcome::Failed(fallback)
      }
      Err(e) => {
        warn!(call = label, error = %e, "upstream task aborted, substituting fallback");
        FetchOutcome::Failed(fallback)
      }
    },
    // Dropping the join handle detaches the task rather than cancelling it.
    _ = tokio::time::sleep(deadline) => {
      warn!(call = label, deadline_ms = deadline.as_millis() as u64, "upstream call missed deadline, substituting fallback");
      FetchOutcome::TimedOut(fallback)
    }
  }
}
