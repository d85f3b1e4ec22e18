//! Client-side data orchestration and cache layer for the Vitals health app.
//!
//! Sits between the UI and a backend composed of fast deterministic reads
//! and slow LLM-derived reads. The UI gets usable data within a couple of
//! seconds even while the slow reads are still in flight: every upstream
//! call is raced against a deadline and degrades to a documented fallback,
//! results are cached durably with a 5-minute TTL, and the three data
//! domains (analytics, workout, calendar) load, refresh and invalidate
//! independently.
//!
//! Entry point is [`sync::DataSync`]; see that module for the orchestration
//! contract.

pub mod api;
pub mod cache;
pub mod config;
pub mod domain;
pub mod fetch;
pub mod session;
pub mod sync;

pub use config::Config;
pub use domain::{Domain, SubjectId};
pub use fetch::{race_with_timeout, FetchOutcome};
pub use sync::{DataSync, Deadlines, LoadPhase, SyncEvent};
