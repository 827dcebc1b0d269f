//! Session statistics aggregation.
//!
//! Read-only aggregate computation over a window of sessions: volumes,
//! response/resolution times and satisfaction. Pure and idempotent; runs
//! independently of the lifecycle engine.

use super::model::{Session, SessionStatus};
use super::repository::SessionStore;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Aggregate metrics over a set of sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStatistics {
    /// Sessions created inside the window
    pub total_sessions: usize,
    /// Of those, sessions currently in `Resolved` status
    pub resolved_sessions: usize,
    /// Mean response time over resolved sessions, in minutes
    pub average_response_time: f64,
    /// Mean resolution time over resolved sessions, in minutes
    pub average_resolution_time: f64,
    /// Mean satisfaction rating over rated resolved sessions
    pub satisfaction_average: f64,
}

/// Computes aggregate statistics over the session store.
pub struct StatsAggregator {
    store: Arc<dyn SessionStore>,
}

impl StatsAggregator {
    /// Creates a new `StatsAggregator` over the given store.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Computes statistics over sessions created inside `[start, end]`.
    ///
    /// A `None` bound is unbounded on that side; with both bounds `None`
    /// every session is included. Empty inputs produce all-zero aggregates
    /// rather than dividing by zero.
    pub async fn compute(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<SessionStatistics> {
        let sessions = self.store.find_sessions_in_range(start, end).await?;
        Ok(aggregate(&sessions))
    }
}

/// Aggregates metrics over an in-memory slice of sessions.
///
/// Missing response/resolution durations on a resolved session count as 0;
/// the satisfaction mean only divides by the number of rated resolved
/// sessions.
fn aggregate(sessions: &[Session]) -> SessionStatistics {
    let resolved: Vec<&Session> = sessions
        .iter()
        .filter(|s| s.status == SessionStatus::Resolved)
        .collect();

    let resolved_count = resolved.len();
    let (average_response_time, average_resolution_time) = if resolved_count == 0 {
        (0.0, 0.0)
    } else {
        let response_sum: i64 = resolved
            .iter()
            .map(|s| s.response_time_minutes.unwrap_or(0))
            .sum();
        let resolution_sum: i64 = resolved
            .iter()
            .map(|s| s.resolution_time_minutes.unwrap_or(0))
            .sum();
        (
            response_sum as f64 / resolved_count as f64,
            resolution_sum as f64 / resolved_count as f64,
        )
    };

    let ratings: Vec<u8> = resolved
        .iter()
        .filter_map(|s| s.satisfaction_rating)
        .collect();
    let satisfaction_average = if ratings.is_empty() {
        0.0
    } else {
        ratings.iter().map(|&r| r as u32).sum::<u32>() as f64 / ratings.len() as f64
    };

    SessionStatistics {
        total_sessions: sessions.len(),
        resolved_sessions: resolved_count,
        average_response_time,
        average_resolution_time,
        satisfaction_average,
    }
}
