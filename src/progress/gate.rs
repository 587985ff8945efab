//! Pure decision logic for the module-progress gate: the step rule
//! (advancement is strictly one module at a time) and the wait rule
//! (a minimum interval between consecutive advances).
//!
//! Everything here is side-effect free; persistence lives in `repo`.

use serde::Serialize;
use time::{Duration, OffsetDateTime};

/// Remaining wait decomposed for display, matching the wire contract:
/// `hours`/`minutes` floor the remainder, `totalMinutes` rounds it up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitTime {
    pub hours: i64,
    pub minutes: i64,
    pub total_minutes: i64,
}

impl WaitTime {
    pub fn from_remaining(remaining: Duration) -> Self {
        let seconds = remaining.whole_seconds().max(0);
        Self {
            hours: seconds / 3600,
            minutes: (seconds % 3600) / 60,
            total_minutes: (seconds + 59) / 60,
        }
    }
}

/// Outcome of the wait-window check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Open,
    Locked {
        remaining: Duration,
        can_complete_at: OffsetDateTime,
    },
}

/// Evaluates the wait rule. A user with no prior advance (`last_completed_at`
/// unset) is never gated; otherwise the gate stays locked until
/// `last_completed_at + required_wait`.
pub fn evaluate_wait(
    last_completed_at: Option<OffsetDateTime>,
    required_wait: Duration,
    now: OffsetDateTime,
) -> GateDecision {
    let Some(last) = last_completed_at else {
        return GateDecision::Open;
    };
    let can_complete_at = last + required_wait;
    if now >= can_complete_at {
        GateDecision::Open
    } else {
        GateDecision::Locked {
            remaining: can_complete_at - now,
            can_complete_at,
        }
    }
}

/// Why a requested advance is invalid before any storage write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepError {
    /// Requested module is not exactly one past the current one.
    OutOfSequence { expected: u32 },
    /// Requested module lies beyond the product's final module.
    PastFinalModule { module_count: u32 },
}

/// Checks the single-step rule. `current_module` is `None` when no progress
/// record exists, which is equivalent to module 1 being unlocked.
pub fn check_step(
    current_module: Option<u32>,
    requested: u32,
    module_count: u32,
) -> Result<(), StepError> {
    if requested > module_count {
        return Err(StepError::PastFinalModule { module_count });
    }
    let expected = current_module.unwrap_or(1) + 1;
    if requested != expected {
        return Err(StepError::OutOfSequence { expected });
    }
    Ok(())
}
