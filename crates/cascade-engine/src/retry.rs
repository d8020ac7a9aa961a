//! Per-node retry harness

use std::time::Duration;

use crate::model::RetryPolicy;

/// Attempt schedule derived from a node's retry policy: how many attempts
/// to make and how long to sleep between them.
///
/// With retries disabled a node gets exactly one attempt and no delay.
/// A configured attempt count of zero is clamped to one so every node
/// executes at least once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySchedule {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub delay: Duration,
}

impl RetrySchedule {
    /// Compute the schedule for a node's policy
    pub fn for_policy(policy: &RetryPolicy) -> Self {
        if policy.enabled {
            Self {
                max_attempts: policy.max_attempts.max(1),
                delay: Duration::from_millis(policy.delay),
            }
        } else {
            Self {
                max_attempts: 1,
                delay: Duration::ZERO,
            }
        }
    }
}
