//! Rolling-window thrash budgets.
//!
//! Two trackers guard against repeated automated mutation of the cluster:
//! one counts interventions cluster-wide, the other per member hostname.
//! Each keeps an attempt count inside a fixed accounting window; when the
//! window expires the count resets wholesale, and when the count reaches the
//! limit the tracker trips, demanding a penalty pause from the control loop.
//!
//! A tracker whose window has never been armed is inert and never acts.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Parameters for a rolling-window budget.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Length of the accounting window.
    pub window: Duration,
    /// Intervention attempts tolerated inside one window.
    pub limit: u32,
    /// Pause demanded when the budget is exhausted.
    pub penalty: Duration,
}

impl BackoffConfig {
    /// Cluster-wide budget: 3 attempts per 2 hours, 4 hour penalty.
    pub fn cluster() -> Self {
        Self {
            window: Duration::from_secs(2 * 60 * 60),
            limit: 3,
            penalty: Duration::from_secs(4 * 60 * 60),
        }
    }

    /// Per-node budget: 2 attempts per 2 hours, 4 hour penalty.
    pub fn node() -> Self {
        Self {
            window: Duration::from_secs(2 * 60 * 60),
            limit: 2,
            penalty: Duration::from_secs(4 * 60 * 60),
        }
    }
}

/// Outcome of a pre-poll budget check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffDecision {
    /// Budget intact; carry on with the tick.
    Proceed,
    /// Budget exhausted; pause the whole loop for this long before resuming.
    Penalize(Duration),
}

/// Cluster-wide intervention budget.
#[derive(Debug)]
pub struct ClusterBackoff {
    config: BackoffConfig,
    window_start: Option<Instant>,
    attempts: u32,
}

impl ClusterBackoff {
    /// Create an inert tracker.
    pub fn new(config: BackoffConfig) -> Self {
        Self {
            config,
            window_start: None,
            attempts: 0,
        }
    }

    /// Count one intervention attempt, arming the window at `now` if inert.
    pub fn record_attempt(&mut self, now: Instant) {
        self.attempts += 1;
        if self.window_start.is_none() {
            self.window_start = Some(now);
        }
    }

    /// Evaluate the state machine once. Window expiry is checked before the
    /// limit, so a stale window rolls over rather than penalizing.
    pub fn check(&mut self, now: Instant) -> BackoffDecision {
        let Some(started) = self.window_start else {
            return BackoffDecision::Proceed;
        };

        if now.duration_since(started) >= self.config.window {
            self.attempts = 0;
            self.window_start = Some(now);
            info!("Cluster intervention window expired, resetting budget");
            return BackoffDecision::Proceed;
        }

        if self.attempts >= self.config.limit {
            warn!(
                attempts = self.attempts,
                penalty_secs = self.config.penalty.as_secs(),
                "Too many cluster intervention attempts, backing off"
            );
            self.attempts = 0;
            self.window_start = None;
            return BackoffDecision::Penalize(self.config.penalty);
        }

        BackoffDecision::Proceed
    }

    /// Return the tracker to its inert state.
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.window_start = None;
    }

    /// Attempts counted in the current window.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Start of the current window, if armed.
    pub fn window_start(&self) -> Option<Instant> {
        self.window_start
    }
}

/// Per-node intervention budget.
///
/// All hostnames share one window lifetime but keep independent counts.
#[derive(Debug)]
pub struct NodeBackoff {
    config: BackoffConfig,
    window_start: Option<Instant>,
    attempts: HashMap<String, u32>,
}

impl NodeBackoff {
    /// Create an inert tracker.
    pub fn new(config: BackoffConfig) -> Self {
        Self {
            config,
            window_start: None,
            attempts: HashMap::new(),
        }
    }

    /// Count one intervention attempt against `hostname`, arming the shared
    /// window at `now` if inert.
    pub fn record_attempt(&mut self, hostname: &str, now: Instant) {
        *self.attempts.entry(hostname.to_string()).or_insert(0) += 1;
        if self.window_start.is_none() {
            self.window_start = Some(now);
        }
    }

    /// Evaluate the state machine once. A window rollover clears every
    /// hostname's count; a trip zeroes only the offending hostname.
    pub fn check(&mut self, now: Instant) -> BackoffDecision {
        let Some(started) = self.window_start else {
            return BackoffDecision::Proceed;
        };

        if now.duration_since(started) >= self.config.window {
            self.attempts.clear();
            self.window_start = Some(now);
            info!("Per-node intervention window expired, clearing counts");
            return BackoffDecision::Proceed;
        }

        let over_limit = self
            .attempts
            .iter()
            .find(|(_, &count)| count >= self.config.limit)
            .map(|(hostname, &count)| (hostname.clone(), count));

        if let Some((hostname, count)) = over_limit {
            warn!(
                hostname = %hostname,
                attempts = count,
                penalty_secs = self.config.penalty.as_secs(),
                "Too many intervention attempts for a single member, backing off"
            );
            self.attempts.insert(hostname, 0);
            self.window_start = None;
            return BackoffDecision::Penalize(self.config.penalty);
        }

        BackoffDecision::Proceed
    }

    /// Return the tracker to its inert state.
    pub fn reset(&mut self) {
        self.attempts.clear();
        self.window_start = None;
    }

    /// Attempts counted against a hostname in the current window.
    pub fn attempts_for(&self, hostname: &str) -> u32 {
        self.attempts.get(hostname).copied().unwrap_or(0)
    }

    /// Start of the current window, if armed.
    pub fn window_start(&self) -> Option<Instant> {
        self.window_start
    }
}
