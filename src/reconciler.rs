//! The reconciliation control loop.
//!
//! Single sequential task: enforce both thrash budgets (either may demand a
//! blocking penalty pause), fetch a membership snapshot, classify it, and
//! hand a single actionable failure to the orchestrator. All mutable state
//! lives on this one task; there is no cancellation during a pause.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::info;

use crate::backoff::{BackoffDecision, ClusterBackoff, NodeBackoff};
use crate::client::ManagementApi;
use crate::config::Config;
use crate::detector::{self, Detection};
use crate::error::Result;
use crate::recovery::{CycleOutcome, RecoveryOrchestrator};

/// Ties the trackers, detector, and orchestrator into the polling loop.
pub struct Reconciler<A> {
    api: Arc<A>,
    orchestrator: RecoveryOrchestrator<A>,
    cluster_backoff: ClusterBackoff,
    node_backoff: NodeBackoff,
    poll_interval: Duration,
}

impl<A: ManagementApi> Reconciler<A> {
    /// Create a new reconciler with inert trackers.
    pub fn new(config: &Config, api: Arc<A>) -> Self {
        Self {
            orchestrator: RecoveryOrchestrator::new(Arc::clone(&api), config.dry_run),
            api,
            cluster_backoff: ClusterBackoff::new(config.cluster_backoff.clone()),
            node_backoff: NodeBackoff::new(config.node_backoff.clone()),
            poll_interval: config.poll_interval,
        }
    }

    /// Poll forever. Returns only on a snapshot failure, which is fatal to
    /// the process; an external supervisor is expected to restart it.
    pub async fn run(mut self) -> Result<()> {
        let snapshot = self.api.fetch_nodes().await?;
        info!(
            cluster = %snapshot.name,
            members = snapshot.nodes.len(),
            "Connected to cluster, watching membership"
        );

        loop {
            self.tick().await?;
            sleep(self.poll_interval).await;
        }
    }

    /// One reconciliation pass: budget checks, snapshot, detection, recovery.
    pub async fn tick(&mut self) -> Result<()> {
        self.enforce_backoff().await;

        let snapshot = self.api.fetch_nodes().await?;

        if let Detection::SingleFailure(failed) = detector::detect(&snapshot) {
            let outcome = self.orchestrator.run_cycle(&failed, &snapshot).await;
            if outcome == CycleOutcome::Attempted {
                // One timestamp for both trackers so their windows arm at
                // the same instant.
                let now = Instant::now();
                self.cluster_backoff.record_attempt(now);
                self.node_backoff.record_attempt(&failed.hostname, now);
            }
        }

        Ok(())
    }

    /// Run both trackers' transition checks, pausing the whole loop when one
    /// trips. Cluster first, then per-node; pauses stack if both trip.
    async fn enforce_backoff(&mut self) {
        if let BackoffDecision::Penalize(pause) = self.cluster_backoff.check(Instant::now()) {
            sleep(pause).await;
        }

        if let BackoffDecision::Penalize(pause) = self.node_backoff.check(Instant::now()) {
            sleep(pause).await;
        }
    }

    /// Cluster-wide tracker state.
    pub fn cluster_backoff(&self) -> &ClusterBackoff {
        &self.cluster_backoff
    }

    /// Per-node tracker state.
    pub fn node_backoff(&self) -> &NodeBackoff {
        &self.node_backoff
    }
}
