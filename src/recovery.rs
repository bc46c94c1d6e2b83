//! Recovery and rebalance sequencing for a detected member failure.
//!
//! One pass per actionable failure: gate on member health, ask the
//! management API to re-admit the member with a full recovery, then
//! rebalance across the complete membership list. A failed rebalance does
//! not abort the pass; the mutation may have partially applied, so the
//! attempt still consumes thrash budget.

use std::sync::Arc;
use tracing::{info, warn};

use crate::client::ManagementApi;
use crate::error::Result;
use crate::types::{ClusterNodes, NodeInfo};

/// Outcome of one orchestration pass, telling the control loop whether the
/// attempt consumed thrash budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The member is not yet healthy; nothing was done, no budget consumed.
    NotReady,
    /// The recovery request failed; no rebalance attempted, no budget
    /// consumed.
    RecoveryFailed,
    /// Recovery went through and a rebalance was attempted. Consumes budget
    /// whether or not the rebalance itself succeeded.
    Attempted,
}

/// Sequences recovery and rebalance for a single failed member.
pub struct RecoveryOrchestrator<A> {
    api: Arc<A>,
    dry_run: bool,
}

impl<A: ManagementApi> RecoveryOrchestrator<A> {
    /// Create a new orchestrator.
    pub fn new(api: Arc<A>, dry_run: bool) -> Self {
        Self { api, dry_run }
    }

    /// Run one recovery + rebalance pass for `failed`.
    pub async fn run_cycle(&self, failed: &NodeInfo, snapshot: &ClusterNodes) -> CycleOutcome {
        if !failed.is_healthy() {
            info!(
                hostname = %failed.hostname,
                status = %failed.status,
                "Member isn't healthy, trying again later"
            );
            return CycleOutcome::NotReady;
        }

        if let Err(e) = self.recover(failed).await {
            warn!(
                hostname = %failed.hostname,
                error = %e,
                "Unable to recover member back into cluster, skipping rebalance"
            );
            return CycleOutcome::RecoveryFailed;
        }

        let known_nodes = snapshot.otp_nodes();
        if let Err(e) = self.rebalance(&known_nodes).await {
            warn!(error = %e, "Failed to rebalance cluster");
        }

        CycleOutcome::Attempted
    }

    async fn recover(&self, node: &NodeInfo) -> Result<()> {
        if self.dry_run {
            info!(hostname = %node.hostname, "Would have recovered member");
            return Ok(());
        }

        info!(
            hostname = %node.hostname,
            otp_node = %node.otp_node,
            "Recovering member with full re-sync"
        );
        self.api.set_recovery_type(&node.otp_node).await
    }

    async fn rebalance(&self, known_nodes: &[String]) -> Result<()> {
        info!(?known_nodes, "Member list passed for rebalance");

        if self.dry_run {
            info!("Would have rebalanced the cluster");
            return Ok(());
        }

        self.api.rebalance(known_nodes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SentinelError;
    use crate::types::{MEMBERSHIP_ACTIVE, STATUS_HEALTHY};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Recording fake for the management API.
    #[derive(Default)]
    struct FakeApi {
        recovery_calls: Mutex<Vec<String>>,
        rebalance_calls: Mutex<Vec<Vec<String>>>,
        fail_recovery: bool,
        fail_rebalance: bool,
    }

    #[async_trait]
    impl ManagementApi for FakeApi {
        async fn fetch_nodes(&self) -> Result<ClusterNodes> {
            unimplemented!("the orchestrator never fetches")
        }

        async fn set_recovery_type(&self, otp_node: &str) -> Result<()> {
            self.recovery_calls
                .lock()
                .unwrap()
                .push(otp_node.to_string());
            if self.fail_recovery {
                return Err(SentinelError::HttpStatus {
                    status: 400,
                    body: "unknown node".to_string(),
                });
            }
            Ok(())
        }

        async fn rebalance(&self, known_nodes: &[String]) -> Result<()> {
            self.rebalance_calls
                .lock()
                .unwrap()
                .push(known_nodes.to_vec());
            if self.fail_rebalance {
                return Err(SentinelError::HttpStatus {
                    status: 500,
                    body: "rebalance running".to_string(),
                });
            }
            Ok(())
        }
    }

    fn member(hostname: &str, membership: &str, status: &str) -> NodeInfo {
        NodeInfo {
            cluster_membership: membership.to_string(),
            recovery_type: String::new(),
            status: status.to_string(),
            hostname: hostname.to_string(),
            otp_node: format!("ns_1@{hostname}"),
            services: vec![],
        }
    }

    fn three_member_snapshot() -> (ClusterNodes, NodeInfo) {
        let failed = member("b.example", "inactiveFailedOver", STATUS_HEALTHY);
        let snapshot = ClusterNodes {
            name: "default".to_string(),
            nodes: vec![
                member("a.example", MEMBERSHIP_ACTIVE, STATUS_HEALTHY),
                failed.clone(),
                member("c.example", MEMBERSHIP_ACTIVE, STATUS_HEALTHY),
            ],
        };
        (snapshot, failed)
    }

    #[tokio::test]
    async fn test_health_gate_blocks_everything() {
        let api = Arc::new(FakeApi::default());
        let orchestrator = RecoveryOrchestrator::new(Arc::clone(&api), false);

        let (snapshot, _) = three_member_snapshot();
        let unhealthy = member("b.example", "inactiveFailedOver", "warmup");

        let outcome = orchestrator.run_cycle(&unhealthy, &snapshot).await;

        assert_eq!(outcome, CycleOutcome::NotReady);
        assert!(api.recovery_calls.lock().unwrap().is_empty());
        assert!(api.rebalance_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rebalance_carries_complete_member_list() {
        let api = Arc::new(FakeApi::default());
        let orchestrator = RecoveryOrchestrator::new(Arc::clone(&api), false);

        let (snapshot, failed) = three_member_snapshot();
        let outcome = orchestrator.run_cycle(&failed, &snapshot).await;

        assert_eq!(outcome, CycleOutcome::Attempted);
        assert_eq!(
            api.recovery_calls.lock().unwrap().as_slice(),
            ["ns_1@b.example"]
        );

        let rebalances = api.rebalance_calls.lock().unwrap();
        assert_eq!(rebalances.len(), 1);
        assert_eq!(rebalances[0].len(), snapshot.nodes.len());
        assert_eq!(
            rebalances[0],
            vec!["ns_1@a.example", "ns_1@b.example", "ns_1@c.example"]
        );
    }

    #[tokio::test]
    async fn test_recovery_failure_skips_rebalance() {
        let api = Arc::new(FakeApi {
            fail_recovery: true,
            ..Default::default()
        });
        let orchestrator = RecoveryOrchestrator::new(Arc::clone(&api), false);

        let (snapshot, failed) = three_member_snapshot();
        let outcome = orchestrator.run_cycle(&failed, &snapshot).await;

        assert_eq!(outcome, CycleOutcome::RecoveryFailed);
        assert_eq!(api.recovery_calls.lock().unwrap().len(), 1);
        assert!(api.rebalance_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rebalance_failure_still_counts_as_attempted() {
        let api = Arc::new(FakeApi {
            fail_rebalance: true,
            ..Default::default()
        });
        let orchestrator = RecoveryOrchestrator::new(Arc::clone(&api), false);

        let (snapshot, failed) = three_member_snapshot();
        let outcome = orchestrator.run_cycle(&failed, &snapshot).await;

        assert_eq!(outcome, CycleOutcome::Attempted);
    }

    #[tokio::test]
    async fn test_dry_run_makes_no_outbound_calls() {
        let api = Arc::new(FakeApi::default());
        let orchestrator = RecoveryOrchestrator::new(Arc::clone(&api), true);

        let (snapshot, failed) = three_member_snapshot();
        let outcome = orchestrator.run_cycle(&failed, &snapshot).await;

        assert_eq!(outcome, CycleOutcome::Attempted);
        assert!(api.recovery_calls.lock().unwrap().is_empty());
        assert!(api.rebalance_calls.lock().unwrap().is_empty());
    }
}
