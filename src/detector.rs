//! Failure detection over a cluster snapshot.

use tracing::info;

use crate::types::{ClusterNodes, NodeInfo};

/// Outcome of scanning a snapshot for failed members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// Every member is part of the active topology.
    Healthy,
    /// Exactly one member has dropped out; it is actionable.
    SingleFailure(NodeInfo),
    /// Two or more members are out. Intervention is withheld rather than
    /// guessing which member to act on mid-cascade.
    MultipleFailures(usize),
}

/// Scan all members and classify the snapshot.
pub fn detect(snapshot: &ClusterNodes) -> Detection {
    let failed: Vec<&NodeInfo> = snapshot.nodes.iter().filter(|n| !n.is_active()).collect();

    match failed.as_slice() {
        [] => {
            info!("Cluster in a healthy state");
            Detection::Healthy
        }
        [node] => {
            info!(
                hostname = %node.hostname,
                membership = %node.cluster_membership,
                "Detected a single failed member"
            );
            Detection::SingleFailure((*node).clone())
        }
        many => {
            info!(failed = many.len(), "Too many failed members, holding off");
            Detection::MultipleFailures(many.len())
        }
    }
}
