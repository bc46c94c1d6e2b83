//! Cluster snapshot types returned by the management API.

use serde::Deserialize;

/// Membership state of a node that is part of the active topology.
pub const MEMBERSHIP_ACTIVE: &str = "active";

/// Health status required before automated action is taken on a node.
pub const STATUS_HEALTHY: &str = "healthy";

/// Response body of the node-listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClusterNodes {
    /// Cluster name as reported by the management API.
    #[serde(default)]
    pub name: String,
    /// Current cluster members in listing order.
    pub nodes: Vec<NodeInfo>,
}

impl ClusterNodes {
    /// Member IDs in the format the rebalance endpoint expects.
    ///
    /// Always the complete list: omitting a member from a rebalance request
    /// is equivalent to asking for its removal from the cluster.
    pub fn otp_nodes(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.otp_node.clone()).collect()
    }
}

/// A single cluster member.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    /// Whether the node is formally part of the active topology.
    pub cluster_membership: String,
    /// Recovery type currently assigned to the node, if any.
    #[serde(default)]
    pub recovery_type: String,
    /// Liveness signal, independent of membership state.
    pub status: String,
    /// Node hostname.
    pub hostname: String,
    /// Opaque node ID used when addressing recovery and rebalance requests.
    pub otp_node: String,
    /// Services hosted by the node (informational).
    #[serde(default)]
    pub services: Vec<String>,
}

impl NodeInfo {
    /// True if the node is part of the active topology.
    pub fn is_active(&self) -> bool {
        self.cluster_membership == MEMBERSHIP_ACTIVE
    }

    /// True if the node reports healthy.
    pub fn is_healthy(&self) -> bool {
        self.status == STATUS_HEALTHY
    }
}
