//! cluster-sentinel — autonomous recovery and rebalance agent for clustered
//! storage membership.
//!
//! The sentinel polls a cluster management API and watches for members that
//! have dropped out of the active topology. When exactly one member has
//! failed and reports healthy, it re-admits the member with a full recovery
//! and rebalances the cluster across the complete membership list. Two
//! rolling-window budgets (one cluster-wide, one per hostname) suspend
//! automated action after too many attempts, on the assumption that repeated
//! failures indicate a larger issue a human should look at.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Control Loop                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Backoff Trackers: cluster budget | per-node budget          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Failure Detector │ Recovery Orchestrator                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Management API client: snapshot | recover | rebalance      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod backoff;
pub mod client;
pub mod config;
pub mod detector;
pub mod error;
pub mod reconciler;
pub mod recovery;
pub mod types;

pub use error::{Result, SentinelError};

use std::sync::Arc;

/// Validate the configuration, build the management API client, and run the
/// reconciliation loop until a fatal error.
pub async fn run(config: config::Config) -> Result<()> {
    config.validate()?;

    let api = Arc::new(client::ClusterClient::new(&config)?);
    reconciler::Reconciler::new(&config, api).run().await
}
