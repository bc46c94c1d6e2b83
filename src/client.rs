//! HTTP client for the cluster management API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, SentinelError};
use crate::types::ClusterNodes;

/// Operations the reconciler consumes from the cluster management API.
#[async_trait]
pub trait ManagementApi: Send + Sync {
    /// Fetch the current member listing.
    async fn fetch_nodes(&self) -> Result<ClusterNodes>;

    /// Re-admit a failed member with a full re-sync.
    async fn set_recovery_type(&self, otp_node: &str) -> Result<()>;

    /// Redistribute data across the supplied complete member list.
    async fn rebalance(&self, known_nodes: &[String]) -> Result<()>;
}

/// reqwest-backed management API client with basic auth.
pub struct ClusterClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl ClusterClient {
    /// Create a new client from the runtime configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(format!("cluster-sentinel/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Build URL for an API path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a form-encoded body; success is HTTP 200, anything else is a
    /// failure carrying the response body as context.
    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<()> {
        debug!(path, "POST");
        let response = self
            .client
            .post(self.url(path))
            .basic_auth(&self.username, Some(&self.password))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(SentinelError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl ManagementApi for ClusterClient {
    async fn fetch_nodes(&self) -> Result<ClusterNodes> {
        let response = self
            .client
            .get(self.url("/pools/default"))
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(SentinelError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn set_recovery_type(&self, otp_node: &str) -> Result<()> {
        self.post_form(
            "/controller/setRecoveryType",
            &[("otpNode", otp_node), ("recoveryType", "full")],
        )
        .await
    }

    async fn rebalance(&self, known_nodes: &[String]) -> Result<()> {
        if known_nodes.is_empty() {
            return Err(SentinelError::InvalidArgument(
                "no nodes provided for rebalance".to_string(),
            ));
        }

        let joined = known_nodes.join(",");
        self.post_form("/controller/rebalance", &[("knownNodes", &joined)])
            .await
    }
}
