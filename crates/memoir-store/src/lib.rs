//! Memory store adapter for a Pinecone-style serverless vector store.
//!
//! The index is provisioned lazily, exactly once per process: the first
//! caller creates it if missing and resolves the data-plane host, and
//! every later caller reuses the cached host. Provisioning failures are
//! not cached, so a later request can retry from scratch.

mod wire;

use async_trait::async_trait;
use log::{debug, info};
use memoir_core::{Candidate, MemoryRecord, PipelineError, VectorStore};
use tokio::sync::OnceCell;
use wire::{
    CreateIndexRequest, DescribeIndexResponse, QueryRequest, QueryResponse, ServerlessSpec,
    SpecWrapper, UpsertRequest, Vector, candidate_from_match,
};

/// Pinecone control-plane endpoint.
pub const DEFAULT_CONTROL_URL: &str = "https://api.pinecone.io";

/// Connection and index parameters for the store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// API key sent on every request.
    pub api_key: String,
    /// Index name to provision and use.
    pub index_name: String,
    /// Dimensionality every vector in the index must match.
    pub dimension: usize,
    /// Serverless cloud provider.
    pub cloud: String,
    /// Serverless region.
    pub region: String,
    /// Control-plane base URL; override for tests.
    pub control_url: String,
}

impl StoreConfig {
    /// Config against the default control plane.
    pub fn new(
        api_key: impl Into<String>,
        index_name: impl Into<String>,
        dimension: usize,
        cloud: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            index_name: index_name.into(),
            dimension,
            cloud: cloud.into(),
            region: region.into(),
            control_url: DEFAULT_CONTROL_URL.to_string(),
        }
    }
}

/// REST adapter implementing the [`VectorStore`] seam.
pub struct PineconeStore {
    http: reqwest::Client,
    config: StoreConfig,
    /// Data-plane host, resolved once on first use. Concurrent first
    /// callers coordinate on a single provisioning attempt.
    host: OnceCell<String>,
}

impl PineconeStore {
    /// Build a store over the given config.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            host: OnceCell::new(),
        }
    }

    /// Resolve the data-plane host, provisioning the index on first use.
    async fn ensure_ready(&self) -> Result<&str, PipelineError> {
        self.host
            .get_or_try_init(|| self.provision())
            .await
            .map(String::as_str)
    }

    /// Describe the index, creating it if missing, and return its host.
    async fn provision(&self) -> Result<String, PipelineError> {
        if let Some(host) = self.describe().await? {
            debug!("index already provisioned (index={})", self.config.index_name);
            return Ok(host);
        }

        info!(
            "creating index (index={}, dimension={}, metric=cosine)",
            self.config.index_name, self.config.dimension
        );
        let body = CreateIndexRequest {
            name: self.config.index_name.clone(),
            dimension: self.config.dimension,
            metric: "cosine".to_string(),
            spec: SpecWrapper {
                serverless: ServerlessSpec {
                    cloud: self.config.cloud.clone(),
                    region: self.config.region.clone(),
                },
            },
        };
        let response = self
            .http
            .post(format!("{}/indexes", self.config.control_url))
            .header("Api-Key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| PipelineError::IndexProvisioningFailed(err.to_string()))?;
        let status = response.status();
        // 409: another caller created it first; idempotent-create.
        if !status.is_success() && status.as_u16() != 409 {
            return Err(PipelineError::IndexProvisioningFailed(format!(
                "create returned status {status}"
            )));
        }

        self.describe().await?.ok_or_else(|| {
            PipelineError::IndexProvisioningFailed(format!(
                "index {} has no host after creation",
                self.config.index_name
            ))
        })
    }

    /// Fetch the index host, or `None` when the index does not exist.
    async fn describe(&self) -> Result<Option<String>, PipelineError> {
        let response = self
            .http
            .get(format!(
                "{}/indexes/{}",
                self.config.control_url, self.config.index_name
            ))
            .header("Api-Key", &self.config.api_key)
            .send()
            .await
            .map_err(|err| PipelineError::IndexProvisioningFailed(err.to_string()))?;
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(PipelineError::IndexProvisioningFailed(format!(
                "describe returned status {}",
                response.status()
            )));
        }
        let described: DescribeIndexResponse = response
            .json()
            .await
            .map_err(|err| PipelineError::IndexProvisioningFailed(err.to_string()))?;
        Ok(Some(described.host))
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    async fn upsert(&self, namespace: &str, records: &[MemoryRecord]) -> Result<(), PipelineError> {
        let host = self.ensure_ready().await?;
        let body = UpsertRequest {
            vectors: records.iter().map(Vector::from_record).collect(),
            namespace: namespace.to_string(),
        };
        let response = self
            .http
            .post(format!("https://{host}/vectors/upsert"))
            .header("Api-Key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| PipelineError::StoreUnavailable(err.to_string()))?;
        if !response.status().is_success() {
            return Err(PipelineError::StoreUnavailable(format!(
                "upsert returned status {}",
                response.status()
            )));
        }
        debug!(
            "upserted records (namespace={namespace}, count={})",
            records.len()
        );
        Ok(())
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<Candidate>, PipelineError> {
        let host = self.ensure_ready().await?;
        let body = QueryRequest {
            vector: vector.to_vec(),
            top_k,
            namespace: namespace.to_string(),
            include_metadata: true,
        };
        let response = self
            .http
            .post(format!("https://{host}/query"))
            .header("Api-Key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| PipelineError::StoreUnavailable(err.to_string()))?;
        if !response.status().is_success() {
            return Err(PipelineError::StoreUnavailable(format!(
                "query returned status {}",
                response.status()
            )));
        }
        let decoded: QueryResponse = response
            .json()
            .await
            .map_err(|err| PipelineError::StoreUnavailable(err.to_string()))?;
        Ok(decoded.matches.into_iter().map(candidate_from_match).collect())
    }
}
