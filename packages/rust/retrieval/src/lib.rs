//! Knowledge retrieval against the vector-search sidecar.
//!
//! The sidecar is a separate process exposing `/status`, `/load` and `/query`
//! over HTTP. Every failure here is a *degraded* outcome: the caller's turn
//! proceeds without context instead of failing.

mod sidecar;
mod sources;

use std::time::Duration;

use async_trait::async_trait;
use lexdraft_shared::{
    KnowledgeSnippet, LexDraftError, Result, RetrievalConfig, SourceDescriptor,
};
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub use sidecar::{HitMetadata, QueryHit, SidecarStatus};
pub use sources::{UNKNOWN_SOURCE, dedup_sources, derive_source, relative_to_marker};

use sidecar::{LoadRequest, LoadResponse, QueryRequest, QueryResponse, StatusResponse};

/// User-Agent string for sidecar requests.
const USER_AGENT: &str = concat!("LexDraft/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// RetrievalOutcome
// ---------------------------------------------------------------------------

/// Outcome of one retrieval.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome {
    /// Passages found (possibly none).
    Retrieved {
        snippets: Vec<KnowledgeSnippet>,
        /// Distinct provenance of the passages, in order of first occurrence.
        sources: Vec<SourceDescriptor>,
    },
    /// The sidecar could not answer; the turn continues without context.
    Degraded { message: String },
}

impl RetrievalOutcome {
    pub fn snippets(&self) -> &[KnowledgeSnippet] {
        match self {
            Self::Retrieved { snippets, .. } => snippets,
            Self::Degraded { .. } => &[],
        }
    }

    pub fn sources(&self) -> &[SourceDescriptor] {
        match self {
            Self::Retrieved { sources, .. } => sources,
            Self::Degraded { .. } => &[],
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Split into snippets and sources, both empty when degraded.
    pub fn into_parts(self) -> (Vec<KnowledgeSnippet>, Vec<SourceDescriptor>) {
        match self {
            Self::Retrieved { snippets, sources } => (snippets, sources),
            Self::Degraded { .. } => (Vec::new(), Vec::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// KnowledgeSource
// ---------------------------------------------------------------------------

/// Anything that can supply domain knowledge for a request.
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// Retrieve passages relevant to `text`. Never fails: problems are
    /// reported as [`RetrievalOutcome::Degraded`].
    async fn retrieve(&self, text: &str) -> RetrievalOutcome;
}

// ---------------------------------------------------------------------------
// KnowledgeRetriever
// ---------------------------------------------------------------------------

/// HTTP client for one retrieval sidecar.
///
/// Load attempts are serialized: a request that sees the database unloaded
/// takes `load_guard`, re-checks status, and only then asks for a load.
pub struct KnowledgeRetriever {
    client: Client,
    base_url: Url,
    config: RetrievalConfig,
    load_guard: Mutex<()>,
}

impl KnowledgeRetriever {
    /// Build a retriever for the sidecar described by `config`.
    pub fn new(config: &RetrievalConfig) -> Result<Self> {
        let base_url = Url::parse(&config.sidecar_url).map_err(|e| {
            LexDraftError::config(format!("invalid sidecar_url '{}': {e}", config.sidecar_url))
        })?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LexDraftError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            config: config.clone(),
            load_guard: Mutex::new(()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{name}", self.base_url.as_str().trim_end_matches('/'))
    }

    /// Whether the sidecar has its vector database in memory.
    pub async fn status(&self) -> Result<bool> {
        let url = self.endpoint("status");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LexDraftError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LexDraftError::Network(format!("{url}: HTTP {status}")));
        }

        let body: StatusResponse = response
            .json()
            .await
            .map_err(|e| LexDraftError::Network(format!("{url}: invalid status body: {e}")))?;
        Ok(body.loaded)
    }

    /// Make sure the database is loaded, issuing at most one `/load` at a time.
    pub async fn ensure_loaded(&self) -> Result<()> {
        if self.status().await? {
            return Ok(());
        }

        let _guard = self.load_guard.lock().await;
        if self.status().await? {
            debug!("vector database loaded by a concurrent request");
            return Ok(());
        }

        self.load().await
    }

    async fn load(&self) -> Result<()> {
        info!(path = %self.config.database_path, "loading vector database");

        let url = self.endpoint("load");
        let response = self
            .client
            .post(&url)
            .json(&LoadRequest {
                path: &self.config.database_path,
            })
            .send()
            .await
            .map_err(|e| LexDraftError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LexDraftError::Retrieval(format!(
                "failed to load vector database: HTTP {status}"
            )));
        }

        let body: LoadResponse = response
            .json()
            .await
            .map_err(|e| LexDraftError::Network(format!("{url}: invalid load body: {e}")))?;

        match body.status {
            SidecarStatus::Success => {
                info!("vector database loaded");
                Ok(())
            }
            SidecarStatus::Error => Err(LexDraftError::Retrieval(format!(
                "failed to load vector database: {}",
                body.message.as_deref().unwrap_or("no message")
            ))),
        }
    }

    /// Ask the sidecar for the passages closest to `text`.
    pub async fn query(&self, text: &str) -> Result<Vec<QueryHit>> {
        let url = self.endpoint("query");
        let response = self
            .client
            .post(&url)
            .json(&QueryRequest {
                query: text,
                k: self.config.top_k,
            })
            .send()
            .await
            .map_err(|e| LexDraftError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LexDraftError::Retrieval(format!("query failed: HTTP {status}")));
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| LexDraftError::Network(format!("{url}: invalid query body: {e}")))?;

        match body.status {
            SidecarStatus::Success => Ok(body.results),
            SidecarStatus::Error => Err(LexDraftError::Retrieval(format!(
                "query failed: {}",
                body.message.as_deref().unwrap_or("no message")
            ))),
        }
    }

    /// Turn sidecar hits into snippets and their distinct sources.
    pub fn to_outcome(&self, hits: Vec<QueryHit>) -> RetrievalOutcome {
        let marker = &self.config.data_root_marker;
        let mut snippets = Vec::with_capacity(hits.len());
        let mut attributed = Vec::with_capacity(hits.len());

        for hit in hits {
            let relevance = hit.relevance();
            let source = derive_source(&hit.metadata, marker);
            if let Some(source) = &source {
                attributed.push(source.clone());
            }
            snippets.push(KnowledgeSnippet {
                content: hit.content,
                relevance,
                source: source.unwrap_or_else(|| SourceDescriptor::local(UNKNOWN_SOURCE)),
            });
        }

        RetrievalOutcome::Retrieved {
            snippets,
            sources: dedup_sources(attributed),
        }
    }

    async fn try_retrieve(&self, text: &str) -> Result<RetrievalOutcome> {
        self.ensure_loaded().await?;
        let hits = self.query(text).await?;
        Ok(self.to_outcome(hits))
    }
}

#[async_trait]
impl KnowledgeSource for KnowledgeRetriever {
    #[instrument(skip_all, fields(sidecar = %self.base_url))]
    async fn retrieve(&self, text: &str) -> RetrievalOutcome {
        match self.try_retrieve(text).await {
            Ok(outcome) => {
                debug!(
                    snippets = outcome.snippets().len(),
                    sources = outcome.sources().len(),
                    "knowledge retrieved"
                );
                outcome
            }
            Err(e) => {
                warn!(error = %e, "retrieval degraded, continuing without context");
                RetrievalOutcome::Degraded {
                    message: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lexdraft_shared::SourceOrigin;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn retriever_for(server: &MockServer) -> KnowledgeRetriever {
        let config = RetrievalConfig {
            sidecar_url: server.uri(),
            timeout_secs: 5,
            ..Default::default()
        };
        KnowledgeRetriever::new(&config).unwrap()
    }

    async fn mount_status(server: &MockServer, loaded: bool) {
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "success", "loaded": loaded})),
            )
            .mount(server)
            .await;
    }

    #[test]
    fn invalid_sidecar_url_is_config_error() {
        let config = RetrievalConfig {
            sidecar_url: "not a url".into(),
            ..Default::default()
        };
        let err = KnowledgeRetriever::new(&config).err().expect("error");
        assert!(matches!(err, LexDraftError::Config { .. }));
    }

    #[tokio::test]
    async fn retrieve_maps_and_dedups_sources() {
        let server = MockServer::start().await;
        mount_status(&server, true).await;

        Mock::given(method("POST"))
            .and(path("/query"))
            .and(body_json(json!({"query": "non-compete clause", "k": 3})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "results": [
                    {"content": "first", "score": 0.13,
                     "metadata": {"source": "/app/data/contracts/nda.txt", "source_type": "local"}},
                    {"content": "second", "score": 0.4,
                     "metadata": {"source": "/app/data/contracts/nda.txt", "source_type": "local"}},
                    {"content": "third", "score": 0.5,
                     "metadata": {"s3_key": "kb/memo.pdf", "source_type": "s3"}},
                    {"content": "orphan", "score": 0.9, "metadata": {}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let retriever = retriever_for(&server);
        let outcome = retriever.retrieve("non-compete clause").await;

        assert!(!outcome.is_degraded());
        let snippets = outcome.snippets();
        assert_eq!(snippets.len(), 4);
        assert!((snippets[0].relevance - 0.87).abs() < 1e-4);
        assert_eq!(snippets[3].source.filename, UNKNOWN_SOURCE);

        let sources = outcome.sources();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].filename, "contracts/nda.txt");
        assert_eq!(sources[0].origin, SourceOrigin::Local);
        assert_eq!(sources[1].filename, "memo.pdf");
        assert_eq!(sources[1].origin, SourceOrigin::RemoteObjectStore);
    }

    #[tokio::test]
    async fn load_error_degrades() {
        let server = MockServer::start().await;
        mount_status(&server, false).await;

        Mock::given(method("POST"))
            .and(path("/load"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "error",
                "message": "File not found: vector_database.pkl"
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let outcome = retriever_for(&server).retrieve("anything").await;
        match outcome {
            RetrievalOutcome::Degraded { message } => {
                assert!(message.contains("File not found"));
            }
            other => panic!("expected Degraded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn query_error_degrades() {
        let server = MockServer::start().await;
        mount_status(&server, true).await;

        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "error",
                "message": "Vector database not loaded"
            })))
            .mount(&server)
            .await;

        let outcome = retriever_for(&server).retrieve("anything").await;
        assert!(outcome.is_degraded());
        assert!(outcome.sources().is_empty());
    }

    #[tokio::test]
    async fn unreachable_sidecar_degrades() {
        let server = MockServer::start().await;
        let retriever = retriever_for(&server);
        drop(server);

        let outcome = retriever.retrieve("anything").await;
        assert!(outcome.is_degraded());
    }

    #[tokio::test]
    async fn loads_on_demand_with_configured_path() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"loaded": false})))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"loaded": true})))
            .with_priority(10)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/load"))
            .and(body_json(json!({"path": "vector_database.pkl"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "success", "results": []})),
            )
            .mount(&server)
            .await;

        let outcome = retriever_for(&server).retrieve("lease termination").await;
        assert_eq!(
            outcome,
            RetrievalOutcome::Retrieved {
                snippets: vec![],
                sources: vec![]
            }
        );
        server.verify().await;
    }

    #[tokio::test]
    async fn concurrent_retrievals_load_once() {
        let server = MockServer::start().await;

        // Three "not loaded" answers cover both first checks and the
        // winner's re-check; the loser's re-check sees the loaded database.
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"loaded": false})))
            .up_to_n_times(3)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"loaded": true})))
            .with_priority(10)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/load"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "success"}))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "success", "results": []})),
            )
            .expect(2)
            .mount(&server)
            .await;

        let retriever = Arc::new(retriever_for(&server));
        let (a, b) = tokio::join!(
            {
                let r = Arc::clone(&retriever);
                async move { r.retrieve("first").await }
            },
            {
                let r = Arc::clone(&retriever);
                async move { r.retrieve("second").await }
            },
        );

        assert!(!a.is_degraded());
        assert!(!b.is_degraded());
        server.verify().await;
    }
}
