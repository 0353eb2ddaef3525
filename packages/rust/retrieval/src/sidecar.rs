//! Wire format of the retrieval sidecar.

use serde::{Deserialize, Serialize};

/// `GET /status`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub loaded: bool,
}

/// `POST /load` body.
#[derive(Debug, Clone, Serialize)]
pub struct LoadRequest<'a> {
    pub path: &'a str,
}

/// `POST /query` body.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest<'a> {
    pub query: &'a str,
    pub k: u32,
}

/// Outcome flag shared by `/load` and `/query`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidecarStatus {
    Success,
    Error,
}

/// `POST /load` answer.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadResponse {
    pub status: SidecarStatus,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /query` answer.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub status: SidecarStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub results: Vec<QueryHit>,
}

/// One passage returned by `/query`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryHit {
    pub content: String,
    /// Distance from the query; smaller is closer.
    pub score: f32,
    #[serde(default)]
    pub metadata: HitMetadata,
}

/// Provenance attached to a passage when the knowledge base was built.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HitMetadata {
    pub source: Option<String>,
    pub s3_key: Option<String>,
    pub source_type: Option<String>,
    pub file_name: Option<String>,
}

impl QueryHit {
    /// `1 - distance`, clamped into `[0, 1]`.
    pub fn relevance(&self) -> f32 {
        (1.0 - self.score).clamp(0.0, 1.0)
    }
}
