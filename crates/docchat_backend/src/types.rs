use std::path::PathBuf;

use serde::Deserialize;

/// Snapshot of the backend's shared processing status. Fetched fresh on
/// every poll tick, never cached across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct JobStatus {
    pub is_processing: bool,
    #[serde(default)]
    pub processed_files: u32,
    #[serde(default)]
    pub total_files: u32,
    #[serde(default)]
    pub chunks_created: u32,
}

/// Answer payload from `/ask`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AskOutcome {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Sidebar entry from `/sessions`; not the authoritative transcript.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionEntry {
    pub id: String,
    pub title: String,
    pub last_activity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct SessionsEnvelope {
    #[serde(default)]
    pub sessions: Vec<SessionEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionMessage {
    pub role: String,
    pub content: String,
}

/// Full transcript from `/session/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionDetail {
    pub id: String,
    pub title: String,
    pub last_activity: String,
    #[serde(default)]
    pub messages: Vec<SessionMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: String,
}

/// A staged file handed over for multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedUpload {
    pub name: String,
    pub path: PathBuf,
    pub content_type: Option<String>,
}

/// One ingestion unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
    Upload { files: Vec<StagedUpload> },
    Crawl { base_url: String, max_pages: u32 },
}

/// Lifecycle callbacks emitted while a job runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    Started,
    Progress { processed: u32, total: u32, chunks: u32 },
    Completed { processed: u32, chunks: u32 },
    Failed { message: String },
}

/// Final counts of a finished job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOutcome {
    pub processed: u32,
    pub chunks: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request itself failed: connection, TLS, timeout.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend answered non-2xx; `detail` is its own message.
    #[error("{detail}")]
    Backend { status: u16, detail: String },
    /// The response decoded but did not match the endpoint's shape.
    #[error("malformed response from {endpoint}: {message}")]
    Shape {
        endpoint: &'static str,
        message: String,
    },
    /// A staged file disappeared between selection and submission.
    #[error("could not read {name}: {message}")]
    FileRead { name: String, message: String },
}
