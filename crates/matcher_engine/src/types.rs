use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub type RequestId = u64;

/// Body of `POST /match`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRequest {
    pub profile_text: String,
    pub limit: u32,
    pub min_score: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MatchRecord {
    pub professor: String,
    pub university: String,
    #[serde(default)]
    pub email: Option<String>,
    pub max_score: f64,
    #[serde(default)]
    pub papers: Vec<PaperRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaperRecord {
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    pub score: f64,
}

/// Body of `POST /ingest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestRequest {
    pub university: String,
    pub dept_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IngestAccepted {
    pub task_id: String,
}

/// Body of `GET /job/{task_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobStatusRecord {
    pub status: String,
    #[serde(default)]
    pub processed_faculty: u32,
    #[serde(default)]
    pub total_faculty: u32,
    #[serde(default)]
    pub university: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Job and lineage a poll belongs to, echoed back in its events.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PollTarget {
    pub job_id: String,
    pub lineage: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    SearchFinished {
        request_id: RequestId,
        result: Result<Vec<MatchRecord>, ApiError>,
    },
    IngestFinished {
        result: Result<IngestAccepted, ApiError>,
    },
    JobStatus {
        target: PollTarget,
        result: Result<JobStatusRecord, ApiError>,
    },
    /// A scheduled poll for `target` fired without being cancelled.
    PollDue { target: PollTarget },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutput {
    pub path: PathBuf,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    MissingTaskId,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::MissingTaskId => write!(f, "missing task id"),
        }
    }
}
