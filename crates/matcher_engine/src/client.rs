use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use matcher_logging::matcher_debug;

use crate::{
    ApiError, FailureKind, HealthStatus, IngestAccepted, IngestRequest, JobStatusRecord,
    MatchRecord, MatchRequest,
};

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_export_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_export_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Backend endpoints used by the matcher front-end.
#[async_trait::async_trait]
pub trait ResearchApi: Send + Sync {
    async fn match_profile(&self, request: &MatchRequest) -> Result<Vec<MatchRecord>, ApiError>;

    async fn trigger_ingest(&self, request: &IngestRequest) -> Result<IngestAccepted, ApiError>;

    async fn job_status(&self, job_id: &str) -> Result<JobStatusRecord, ApiError>;

    async fn health(&self) -> Result<HealthStatus, ApiError>;

    /// Downloads the professor spreadsheet.
    async fn export_professors(&self) -> Result<Vec<u8>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    base: Url,
    client: reqwest::Client,
    max_export_bytes: u64,
}

impl ReqwestApi {
    pub fn new(settings: &ClientSettings) -> Result<Self, ApiError> {
        let base = Url::parse(settings.base_url.trim())
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            base,
            client,
            max_export_bytes: settings.max_export_bytes,
        })
    }

    /// Appends path segments to the base url, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::new(FailureKind::InvalidUrl, "base url has no path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        matcher_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode_json(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ApiError> {
        matcher_debug!("POST {}", url);
        let payload = serde_json::to_vec(body)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode_json(response).await
    }
}

#[async_trait::async_trait]
impl ResearchApi for ReqwestApi {
    async fn match_profile(&self, request: &MatchRequest) -> Result<Vec<MatchRecord>, ApiError> {
        let url = self.endpoint(&["match"])?;
        self.post_json(url, request).await
    }

    async fn trigger_ingest(&self, request: &IngestRequest) -> Result<IngestAccepted, ApiError> {
        let url = self.endpoint(&["ingest"])?;
        let accepted: IngestAccepted = self.post_json(url, request).await?;
        if accepted.task_id.trim().is_empty() {
            return Err(ApiError::new(
                FailureKind::MissingTaskId,
                "ingest response carried an empty task_id",
            ));
        }
        Ok(accepted)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusRecord, ApiError> {
        let url = self.endpoint(&["job", job_id])?;
        self.get_json(url).await
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let url = self.endpoint(&["health"])?;
        self.get_json(url).await
    }

    async fn export_professors(&self) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(&["export", "professors.xlsx"])?;
        matcher_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response)?;

        if let Some(content_len) = response.content_length() {
            if content_len > self.max_export_bytes {
                return Err(too_large(self.max_export_bytes, content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.max_export_bytes {
                return Err(too_large(self.max_export_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ))
    }
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let response = ensure_success(response)?;
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&body).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

fn too_large(max_bytes: u64, actual: u64) -> ApiError {
    ApiError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
