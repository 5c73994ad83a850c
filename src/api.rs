// API client module: a small blocking HTTP client that talks to the
// summarization service. It only moves bytes; deciding what a response
// means for the UI is the coordinator's job.

use reqwest::blocking::{multipart, Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::submission::SummaryRequest;

/// Failures that happen before a well-formed response body is in hand.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response from service (HTTP {status}): {source}")]
    Malformed {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("Download failed: {status} - {body}")]
    Status { status: u16, body: String },
}

/// Successful summary payload. The length counts are only sent by newer
/// service versions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub summary: String,
    pub highlighted: String,
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_length: Option<u64>,
}

/// Rendition offered by the download endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    Txt,
    Pdf,
}

impl DownloadKind {
    pub fn extension(&self) -> &'static str {
        match self {
            DownloadKind::Txt => "txt",
            DownloadKind::Pdf => "pdf",
        }
    }

    /// Default file name for the saved summary.
    pub fn file_name(&self) -> String {
        format!("summary.{}", self.extension())
    }
}

/// Anything that can answer a summary request with a decoded JSON body.
/// Implemented by `ApiClient`; tests substitute their own.
pub trait Summarizer {
    fn summarize(&self, request: &SummaryRequest) -> Result<Value, ApiError>;
}

/// Holds the reqwest blocking client and the base URL of the service.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for the configured service. Requests never time out:
    /// summarizing a long PDF can take minutes.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(None::<Duration>).build()?;
        Ok(ApiClient {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the summary rendered as a text or PDF file.
    pub fn download(&self, kind: DownloadKind, text: &str) -> Result<Vec<u8>, ApiError> {
        let url = format!("{}/download/{}", &self.base_url, kind.extension());
        info!(%url, "requesting download");
        let res = self.client.post(&url).json(&json!({ "text": text })).send()?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }
        let bytes = res.bytes()?;
        debug!(len = bytes.len(), "download received");
        Ok(bytes.to_vec())
    }
}

impl Summarizer for ApiClient {
    /// POST to /summarize. Uploads go out as multipart with a single `file`
    /// part, everything else as a JSON body. The status code is not checked
    /// here: the service reports bad input as `400 {"error": ..}`.
    fn summarize(&self, request: &SummaryRequest) -> Result<Value, ApiError> {
        let url = format!("{}/summarize", &self.base_url);
        let builder = self.client.post(&url);
        let builder = match request {
            SummaryRequest::Upload(file) => {
                let part = multipart::Part::bytes(file.bytes.clone())
                    .file_name(file.file_name.clone())
                    .mime_str("application/pdf")?;
                builder.multipart(multipart::Form::new().part("file", part))
            }
            other => match other.json_body() {
                Some(body) => builder.json(&body),
                None => builder,
            },
        };

        info!(%url, kind = request.kind(), "sending summarize request");
        decode_body(builder.send()?)
    }
}

fn decode_body(res: Response) -> Result<Value, ApiError> {
    let status = res.status().as_u16();
    let bytes = res.bytes()?;
    debug!(status, len = bytes.len(), "summarize response received");
    serde_json::from_slice(&bytes).map_err(|source| ApiError::Malformed { status, source })
}
