// Submission module: the form state the user edits and the resolution of
// that state into exactly one outbound request.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::path::Path;

/// A PDF picked by the user, already read into memory so the request can be
/// rebuilt without touching the disk again.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Read a file from disk. The multipart filename is the last path
    /// component, falling back to `document.pdf`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("document.pdf")
            .to_string();
        Ok(UploadFile { file_name, bytes })
    }
}

// The contents can be megabytes; only show the size.
impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Snapshot of the form at the moment the user pressed "Summarize".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionInput {
    pub text: Option<String>,
    pub pdf_url: Option<String>,
    pub file: Option<UploadFile>,
}

/// The single request a submission resolves to. Only one input ever
/// travels to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryRequest {
    /// Multipart upload, one part named `file`.
    Upload(UploadFile),
    /// JSON `{"pdfUrl": ..}`.
    PdfUrl(String),
    /// JSON `{"text": ..}`, possibly empty.
    Text(String),
    /// JSON `{"webpageUrl": ..}`. Never produced by `resolve_request`.
    WebPage(String),
}

impl SummaryRequest {
    /// Short name used in logs and the spinner message.
    pub fn kind(&self) -> &'static str {
        match self {
            SummaryRequest::Upload(_) => "upload",
            SummaryRequest::PdfUrl(_) => "pdf-url",
            SummaryRequest::Text(_) => "text",
            SummaryRequest::WebPage(_) => "web-page",
        }
    }

    /// JSON body for the non-multipart variants, `None` for uploads.
    pub fn json_body(&self) -> Option<Value> {
        match self {
            SummaryRequest::Upload(_) => None,
            SummaryRequest::PdfUrl(url) => Some(json!({ "pdfUrl": url })),
            SummaryRequest::Text(text) => Some(json!({ "text": text })),
            SummaryRequest::WebPage(url) => Some(json!({ "webpageUrl": url })),
        }
    }
}

/// Resolve a submission to one request: file, then PDF URL, then text.
pub fn resolve_request(input: &SubmissionInput) -> SummaryRequest {
    if let Some(file) = &input.file {
        return SummaryRequest::Upload(file.clone());
    }
    match input.pdf_url.as_deref() {
        Some(url) if !url.is_empty() => SummaryRequest::PdfUrl(url.to_string()),
        _ => SummaryRequest::Text(input.text.clone().unwrap_or_default()),
    }
}

/// Editable form state. Fields are independent; precedence is only applied
/// when the snapshot is resolved.
#[derive(Debug, Clone, Default)]
pub struct InputForm {
    text: String,
    pdf_url: String,
    file: Option<UploadFile>,
}

impl InputForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn pdf_url(&self) -> &str {
        &self.pdf_url
    }

    pub fn file(&self) -> Option<&UploadFile> {
        self.file.as_ref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_pdf_url(&mut self, url: impl Into<String>) {
        self.pdf_url = url.into();
    }

    pub fn set_file(&mut self, file: Option<UploadFile>) {
        self.file = file;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Emit the current snapshot. Empty fields become `None`; an entirely
    /// empty form is still a valid submission.
    pub fn submit(&self) -> SubmissionInput {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        SubmissionInput {
            text: non_empty(&self.text),
            pdf_url: non_empty(&self.pdf_url),
            file: self.file.clone(),
        }
    }
}
