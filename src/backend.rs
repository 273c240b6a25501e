//! Client for the remote summarization backend.
//!
//! The backend exposes four endpoints:
//! - `POST /summarize` (multipart `pdf`, `summary_type`)
//! - `POST /multi-agent-summarize` (multipart `pdf`)
//! - `POST /upload_pdf_for_qa` (multipart `file`, `paper_id`)
//! - `POST /ask` (form `session_id`, `paper_id`, `question`)

use crate::highlight::ingest_highlights;
use crate::models::{QaReadyResponse, SectionSummary, SummaryOutcome, SummaryType};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid endpoint: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Clone)]
pub struct SummarizerClient {
    http: reqwest::Client,
    base: Url,
}

impl SummarizerClient {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn summarize(
        &self,
        pdf: Vec<u8>,
        filename: &str,
        summary_type: SummaryType,
    ) -> Result<SummaryOutcome, BackendError> {
        let form = Form::new()
            .part("pdf", pdf_part(pdf, filename)?)
            .text("summary_type", summary_type.as_str());

        let started = Instant::now();
        tracing::info!(filename, %summary_type, "requesting summary");
        let body = self.post_multipart("summarize", form).await?;
        tracing::info!(
            filename,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "summary received"
        );
        Ok(parse_summary_response(&body, "filename"))
    }

    pub async fn multi_agent_summarize(
        &self,
        pdf: Vec<u8>,
        filename: &str,
    ) -> Result<SummaryOutcome, BackendError> {
        let form = Form::new().part("pdf", pdf_part(pdf, filename)?);

        let started = Instant::now();
        tracing::info!(filename, "requesting multi-agent summary");
        let body = self.post_multipart("multi-agent-summarize", form).await?;
        tracing::info!(
            filename,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "multi-agent summary received"
        );
        Ok(parse_summary_response(&body, "ma_filename"))
    }

    /// Registers the PDF with the backend's question-answering index.
    pub async fn prepare_qa(
        &self,
        pdf: Vec<u8>,
        filename: &str,
        paper_id: &str,
    ) -> Result<QaReadyResponse, BackendError> {
        let form = Form::new()
            .part("file", pdf_part(pdf, filename)?)
            .text("paper_id", paper_id.to_string());

        let body = self.post_multipart("upload_pdf_for_qa", form).await?;
        serde_json::from_value(body).map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }

    /// Asks a question about a paper. Returns `None` when the backend
    /// answered successfully but without an `answer` field.
    pub async fn ask(
        &self,
        session_id: &str,
        paper_id: &str,
        question: &str,
    ) -> Result<Option<String>, BackendError> {
        let url = self.base.join("ask")?;
        let response = self
            .http
            .post(url)
            .form(&[
                ("session_id", session_id),
                ("paper_id", paper_id),
                ("question", question),
            ])
            .send()
            .await?;

        let body = read_json(response).await?;
        Ok(body
            .get("answer")
            .and_then(Value::as_str)
            .filter(|a| !a.trim().is_empty())
            .map(str::to_string))
    }

    async fn post_multipart(&self, endpoint: &str, form: Form) -> Result<Value, BackendError> {
        let url = self.base.join(endpoint)?;
        let response = self.http.post(url).multipart(form).send().await?;
        read_json(response).await
    }
}

fn pdf_part(pdf: Vec<u8>, filename: &str) -> Result<Part, BackendError> {
    Ok(Part::bytes(pdf)
        .file_name(filename.to_string())
        .mime_str("application/pdf")?)
}

async fn read_json(response: reqwest::Response) -> Result<Value, BackendError> {
    let status = response.status();
    let text = response.text().await?;
    let body: Option<Value> = serde_json::from_str(&text).ok();

    if !status.is_success() {
        let message = body
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| truncate(&text, 200));
        return Err(BackendError::Status {
            status: status.as_u16(),
            message,
        });
    }

    body.ok_or_else(|| BackendError::InvalidResponse(format!("not JSON: {}", truncate(&text, 200))))
}

/// Extracts the human-readable failure message from an error body. The
/// backend reports failures either as `{"error": ...}` or, for summaries,
/// as `{"summary": "Error: ..."}`.
pub fn error_message(body: &Value) -> Option<String> {
    body.get("error")
        .or_else(|| body.get("detail"))
        .or_else(|| body.get("summary"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Reads a summarization response. Highlights are validated here; every
/// other field is optional.
pub fn parse_summary_response(body: &Value, filename_key: &str) -> SummaryOutcome {
    let text = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    };

    let sections = match body.get("sections") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| serde_json::from_value::<SectionSummary>(item.clone()).ok())
            .collect(),
        _ => Vec::new(),
    };

    SummaryOutcome {
        summary: text("summary"),
        paper_id: text("paper_id"),
        filename: text(filename_key),
        sections,
        highlights: ingest_highlights(body.get("highlights")),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}...", s.chars().take(max_chars).collect::<String>())
    } else {
        s.to_string()
    }
}
