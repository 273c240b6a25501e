//! Data models for the paper summarizer.
//!
//! Paper records, chat transcripts, backend responses and the shapes
//! returned by the JSON API.

use crate::highlight::{HighlightFragment, MarkedPiece};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Summaries
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SummaryType {
    #[default]
    Short,
    Detailed,
}

impl SummaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryType::Short => "short",
            SummaryType::Detailed => "detailed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "short" => Some(SummaryType::Short),
            "detailed" => Some(SummaryType::Detailed),
            _ => None,
        }
    }
}

impl std::fmt::Display for SummaryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SummaryMode {
    /// One-shot summary from `/summarize`.
    Single(SummaryType),
    /// Section-by-section summary from `/multi-agent-summarize`.
    MultiAgent,
}

impl SummaryMode {
    pub fn label(&self) -> String {
        match self {
            SummaryMode::Single(t) => format!("{} summary", t),
            SummaryMode::MultiAgent => "multi-agent summary".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionSummary {
    pub section: String,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QaStatus {
    Pending,
    Ready,
    Failed,
}

impl QaStatus {
    pub fn message(&self) -> &'static str {
        match self {
            QaStatus::Pending => "Preparing the paper for questions...",
            QaStatus::Ready => "Ready for questions.",
            QaStatus::Failed => "Failed to prepare the paper for questions.",
        }
    }
}

/// Everything known about one uploaded paper.
///
/// Stored as a single value, so replacing a record swaps summary and
/// highlights together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperRecord {
    pub paper_id: String,
    pub filename: String,
    /// File name under the PDF directory.
    pub stored_pdf: String,
    pub pdf_sha256: String,
    pub mode: SummaryMode,
    pub summary: String,
    #[serde(default)]
    pub sections: Vec<SectionSummary>,
    #[serde(default)]
    pub highlights: Vec<HighlightFragment>,
    pub qa_status: QaStatus,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

// ============================================================================
// Backend Responses
// ============================================================================

/// Parsed result of a summarization call, after highlight validation.
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub summary: Option<String>,
    pub paper_id: Option<String>,
    pub filename: Option<String>,
    pub sections: Vec<SectionSummary>,
    pub highlights: Vec<HighlightFragment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QaReadyResponse {
    pub status: Option<String>,
    pub paper_id: Option<String>,
    pub chunks: Option<u64>,
}

// ============================================================================
// Chat History
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChatSession {
    pub filename: String,
    pub conversation: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub paper_id: String,
    pub label: String,
    pub messages: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryGroup {
    pub filename: String,
    pub sessions: Vec<HistoryEntry>,
}

// ============================================================================
// API Shapes
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedMessage {
    pub role: ChatRole,
    pub content: String,
    pub content_html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub conversation: Vec<RenderedMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedSegment {
    pub pieces: Vec<MarkedPiece>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedPage {
    pub page: u32,
    pub segments: Vec<RenderedSegment>,
}
