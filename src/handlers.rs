//! HTTP route handlers for the web application.
//!
//! Page handlers render HTML and report failures as an error page; the
//! `/api` handlers speak JSON through [`AppError`].

use crate::error::{AppError, AppResult};
use crate::models::{
    AskRequest, AskResponse, ChatMessage, HistoryGroup, PaperRecord, QaStatus,
    RenderedPage, SummaryMode, SummaryOutcome, SummaryType,
};
use crate::pdf_text::{page_text, segment_pages};
use crate::render::{render_message, render_pages};
use crate::store::{generate_paper_id, is_valid_paper_id};
use crate::templates::{base_html, render_index, render_multi_agent, render_paper};
use crate::AppState;
use axum::{
    extract::{Multipart, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

const NO_SUMMARY: &str = "No summary returned.";
const NO_ANSWER: &str = "Error generating answer";
const ANSWER_FAILED: &str = "Failed to get answer";

// ============================================================================
// Index
// ============================================================================

pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    let page = || -> AppResult<String> {
        let papers = state.store.list()?;
        let history = state.history.grouped()?;
        Ok(render_index(&papers, &history))
    };
    match page() {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_page(e),
    }
}

pub async fn multi_agent_page(State(state): State<Arc<AppState>>) -> Response {
    match state.history.grouped() {
        Ok(history) => Html(render_multi_agent(&history)).into_response(),
        Err(e) => error_page(e.into()),
    }
}

// ============================================================================
// Upload and Summarize
// ============================================================================

struct Upload {
    filename: String,
    bytes: Vec<u8>,
    summary_type: SummaryType,
}

async fn read_upload(mut multipart: Multipart) -> AppResult<Upload> {
    let mut filename = String::new();
    let mut bytes = Vec::new();
    let mut summary_type = SummaryType::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed upload: {}", e)))?
    {
        match field.name() {
            Some("pdf") | Some("file") => {
                filename = field.file_name().unwrap_or("document.pdf").to_string();
                bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?
                    .to_vec();
            }
            Some("summary_type") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read form: {}", e)))?;
                summary_type = SummaryType::parse(&raw).ok_or_else(|| {
                    AppError::BadRequest(format!("Unknown summary type '{}'", raw))
                })?;
            }
            _ => {}
        }
    }

    if bytes.is_empty() {
        return Err(AppError::BadRequest("Please upload a PDF".to_string()));
    }
    if !bytes.starts_with(b"%PDF") {
        return Err(AppError::BadRequest(
            "The uploaded file is not a PDF".to_string(),
        ));
    }

    Ok(Upload {
        filename,
        bytes,
        summary_type,
    })
}

pub async fn summarize(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    match summarize_upload(state, multipart, false).await {
        Ok(paper_id) => Redirect::to(&format!("/paper/{}", paper_id)).into_response(),
        Err(e) => error_page(e),
    }
}

pub async fn multi_agent_summarize(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Response {
    match summarize_upload(state, multipart, true).await {
        Ok(paper_id) => Redirect::to(&format!("/paper/{}", paper_id)).into_response(),
        Err(e) => error_page(e),
    }
}

async fn summarize_upload(
    state: Arc<AppState>,
    multipart: Multipart,
    multi_agent: bool,
) -> AppResult<String> {
    let upload = read_upload(multipart).await?;
    tracing::info!(
        filename = %upload.filename,
        bytes = upload.bytes.len(),
        multi_agent,
        "received PDF"
    );

    let (mode, outcome) = if multi_agent {
        let outcome = state
            .client
            .multi_agent_summarize(upload.bytes.clone(), &upload.filename)
            .await?;
        (SummaryMode::MultiAgent, outcome)
    } else {
        let outcome = state
            .client
            .summarize(upload.bytes.clone(), &upload.filename, upload.summary_type)
            .await?;
        (SummaryMode::Single(upload.summary_type), outcome)
    };

    let paper_id = match outcome.paper_id.as_deref() {
        Some(id) if is_valid_paper_id(id) => id.to_string(),
        Some(id) => {
            tracing::warn!(backend_id = id, "backend paper id unusable, generating one");
            generate_paper_id()
        }
        None => generate_paper_id(),
    };

    let (stored_pdf, pdf_sha256) = state.store.save_pdf(&paper_id, &upload.bytes)?;
    let filename = outcome
        .filename
        .clone()
        .unwrap_or_else(|| upload.filename.clone());
    let now = Utc::now();

    let record = PaperRecord {
        paper_id: paper_id.clone(),
        filename: filename.clone(),
        stored_pdf,
        pdf_sha256,
        mode,
        summary: String::new(),
        sections: Vec::new(),
        highlights: Vec::new(),
        qa_status: QaStatus::Pending,
        created: now,
        updated: now,
    };
    let record = apply_outcome(record, outcome);
    tracing::info!(
        %paper_id,
        highlights = record.highlights.len(),
        sections = record.sections.len(),
        "summary stored"
    );
    state
        .store
        .discard_pdf_on_error(&record.stored_pdf, state.store.put(&record))?;

    tokio::spawn(prepare_qa(state.clone(), paper_id.clone(), filename, upload.bytes));

    Ok(paper_id)
}

/// Replaces summary, sections and highlights with a fresh backend result.
fn apply_outcome(mut record: PaperRecord, outcome: SummaryOutcome) -> PaperRecord {
    record.summary = outcome.summary.unwrap_or_else(|| NO_SUMMARY.to_string());
    record.sections = outcome.sections;
    record.highlights = outcome.highlights;
    record.updated = Utc::now();
    record
}

/// Registers the PDF with the backend's question-answering index and
/// records the outcome on the paper.
pub async fn prepare_qa(state: Arc<AppState>, paper_id: String, filename: String, pdf: Vec<u8>) {
    let status = match state.client.prepare_qa(pdf, &filename, &paper_id).await {
        Ok(ready) => {
            tracing::info!(
                %paper_id,
                chunks = ready.chunks.unwrap_or(0),
                status = ready.status.as_deref().unwrap_or("ok"),
                "paper ready for questions"
            );
            QaStatus::Ready
        }
        Err(e) => {
            tracing::warn!(%paper_id, error = %e, "failed to prepare paper for questions");
            QaStatus::Failed
        }
    };

    match state.store.set_qa_status(&paper_id, status) {
        Ok(true) => {}
        Ok(false) => tracing::debug!(%paper_id, "paper deleted before Q&A preparation finished"),
        Err(e) => tracing::error!(%paper_id, error = %e, "cannot record Q&A status"),
    }
}

#[derive(Deserialize)]
pub struct ResummarizeForm {
    pub summary_type: Option<String>,
}

pub async fn resummarize(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Form(form): Form<ResummarizeForm>,
) -> Response {
    match resummarize_paper(state, &id, form).await {
        Ok(()) => Redirect::to(&format!("/paper/{}", id)).into_response(),
        Err(e) => error_page(e),
    }
}

async fn resummarize_paper(state: Arc<AppState>, id: &str, form: ResummarizeForm) -> AppResult<()> {
    let record = state.store.get(id)?.ok_or(AppError::NotFound("paper"))?;
    let pdf = state.store.read_pdf(&record)?;

    let (mode, outcome) = match record.mode {
        SummaryMode::MultiAgent => (
            SummaryMode::MultiAgent,
            state
                .client
                .multi_agent_summarize(pdf.clone(), &record.filename)
                .await?,
        ),
        SummaryMode::Single(previous) => {
            let summary_type = match form.summary_type.as_deref() {
                Some(raw) => SummaryType::parse(raw).ok_or_else(|| {
                    AppError::BadRequest(format!("Unknown summary type '{}'", raw))
                })?,
                None => previous,
            };
            (
                SummaryMode::Single(summary_type),
                state
                    .client
                    .summarize(pdf.clone(), &record.filename, summary_type)
                    .await?,
            )
        }
    };

    let retry_qa = record.qa_status == QaStatus::Failed;
    let mut record = apply_outcome(record, outcome);
    record.mode = mode;
    if retry_qa {
        record.qa_status = QaStatus::Pending;
    }
    state.store.put(&record)?;
    tracing::info!(paper_id = id, highlights = record.highlights.len(), "summary replaced");

    if retry_qa {
        tokio::spawn(prepare_qa(
            state.clone(),
            record.paper_id.clone(),
            record.filename.clone(),
            pdf,
        ));
    }
    Ok(())
}

// ============================================================================
// Paper View
// ============================================================================

pub async fn view_paper(Path(id): Path<String>, State(state): State<Arc<AppState>>) -> Response {
    // One load per request: the highlights below are this pass's snapshot.
    let record = match state.store.get(&id) {
        Ok(Some(r)) => r,
        Ok(None) => return error_page(AppError::NotFound("paper")),
        Err(e) => return error_page(e.into()),
    };

    let (pages, text_error) = match load_rendered_pages(&state, &record).await {
        Ok(pages) => (pages, None),
        Err(e) => {
            tracing::warn!(paper_id = %id, error = %e, "text layer unavailable");
            (Vec::new(), Some(e.to_string()))
        }
    };

    let conversation = match state.history.load(&id) {
        Ok(session) => session.map(|s| s.conversation).unwrap_or_default(),
        Err(e) => {
            tracing::warn!(paper_id = %id, error = %e, "cannot load chat history");
            Vec::new()
        }
    };
    let messages: Vec<_> = conversation.iter().map(render_message).collect();

    let history = state.history.grouped().unwrap_or_default();

    Html(render_paper(
        &record,
        &pages,
        text_error.as_deref(),
        &messages,
        &history,
    ))
    .into_response()
}

async fn load_rendered_pages(state: &AppState, record: &PaperRecord) -> AppResult<Vec<RenderedPage>> {
    let path = state.store.pdf_path(record)?;
    let pages = page_text(state.store.db(), &path, &record.pdf_sha256).await?;
    let segments = segment_pages(&pages);
    Ok(render_pages(&segments, &record.highlights))
}

pub async fn paper_pages(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<RenderedPage>>> {
    let record = state.store.get(&id)?.ok_or(AppError::NotFound("paper"))?;
    Ok(Json(load_rendered_pages(&state, &record).await?))
}

pub async fn delete_paper(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<serde_json::Value>> {
    state.store.delete(&id)?.ok_or(AppError::NotFound("paper"))?;
    state.history.delete(&id)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

// ============================================================================
// Chat
// ============================================================================

pub async fn ask(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<AskRequest>,
) -> AppResult<Json<AskResponse>> {
    if body.question.trim().is_empty() {
        return Err(AppError::BadRequest("Question cannot be empty".to_string()));
    }

    let record = state.store.get(&id)?.ok_or(AppError::NotFound("paper"))?;

    // The paper id doubles as the backend's conversation memory key.
    let answer = match state.client.ask(&id, &id, &body.question).await {
        Ok(Some(answer)) => answer,
        Ok(None) => NO_ANSWER.to_string(),
        Err(e) => {
            tracing::warn!(paper_id = %id, error = %e, "question failed");
            ANSWER_FAILED.to_string()
        }
    };

    // Appended in one step so concurrent questions and a deleted paper
    // are both seen at write time.
    let exchange = [
        ChatMessage::user(body.question.clone()),
        ChatMessage::assistant(answer.clone()),
    ];
    let session = match state.history.append(&id, &record.filename, &exchange)? {
        Some(session) => session,
        None => {
            tracing::info!(paper_id = %id, "paper deleted while answering, chat not saved");
            return Err(AppError::NotFound("paper"));
        }
    };
    tracing::debug!(paper_id = %id, messages = session.conversation.len(), "chat saved");

    Ok(Json(AskResponse {
        answer,
        conversation: session.conversation.iter().map(render_message).collect(),
    }))
}

// ============================================================================
// History
// ============================================================================

pub async fn history(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<HistoryGroup>>> {
    Ok(Json(state.history.grouped()?))
}

pub async fn delete_history(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<serde_json::Value>> {
    if !state.history.delete(&id)? {
        return Err(AppError::NotFound("chat history"));
    }
    Ok(Json(serde_json::json!({ "success": true })))
}

// ============================================================================
// Errors
// ============================================================================

fn error_page(err: AppError) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        tracing::error!(error = %err, "page request failed");
    } else {
        tracing::info!(error = %err, "page request rejected");
    }

    let heading = match &err {
        AppError::Backend(_) => "Failed to generate summary",
        AppError::NotFound(_) => "Not found",
        AppError::BadRequest(_) => "Invalid request",
        _ => "Something went wrong",
    };
    let body = format!(
        r#"<h1>{}</h1><p class="error-text">{}</p><p><a href="/">Back to upload</a></p>"#,
        heading,
        crate::render::html_escape(&err.to_string())
    );
    (status, Html(base_html(heading, &body))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::HighlightFragment;
    use axum::http::StatusCode;
    use crate::models::SectionSummary;

    fn record() -> PaperRecord {
        PaperRecord {
            paper_id: "p1".to_string(),
            filename: "a.pdf".to_string(),
            stored_pdf: "p1.pdf".to_string(),
            pdf_sha256: String::new(),
            mode: SummaryMode::MultiAgent,
            summary: "old".to_string(),
            sections: vec![SectionSummary {
                section: "Old".to_string(),
                summary: "old section".to_string(),
            }],
            highlights: vec![HighlightFragment::new(1, "old").unwrap()],
            qa_status: QaStatus::Ready,
            created: Utc::now(),
            updated: Utc::now(),
        }
    }

    #[test]
    fn test_apply_outcome_replaces_wholesale() {
        let outcome = SummaryOutcome {
            summary: None,
            paper_id: Some("ignored".to_string()),
            filename: None,
            sections: Vec::new(),
            highlights: vec![
                HighlightFragment::new(2, "new").unwrap(),
                HighlightFragment::new(3, "newer").unwrap(),
            ],
        };
        let updated = apply_outcome(record(), outcome);
        assert_eq!(updated.summary, NO_SUMMARY);
        assert!(updated.sections.is_empty());
        let pages: Vec<u32> = updated.highlights.iter().map(|h| h.page()).collect();
        assert_eq!(pages, vec![2, 3]);
        assert_eq!(updated.paper_id, "p1");
        assert_eq!(updated.qa_status, QaStatus::Ready);
    }

    #[test]
    fn test_error_page_status() {
        let response = error_page(AppError::NotFound("paper"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = error_page(AppError::BadRequest("Please upload a PDF".into()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
