//! Highlight matching for the PDF text layer.
//!
//! The summarization backend returns a list of highlight fragments (a page
//! number plus a text chunk it considers salient). While a page's text layer
//! is rendered, every line is checked against that list and, when a fragment
//! applies, split into emphasized and plain pieces.
//!
//! Both operations are pure. Callers capture the fragment list once per
//! render pass and hand the same slice to every segment.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[cfg(test)]
#[path = "highlight_test.rs"]
mod highlight_test;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HighlightError {
    #[error("page must be a positive integer")]
    InvalidPage,
    #[error("highlight text is empty")]
    EmptyText,
}

// ============================================================================
// Data Model
// ============================================================================

/// A salient text chunk on a given page, as identified by the backend.
///
/// Construction validates the fragment, so every value of this type has a
/// 1-indexed page and non-blank text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFragment")]
pub struct HighlightFragment {
    page: u32,
    matched_text: String,
}

#[derive(Deserialize)]
struct RawFragment {
    page: u32,
    matched_text: String,
}

impl TryFrom<RawFragment> for HighlightFragment {
    type Error = HighlightError;

    fn try_from(raw: RawFragment) -> Result<Self, Self::Error> {
        HighlightFragment::new(raw.page, raw.matched_text)
    }
}

impl HighlightFragment {
    pub fn new(page: u32, matched_text: impl Into<String>) -> Result<Self, HighlightError> {
        let matched_text = matched_text.into();
        if page == 0 {
            return Err(HighlightError::InvalidPage);
        }
        if matched_text.trim().is_empty() {
            return Err(HighlightError::EmptyText);
        }
        Ok(Self { page, matched_text })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn matched_text(&self) -> &str {
        &self.matched_text
    }
}

/// One rendered unit of page text (a line of the text layer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    pub page: u32,
    pub content: String,
}

impl TextSegment {
    pub fn new(page: u32, content: impl Into<String>) -> Self {
        Self {
            page,
            content: content.into(),
        }
    }
}

/// A slice of segment content, tagged with whether it is a highlighted match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkedPiece {
    pub text: String,
    pub emphasized: bool,
}

impl MarkedPiece {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            emphasized: false,
        }
    }

    fn marked(text: &str) -> Self {
        Self {
            text: text.to_string(),
            emphasized: true,
        }
    }
}

// ============================================================================
// Matching
// ============================================================================

/// Case-insensitive literal pattern for a fragment's text. Both matching and
/// splitting go through this, so they agree on what "ignoring case" means.
fn fragment_pattern(fragment: &HighlightFragment) -> Option<Regex> {
    match RegexBuilder::new(&regex::escape(&fragment.matched_text))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::error!(page = fragment.page, error = %e, "cannot build highlight pattern");
            None
        }
    }
}

/// Returns the first fragment (in input order) that lives on the segment's
/// page and whose text occurs in the segment, ignoring case.
pub fn find_match<'a>(
    segment: &TextSegment,
    fragments: &'a [HighlightFragment],
) -> Option<&'a HighlightFragment> {
    fragments.iter().find(|f| {
        f.page == segment.page
            && fragment_pattern(f).is_some_and(|re| re.is_match(&segment.content))
    })
}

/// Splits the segment around every case-insensitive occurrence of the
/// fragment text. Concatenating the returned pieces yields the original
/// content byte for byte.
///
/// The fragment must match the segment (see [`find_match`]).
pub fn render_marked(segment: &TextSegment, fragment: &HighlightFragment) -> Vec<MarkedPiece> {
    let content = segment.content.as_str();

    let Some(pattern) = fragment_pattern(fragment) else {
        return vec![MarkedPiece::plain(content)];
    };

    let mut pieces = Vec::new();
    let mut last = 0;
    for m in pattern.find_iter(content) {
        if m.start() > last {
            pieces.push(MarkedPiece::plain(&content[last..m.start()]));
        }
        pieces.push(MarkedPiece::marked(m.as_str()));
        last = m.end();
    }

    if pieces.is_empty() {
        debug_assert!(
            false,
            "render_marked called with a fragment that does not match the segment"
        );
        tracing::error!(
            page = segment.page,
            fragment_page = fragment.page,
            "highlight fragment does not occur in segment"
        );
        return vec![MarkedPiece::plain(content)];
    }

    if last < content.len() {
        pieces.push(MarkedPiece::plain(&content[last..]));
    }

    pieces
}

/// Convenience wrapper used by the page renderer: matches the segment and
/// returns its pieces, or the whole content as one plain piece.
pub fn mark_segment(segment: &TextSegment, fragments: &[HighlightFragment]) -> Vec<MarkedPiece> {
    match find_match(segment, fragments) {
        Some(fragment) => render_marked(segment, fragment),
        None => vec![MarkedPiece::plain(&segment.content)],
    }
}

// ============================================================================
// Ingestion
// ============================================================================

/// Reads the `highlights` field of a backend response.
///
/// A missing or null field is an empty list. Entries with a missing,
/// non-integer or non-positive `page`, or a blank `matched_chunk`, are
/// dropped with a warning; the rest keep their original order.
pub fn ingest_highlights(highlights: Option<&Value>) -> Vec<HighlightFragment> {
    let entries = match highlights {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            tracing::warn!(kind = json_kind(other), "highlights is not an array, ignoring");
            return Vec::new();
        }
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match parse_entry(entry) {
            Ok(fragment) => Some(fragment),
            Err(e) => {
                tracing::warn!(index, error = %e, "dropping highlight");
                None
            }
        })
        .collect()
}

fn parse_entry(entry: &Value) -> Result<HighlightFragment, HighlightError> {
    let page = entry
        .get("page")
        .and_then(Value::as_u64)
        .and_then(|p| u32::try_from(p).ok())
        .ok_or(HighlightError::InvalidPage)?;
    let text = entry
        .get("matched_chunk")
        .and_then(Value::as_str)
        .ok_or(HighlightError::EmptyText)?;
    HighlightFragment::new(page, text)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
