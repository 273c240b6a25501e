//! Per-page text extraction for the highlighted text layer.
//!
//! Extraction runs on a blocking thread and is cached in sled keyed by the
//! PDF's SHA-256, so each distinct upload is parsed once.

use crate::highlight::TextSegment;
use std::path::Path;
use thiserror::Error;

const PAGE_TEXT_TREE: &str = "page_text";

#[derive(Debug, Error)]
pub enum PdfTextError {
    #[error("PDF file not found: {0}")]
    MissingFile(String),

    #[error("cannot read PDF: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf-extract failed: {0}")]
    Extract(String),

    #[error("cache error: {0}")]
    Cache(#[from] sled::Error),

    #[error("extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Extract text from a PDF in memory, one string per page.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, PdfTextError> {
    pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| PdfTextError::Extract(e.to_string()))
}

/// Splits extracted pages into text-layer segments: one per non-blank line,
/// pages numbered from 1. Lines keep their inner whitespace; only the line
/// terminator is removed.
pub fn segment_pages(pages: &[String]) -> Vec<Vec<TextSegment>> {
    pages
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let page = (i + 1) as u32;
            text.lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| TextSegment::new(page, line))
                .collect()
        })
        .collect()
}

/// A cache read that fails for any reason is logged and treated as a miss.
fn load_cached(db: &sled::Db, sha: &str) -> Option<Vec<String>> {
    let data = match db
        .open_tree(PAGE_TEXT_TREE)
        .and_then(|tree| tree.get(sha.as_bytes()))
    {
        Ok(data) => data?,
        Err(e) => {
            tracing::warn!(sha, error = %e, "cannot read page text cache");
            return None;
        }
    };
    match serde_json::from_slice(&data) {
        Ok(pages) => Some(pages),
        Err(e) => {
            tracing::warn!(sha, error = %e, "undecodable page text cache entry, extracting again");
            None
        }
    }
}

fn save_cached(db: &sled::Db, sha: &str, pages: &[String]) -> Result<(), PdfTextError> {
    let tree = db.open_tree(PAGE_TEXT_TREE)?;
    match serde_json::to_vec(pages) {
        Ok(json) => {
            tree.insert(sha.as_bytes(), json)?;
        }
        Err(e) => tracing::warn!(error = %e, "cannot serialize page text for cache"),
    }
    Ok(())
}

/// Returns the per-page text of the PDF at `path`, using the cache when the
/// hash is known.
pub async fn page_text(db: &sled::Db, path: &Path, sha: &str) -> Result<Vec<String>, PdfTextError> {
    if let Some(pages) = load_cached(db, sha) {
        tracing::debug!(sha, pages = pages.len(), "page text cache hit");
        return Ok(pages);
    }

    if !path.exists() {
        return Err(PdfTextError::MissingFile(path.display().to_string()));
    }

    let bytes = tokio::fs::read(path).await?;
    let pages = tokio::task::spawn_blocking(move || extract_pages(&bytes)).await??;
    tracing::info!(sha, pages = pages.len(), "extracted page text");

    save_cached(db, sha, &pages)?;
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_pages_numbering_and_blank_lines() {
        let pages = vec![
            "Title Line\n\n  \nAbstract text here\n".to_string(),
            String::new(),
            "Results\r\nTable 1".to_string(),
        ];
        let segments = segment_pages(&pages);
        assert_eq!(segments.len(), 3);
        assert_eq!(
            segments[0],
            vec![
                TextSegment::new(1, "Title Line"),
                TextSegment::new(1, "Abstract text here"),
            ]
        );
        assert!(segments[1].is_empty());
        assert_eq!(
            segments[2],
            vec![TextSegment::new(3, "Results"), TextSegment::new(3, "Table 1")]
        );
    }

    #[tokio::test]
    async fn test_page_text_uses_cache() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        let pages = vec!["cached page".to_string()];
        save_cached(&db, "abc", &pages).unwrap();

        let got = page_text(&db, Path::new("/nonexistent/file.pdf"), "abc")
            .await
            .unwrap();
        assert_eq!(got, pages);
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_is_a_miss() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        db.open_tree(PAGE_TEXT_TREE)
            .unwrap()
            .insert("bad".as_bytes(), b"not json".to_vec())
            .unwrap();
        assert!(load_cached(&db, "bad").is_none());

        let err = page_text(&db, Path::new("/nonexistent/file.pdf"), "bad")
            .await
            .unwrap_err();
        assert!(matches!(err, PdfTextError::MissingFile(_)));
    }

    #[tokio::test]
    async fn test_page_text_missing_file() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        let err = page_text(&db, Path::new("/nonexistent/file.pdf"), "def")
            .await
            .unwrap_err();
        assert!(matches!(err, PdfTextError::MissingFile(_)));
    }
}
