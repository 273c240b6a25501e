//! Paper records and uploaded PDFs.
//!
//! Records live in the `papers` sled tree as JSON. PDFs are written to the
//! PDF directory as `<paper_id>.pdf`.

use crate::models::{PaperRecord, QaStatus};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub(crate) const PAPERS_TREE: &str = "papers";
const MAX_ID_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid paper id '{0}'")]
    InvalidId(String),

    #[error("path escapes the PDF directory")]
    PathEscape,
}

#[derive(Clone)]
pub struct PaperStore {
    db: sled::Db,
    papers: sled::Tree,
    pdfs_dir: PathBuf,
}

impl PaperStore {
    pub fn new(db: sled::Db, pdfs_dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&pdfs_dir)?;
        let papers = db.open_tree(PAPERS_TREE)?;
        Ok(Self {
            db,
            papers,
            pdfs_dir,
        })
    }

    pub fn db(&self) -> &sled::Db {
        &self.db
    }

    pub fn pdfs_dir(&self) -> &Path {
        &self.pdfs_dir
    }

    // ------------------------------------------------------------------------
    // PDFs
    // ------------------------------------------------------------------------

    /// Writes the uploaded bytes and returns `(stored file name, sha256)`.
    pub fn save_pdf(&self, paper_id: &str, bytes: &[u8]) -> Result<(String, String), StoreError> {
        let stored = pdf_file_name(paper_id)?;
        let path = validate_path_within(&self.pdfs_dir, &self.pdfs_dir.join(&stored))?;
        fs::write(&path, bytes)?;
        tracing::debug!(paper_id, bytes = bytes.len(), "stored PDF");
        Ok((stored, sha256_hex(bytes)))
    }

    pub fn pdf_path(&self, record: &PaperRecord) -> Result<PathBuf, StoreError> {
        validate_path_within(&self.pdfs_dir, &self.pdfs_dir.join(&record.stored_pdf))
    }

    pub fn read_pdf(&self, record: &PaperRecord) -> Result<Vec<u8>, StoreError> {
        Ok(fs::read(self.pdf_path(record)?)?)
    }

    /// Removes a stored PDF. A file that is already gone is not an error.
    pub fn remove_pdf(&self, stored_pdf: &str) -> Result<(), StoreError> {
        let path = validate_path_within(&self.pdfs_dir, &self.pdfs_dir.join(stored_pdf))?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Passes `result` through, removing the stored PDF first when it is an
    /// error, so a failed record write leaves no orphaned file.
    pub fn discard_pdf_on_error<T>(
        &self,
        stored_pdf: &str,
        result: Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        if result.is_err() {
            if let Err(e) = self.remove_pdf(stored_pdf) {
                tracing::warn!(stored_pdf, error = %e, "cannot remove orphaned PDF");
            }
        }
        result
    }

    // ------------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------------

    pub fn get(&self, paper_id: &str) -> Result<Option<PaperRecord>, StoreError> {
        match self.papers.get(paper_id.as_bytes())? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    /// Inserts or replaces the whole record.
    pub fn put(&self, record: &PaperRecord) -> Result<(), StoreError> {
        let json = serde_json::to_vec(record)?;
        self.papers.insert(record.paper_id.as_bytes(), json)?;
        Ok(())
    }

    /// Updates only the Q&A status, leaving the rest of the record (possibly
    /// replaced in the meantime) untouched. Returns false if the paper is gone.
    pub fn set_qa_status(&self, paper_id: &str, status: QaStatus) -> Result<bool, StoreError> {
        let updated = self.papers.update_and_fetch(paper_id.as_bytes(), |old| {
            let old = old?;
            match serde_json::from_slice::<PaperRecord>(old) {
                Ok(mut record) => {
                    record.qa_status = status;
                    serde_json::to_vec(&record).ok().or_else(|| Some(old.to_vec()))
                }
                Err(_) => Some(old.to_vec()),
            }
        })?;
        Ok(updated.is_some())
    }

    /// All records, newest first. Undecodable entries are skipped.
    pub fn list(&self) -> Result<Vec<PaperRecord>, StoreError> {
        let mut records = Vec::new();
        for item in self.papers.iter() {
            let (key, value) = item?;
            match serde_json::from_slice::<PaperRecord>(&value) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(
                    key = %String::from_utf8_lossy(&key),
                    error = %e,
                    "skipping undecodable paper record"
                ),
            }
        }
        records.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(records)
    }

    /// Deletes the record and its PDF. Returns the removed record, if any.
    pub fn delete(&self, paper_id: &str) -> Result<Option<PaperRecord>, StoreError> {
        let removed = match self.papers.remove(paper_id.as_bytes())? {
            Some(data) => serde_json::from_slice::<PaperRecord>(&data)?,
            None => return Ok(None),
        };
        self.remove_pdf(&removed.stored_pdf)?;
        tracing::info!(paper_id, "deleted paper");
        Ok(Some(removed))
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Random id for papers the backend did not assign one to.
pub fn generate_paper_id() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(24)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

/// Accepts backend-assigned ids (UUIDs and similar): alphanumerics, hyphen
/// and underscore only.
pub fn is_valid_paper_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
}

fn pdf_file_name(paper_id: &str) -> Result<String, StoreError> {
    if !is_valid_paper_id(paper_id) {
        return Err(StoreError::InvalidId(paper_id.to_string()));
    }
    Ok(format!("{}.pdf", paper_id))
}

/// Validate that a constructed path stays within the given base directory.
/// For files that don't exist yet, the parent directory is checked instead.
pub fn validate_path_within(base: &Path, target: &Path) -> Result<PathBuf, StoreError> {
    let canonical_base = fs::canonicalize(base)?;

    if target.exists() {
        let canonical = fs::canonicalize(target)?;
        if canonical.starts_with(&canonical_base) {
            Ok(canonical)
        } else {
            Err(StoreError::PathEscape)
        }
    } else {
        let parent = target.parent().ok_or(StoreError::PathEscape)?;
        let canonical_parent = fs::canonicalize(parent)?;
        if canonical_parent.starts_with(&canonical_base) {
            Ok(target.to_path_buf())
        } else {
            Err(StoreError::PathEscape)
        }
    }
}
