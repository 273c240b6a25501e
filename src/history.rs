//! Chat transcripts, one per paper, persisted in sled.

use crate::models::{ChatMessage, ChatSession, HistoryEntry, HistoryGroup};
use crate::store::{StoreError, PAPERS_TREE};
use sled::transaction::{ConflictableTransactionError, ConflictableTransactionResult, TransactionError};
use sled::Transactional;
use std::collections::BTreeMap;

const HISTORY_TREE: &str = "chat_history";
const UNTITLED: &str = "Untitled";

#[derive(Clone)]
pub struct ChatHistory {
    tree: sled::Tree,
    /// Paper records; a transcript is only written while its paper exists.
    papers: sled::Tree,
}

impl ChatHistory {
    pub fn new(db: &sled::Db) -> Result<Self, StoreError> {
        Ok(Self {
            tree: db.open_tree(HISTORY_TREE)?,
            papers: db.open_tree(PAPERS_TREE)?,
        })
    }

    pub fn load(&self, paper_id: &str) -> Result<Option<ChatSession>, StoreError> {
        match self.tree.get(paper_id.as_bytes())? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    /// Appends messages to the paper's transcript in one transaction with a
    /// check that the paper still exists.
    ///
    /// Returns the updated transcript, or `None` when the paper was deleted
    /// (nothing is written then). Empty transcripts are never written.
    pub fn append(
        &self,
        paper_id: &str,
        filename: &str,
        messages: &[ChatMessage],
    ) -> Result<Option<ChatSession>, StoreError> {
        let key = paper_id.as_bytes();
        let result = (&self.papers, &self.tree).transaction(
            |(papers, history)| -> ConflictableTransactionResult<Option<ChatSession>, serde_json::Error> {
                if papers.get(key)?.is_none() {
                    return Ok(None);
                }
                let mut session = match history.get(key)? {
                    Some(data) => serde_json::from_slice::<ChatSession>(&data)
                        .map_err(ConflictableTransactionError::Abort)?,
                    None => ChatSession::default(),
                };
                session.filename = filename.to_string();
                session.conversation.extend(messages.iter().cloned());
                if !session.conversation.is_empty() {
                    let json =
                        serde_json::to_vec(&session).map_err(ConflictableTransactionError::Abort)?;
                    history.insert(key, json)?;
                }
                Ok(Some(session))
            },
        );

        match result {
            Ok(session) => Ok(session),
            Err(TransactionError::Abort(e)) => Err(e.into()),
            Err(TransactionError::Storage(e)) => Err(e.into()),
        }
    }

    pub fn delete(&self, paper_id: &str) -> Result<bool, StoreError> {
        Ok(self.tree.remove(paper_id.as_bytes())?.is_some())
    }

    /// Transcripts grouped by file name, groups sorted by name.
    pub fn grouped(&self) -> Result<Vec<HistoryGroup>, StoreError> {
        let mut groups: BTreeMap<String, Vec<HistoryEntry>> = BTreeMap::new();

        for item in self.tree.iter() {
            let (key, value) = item?;
            let paper_id = String::from_utf8_lossy(&key).into_owned();
            let session: ChatSession = match serde_json::from_slice(&value) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(%paper_id, error = %e, "skipping undecodable chat transcript");
                    continue;
                }
            };

            let filename = if session.filename.trim().is_empty() {
                UNTITLED.to_string()
            } else {
                session.filename.clone()
            };

            groups.entry(filename).or_default().push(HistoryEntry {
                label: session_label(&paper_id),
                messages: session.conversation.len(),
                paper_id,
            });
        }

        Ok(groups
            .into_iter()
            .map(|(filename, sessions)| HistoryGroup { filename, sessions })
            .collect())
    }
}

/// Sidebar label for a transcript: "Chat" plus the first six id characters.
pub fn session_label(paper_id: &str) -> String {
    let short: String = paper_id.chars().take(6).collect();
    if paper_id.chars().count() > 6 {
        format!("Chat {}…", short)
    } else {
        format!("Chat {}", short)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatMessage;

    fn history() -> (ChatHistory, sled::Db) {
        let db = sled::Config::new().temporary(true).open().unwrap();
        (ChatHistory::new(&db).unwrap(), db)
    }

    /// The transcript only needs the paper key to exist.
    fn add_paper(db: &sled::Db, paper_id: &str) {
        db.open_tree(PAPERS_TREE)
            .unwrap()
            .insert(paper_id.as_bytes(), b"{}".to_vec())
            .unwrap();
    }

    fn questions(count: usize) -> Vec<ChatMessage> {
        (0..count)
            .map(|i| ChatMessage::user(format!("question {}", i)))
            .collect()
    }

    #[test]
    fn test_empty_conversation_not_saved() {
        let (h, db) = history();
        add_paper(&db, "p1");
        let session = h.append("p1", "a.pdf", &[]).unwrap().unwrap();
        assert!(session.conversation.is_empty());
        assert!(h.load("p1").unwrap().is_none());
    }

    #[test]
    fn test_append_load_delete() {
        let (h, db) = history();
        add_paper(&db, "p1");
        let exchange = vec![
            ChatMessage::user("What is the main result?"),
            ChatMessage::assistant("A **faster** model."),
        ];
        let saved = h.append("p1", "a.pdf", &exchange).unwrap().unwrap();
        assert_eq!(saved.conversation, exchange);
        assert_eq!(h.load("p1").unwrap(), Some(saved));
        assert!(h.delete("p1").unwrap());
        assert!(!h.delete("p1").unwrap());
        assert!(h.load("p1").unwrap().is_none());
    }

    #[test]
    fn test_append_extends_existing_transcript() {
        let (h, db) = history();
        add_paper(&db, "p1");
        h.append("p1", "a.pdf", &[ChatMessage::user("first"), ChatMessage::assistant("one")])
            .unwrap();
        h.append("p1", "a.pdf", &[ChatMessage::user("second"), ChatMessage::assistant("two")])
            .unwrap();

        let contents: Vec<String> = h
            .load("p1")
            .unwrap()
            .unwrap()
            .conversation
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["first", "one", "second", "two"]);
    }

    #[test]
    fn test_append_for_deleted_paper_writes_nothing() {
        let (h, _db) = history();
        let result = h
            .append("gone", "a.pdf", &[ChatMessage::user("q"), ChatMessage::assistant("late")])
            .unwrap();
        assert!(result.is_none());
        assert!(h.load("gone").unwrap().is_none());
        assert!(h.grouped().unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_appends_keep_every_exchange() {
        let (h, db) = history();
        add_paper(&db, "p1");
        let workers: Vec<_> = (0..4)
            .map(|i| {
                let h = h.clone();
                std::thread::spawn(move || {
                    for j in 0..5 {
                        h.append("p1", "a.pdf", &[ChatMessage::user(format!("{}-{}", i, j))])
                            .unwrap();
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }
        assert_eq!(h.load("p1").unwrap().unwrap().conversation.len(), 20);
    }

    #[test]
    fn test_grouped_by_filename() {
        let (h, db) = history();
        for (id, name, count) in [
            ("abcdef123", "b.pdf", 2),
            ("zzz", "a.pdf", 1),
            ("x1", "b.pdf", 3),
            ("nameless", "  ", 1),
        ] {
            add_paper(&db, id);
            h.append(id, name, &questions(count)).unwrap();
        }

        let groups = h.grouped().unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g.filename.as_str()).collect();
        assert_eq!(names, vec!["Untitled", "a.pdf", "b.pdf"]);

        let b = &groups[2];
        assert_eq!(b.sessions.len(), 2);
        let labels: Vec<&str> = b.sessions.iter().map(|s| s.label.as_str()).collect();
        assert!(labels.contains(&"Chat abcdef…"));
        assert!(labels.contains(&"Chat x1"));
    }

    #[test]
    fn test_session_label() {
        assert_eq!(session_label("0b9e6c1e-aaaa"), "Chat 0b9e6c…");
        assert_eq!(session_label("short"), "Chat short");
    }
}
