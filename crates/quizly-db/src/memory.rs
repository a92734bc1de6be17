//! In-memory question database.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::{DbError, QuestionDb, QuestionRecord, StoredQuestion, entry_key};

/// In-memory [`QuestionDb`].
///
/// Entries are keyed by `basecourse/divid` and kept in key order.
#[derive(Debug, Default)]
pub struct MemoryQuestionDb {
    entries: RwLock<BTreeMap<String, StoredQuestion>>,
}

impl MemoryQuestionDb {
    /// Create an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a stored question.
    #[must_use]
    pub fn get(&self, basecourse: &str, divid: &str) -> Option<StoredQuestion> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&entry_key(basecourse, divid))
            .cloned()
    }

    /// Number of stored questions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all entries in key order.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, StoredQuestion> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl QuestionDb for MemoryQuestionDb {
    fn record_question(&self, record: &QuestionRecord) -> Result<(), DbError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(record.key())
            .or_default()
            .question = Some(record.clone());
        Ok(())
    }

    fn record_html(&self, divid: &str, basecourse: &str, html: &str) -> Result<(), DbError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(entry_key(basecourse, divid))
            .or_default()
            .html = Some(html.to_owned());
        Ok(())
    }
}
