//! Question database abstraction for quizly components.
//!
//! Components record two things while a course is built: the question metadata
//! when a directive is parsed, and the rendered HTML fragment once the node has
//! been rendered. The [`QuestionDb`] trait decouples the component from the
//! store that keeps those records.
//!
//! # Implementations
//!
//! - [`NullQuestionDb`]: discards everything
//! - [`MemoryQuestionDb`]: in-memory map, useful for tests and embedding
//! - [`JsonQuestionDb`]: a single JSON file keyed by `basecourse/divid`
//!
//! # Example
//!
//! ```
//! use quizly_db::{MemoryQuestionDb, QuestionDb, QuestionRecord};
//!
//! let db = MemoryQuestionDb::new();
//! let record = QuestionRecord::new("q1", "thinkcspy", "quizly");
//! db.record_question(&record).unwrap();
//! db.record_html("q1", "thinkcspy", "<div>quiz</div>").unwrap();
//!
//! let stored = db.get("thinkcspy", "q1").unwrap();
//! assert_eq!(stored.html.as_deref(), Some("<div>quiz</div>"));
//! ```

mod json;
mod memory;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use json::JsonQuestionDb;
pub use memory::MemoryQuestionDb;

/// Metadata describing one question, recorded when its directive is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Unique element id of the question within the course.
    pub divid: String,
    /// Course the question belongs to.
    pub basecourse: String,
    /// Component name (e.g. `quizly`).
    pub component: String,
    /// Document the question appears in (source path without extension).
    #[serde(default)]
    pub docname: String,
    /// Source file of the directive, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    /// Line of the directive opener (1-indexed, 0 when unknown).
    #[serde(default)]
    pub line: usize,
    /// Human-facing question label (e.g. `1.4`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_label: Option<String>,
    /// Raw directive text as written in the source.
    #[serde(default)]
    pub rawsource: String,
}

impl QuestionRecord {
    /// Create a record with the identifying fields set and everything else empty.
    #[must_use]
    pub fn new(
        divid: impl Into<String>,
        basecourse: impl Into<String>,
        component: impl Into<String>,
    ) -> Self {
        Self {
            divid: divid.into(),
            basecourse: basecourse.into(),
            component: component.into(),
            docname: String::new(),
            source_path: None,
            line: 0,
            question_label: None,
            rawsource: String::new(),
        }
    }

    /// Storage key shared by all backends.
    #[must_use]
    pub fn key(&self) -> String {
        entry_key(&self.basecourse, &self.divid)
    }
}

/// Everything a backend knows about one question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredQuestion {
    /// Metadata from [`QuestionDb::record_question`], if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionRecord>,
    /// Rendered fragment from [`QuestionDb::record_html`], if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

/// Question database error.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Reading or writing the backing file failed.
    #[error("question database I/O error at {}: {source}", path.display())]
    Io {
        /// Backing file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The backing file does not contain a valid question map.
    #[error("question database {} is corrupt: {source}", path.display())]
    Corrupt {
        /// Backing file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// Serializing the question map failed.
    #[error("failed to serialize question database: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Store for question metadata and rendered fragments.
///
/// Methods take `&self`; implementations use interior mutability so a single
/// database can be shared between the parse phase and the render phase.
pub trait QuestionDb: Send + Sync {
    /// Record question metadata. Overwrites an earlier record for the same key.
    fn record_question(&self, record: &QuestionRecord) -> Result<(), DbError>;

    /// Record the rendered HTML fragment for a question.
    ///
    /// A fragment may arrive for a question whose metadata was never recorded;
    /// backends keep it anyway.
    fn record_html(&self, divid: &str, basecourse: &str, html: &str) -> Result<(), DbError>;
}

/// No-op [`QuestionDb`] used when recording is disabled.
pub struct NullQuestionDb;

impl QuestionDb for NullQuestionDb {
    fn record_question(&self, _record: &QuestionRecord) -> Result<(), DbError> {
        Ok(())
    }

    fn record_html(&self, _divid: &str, _basecourse: &str, _html: &str) -> Result<(), DbError> {
        Ok(())
    }
}

/// Build the `basecourse/divid` key.
fn entry_key(basecourse: &str, divid: &str) -> String {
    format!("{basecourse}/{divid}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_db_accepts_everything() {
        let db = NullQuestionDb;
        db.record_question(&QuestionRecord::new("q1", "course", "quizly"))
            .unwrap();
        db.record_html("q1", "course", "<div></div>").unwrap();
    }

    #[test]
    fn test_record_key() {
        let record = QuestionRecord::new("quiz_intro", "thinkcspy", "quizly");
        assert_eq!(record.key(), "thinkcspy/quiz_intro");
    }

    #[test]
    fn test_record_serialization_skips_empty_options() {
        let record = QuestionRecord::new("q1", "course", "quizly");
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("source_path"));
        assert!(!json.contains("question_label"));
    }
}
