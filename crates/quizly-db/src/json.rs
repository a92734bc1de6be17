//! JSON-file question database.
//!
//! The whole database is one JSON object mapping `basecourse/divid` to a
//! [`StoredQuestion`]. Every recording call rewrites the file, so the file on
//! disk always reflects the last completed call.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::{DbError, QuestionDb, QuestionRecord, StoredQuestion, entry_key};

/// File-backed [`QuestionDb`].
#[derive(Debug)]
pub struct JsonQuestionDb {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, StoredQuestion>>,
}

impl JsonQuestionDb {
    /// Open the database at `path`, loading existing entries if the file exists.
    ///
    /// The file itself is not created until the first recording call.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] if an existing file cannot be read and
    /// [`DbError::Corrupt`] if it is not a valid question map.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DbError> {
        let path = path.into();
        let entries: BTreeMap<String, StoredQuestion> = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| DbError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&content).map_err(|source| DbError::Corrupt {
                path: path.clone(),
                source,
            })?
        } else {
            BTreeMap::new()
        };

        tracing::debug!(
            path = %path.display(),
            entries = entries.len(),
            "Opened question database"
        );

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a stored question.
    #[must_use]
    pub fn get(&self, basecourse: &str, divid: &str) -> Option<StoredQuestion> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&entry_key(basecourse, divid))
            .cloned()
    }

    /// Apply a change and persist it. On a failed write the change is undone,
    /// so memory never holds what the file does not.
    fn update<F>(&self, key: String, apply: F) -> Result<(), DbError>
    where
        F: FnOnce(&mut StoredQuestion),
    {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = entries.get(&key).cloned();
        apply(entries.entry(key.clone()).or_default());

        if let Err(e) = self.flush(&entries) {
            match previous {
                Some(entry) => entries.insert(key, entry),
                None => entries.remove(&key),
            };
            return Err(e);
        }
        Ok(())
    }

    /// Write all entries, replacing the file atomically via a sibling temp file.
    fn flush(&self, entries: &BTreeMap<String, StoredQuestion>) -> Result<(), DbError> {
        let io_err = |source| DbError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl QuestionDb for JsonQuestionDb {
    fn record_question(&self, record: &QuestionRecord) -> Result<(), DbError> {
        self.update(record.key(), |entry| entry.question = Some(record.clone()))
    }

    fn record_html(&self, divid: &str, basecourse: &str, html: &str) -> Result<(), DbError> {
        self.update(entry_key(basecourse, divid), |entry| {
            entry.html = Some(html.to_owned());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_file_created_on_first_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("questions.json");

        let db = JsonQuestionDb::open(&path).unwrap();
        assert!(!path.exists());

        db.record_html("q1", "course", "<div></div>").unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_reopen_preserves_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.json");

        let mut record = QuestionRecord::new("q1", "course", "quizly");
        record.question_label = Some("1.1".to_owned());
        {
            let db = JsonQuestionDb::open(&path).unwrap();
            db.record_question(&record).unwrap();
            db.record_html("q1", "course", "<p>frag</p>").unwrap();
        }

        let db = JsonQuestionDb::open(&path).unwrap();
        assert_eq!(
            db.get("course", "q1"),
            Some(StoredQuestion {
                question: Some(record),
                html: Some("<p>frag</p>".to_owned()),
            })
        );
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.json");
        fs::write(&path, "not json").unwrap();

        let err = JsonQuestionDb::open(&path).unwrap_err();
        assert!(matches!(err, DbError::Corrupt { .. }));
        assert!(err.to_string().contains("questions.json"));
    }

    #[test]
    fn test_file_layout_is_keyed_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.json");

        let db = JsonQuestionDb::open(&path).unwrap();
        db.record_html("q2", "course", "two").unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["course/q2"]["html"], "two");
    }

    #[test]
    fn test_failed_write_is_not_kept() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let db = JsonQuestionDb::open(blocker.join("questions.json")).unwrap();

        assert!(matches!(
            db.record_html("q1", "course", "<failed/>"),
            Err(DbError::Io { .. })
        ));
        assert_eq!(db.get("course", "q1"), None);
    }

    #[test]
    fn test_failed_write_restores_previous_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.json");
        let db = JsonQuestionDb::open(&path).unwrap();
        assert_eq!(db.path(), path);

        db.record_html("q1", "course", "<v1/>").unwrap();
        // A directory at the temp path makes the next write fail.
        fs::create_dir(path.with_extension("json.tmp")).unwrap();
        assert!(db.record_html("q1", "course", "<v2/>").is_err());
        assert!(db.record_html("q2", "course", "<new/>").is_err());

        assert_eq!(
            db.get("course", "q1").unwrap().html.as_deref(),
            Some("<v1/>")
        );
        assert_eq!(db.get("course", "q2"), None);

        let reopened = JsonQuestionDb::open(&path).unwrap();
        assert_eq!(
            reopened.get("course", "q1").unwrap().html.as_deref(),
            Some("<v1/>")
        );
    }
}
