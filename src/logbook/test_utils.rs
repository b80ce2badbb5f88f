//! Shared fixtures for unit tests: a small `Note` record, store builders and a
//! temporary data directory.

use crate::error::Result;
use crate::model::Record;
use crate::schema::{FieldKind, FieldSpec, FieldValue, FieldValues, Form};
use crate::store::mem_backend::MemBackend;
use crate::store::Store;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Note {
    pub fn new(id: u64, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            body: String::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }
}

const NOTE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", "Id", FieldKind::Integer)
        .identity()
        .generated(),
    FieldSpec::new("title", "Title", FieldKind::Text).required(),
    FieldSpec::new("body", "Body", FieldKind::Text),
    FieldSpec::new("tags", "Tags", FieldKind::List),
];

impl Record for Note {
    type Key = u64;
    const COLLECTION: &'static str = "notes";

    fn key(&self) -> u64 {
        self.id
    }

    fn sequence(&self) -> Option<u64> {
        Some(self.id)
    }
}

impl Form for Note {
    fn fields() -> &'static [FieldSpec] {
        NOTE_FIELDS
    }

    fn to_values(&self) -> FieldValues {
        FieldValues::new()
            .with("id", FieldValue::id(self.id))
            .with("title", FieldValue::Text(self.title.clone()))
            .with("body", FieldValue::Text(self.body.clone()))
            .with("tags", FieldValue::List(self.tags.clone()))
    }

    fn from_values(values: &FieldValues, next_seq: u64) -> Result<Self> {
        Ok(Self {
            id: next_seq,
            title: values.text("title")?,
            body: values.opt_text("body")?,
            tags: values.list("tags")?,
        })
    }

    fn apply_values(&mut self, values: &FieldValues) -> Result<()> {
        if values.get("title").is_some() {
            self.title = values.text("title")?;
        }
        if values.get("body").is_some() || values.is_cleared("body") {
            self.body = values.opt_text("body")?;
        }
        if values.get("tags").is_some() || values.is_cleared("tags") {
            self.tags = values.list("tags")?;
        }
        Ok(())
    }

    fn key_from_values(values: &FieldValues) -> Result<u64> {
        crate::domains::sequence_key(values, "id")
    }

    fn summary(&self) -> String {
        self.title.clone()
    }
}

pub fn mem_store() -> Store<Note, MemBackend> {
    Store::new(MemBackend::new())
}

pub fn mem_store_with(notes: &[Note]) -> Store<Note, MemBackend> {
    let mut store = mem_store();
    for note in notes {
        store.insert(note.clone()).expect("fixture notes must have unique ids");
    }
    store
}

pub struct TestEnv {
    // dropping the TempDir deletes the directory
    pub _temp_dir: TempDir,
    pub root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }
}
