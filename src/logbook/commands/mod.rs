//! # Command Layer
//!
//! Workflows built on a [`Store`](crate::store::Store). Each command lives in
//! its own submodule as a plain function over Rust types.
//!
//! Commands do not read input or print. They return a [`CmdResult`] carrying
//! the records to show, the records they changed, and leveled messages; the
//! interactive layer decides how to render them. A command that fails returns
//! `Err` and leaves the store exactly as it found it.
//!
//! Tests here run against `MemBackend`, so no filesystem is involved.
//!
//! - [`add`]: Insert a new record
//! - [`list`]: List records, optionally ordered
//! - [`view`]: Show one record
//! - [`edit`]: Modify a record in place
//! - [`delete`]: Remove a record
//! - [`search`]: Case-insensitive text search across fields
//! - [`stats`]: Record counts per group

use crate::model::Record;

pub mod add;
pub mod delete;
pub mod edit;
pub mod list;
pub mod search;
pub mod stats;
pub mod view;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug)]
pub struct CmdResult<R: Record> {
    pub affected: Vec<R>,
    pub listed: Vec<R>,
    pub messages: Vec<CmdMessage>,
}

impl<R: Record> Default for CmdResult<R> {
    fn default() -> Self {
        Self {
            affected: Vec::new(),
            listed: Vec::new(),
            messages: Vec::new(),
        }
    }
}

impl<R: Record> CmdResult<R> {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected(mut self, records: Vec<R>) -> Self {
        self.affected = records;
        self
    }

    pub fn with_listed(mut self, records: Vec<R>) -> Self {
        self.listed = records;
        self
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// True when the command changed the collection.
    pub fn mutated(&self) -> bool {
        !self.affected.is_empty()
    }
}

/// Message shown instead of an empty table.
pub fn none_found<R: Record>() -> CmdMessage {
    CmdMessage::info(format!("No {} found.", R::COLLECTION))
}
