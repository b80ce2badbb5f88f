//! # Collections
//!
//! The record types that ship with logbook. Each domain module provides its
//! record type, its field table, sample records for a first run, and the
//! command table that drives it.
//!
//! | Collection | Identity        | Menu    |
//! |------------|-----------------|---------|
//! | books      | title + author  | numeric |
//! | expenses   | generated id    | numeric |
//! | tasks      | generated id    | keyword |

use crate::error::{LogbookError, Result};
use crate::interact::console::Console;
use crate::interact::table::CommandTable;
use crate::model::Record;
use crate::schema::{FieldValues, Form};
use crate::session::Session;
use crate::store::fs_backend::FsBackend;
use crate::store::Store;
use std::fmt;
use std::str::FromStr;

pub mod books;
pub mod expenses;
pub mod tasks;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Books,
    Expenses,
    Tasks,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Books, Collection::Expenses, Collection::Tasks];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Books => books::Book::COLLECTION,
            Collection::Expenses => expenses::Expense::COLLECTION,
            Collection::Tasks => tasks::Task::COLLECTION,
        }
    }

    /// Load this collection and run its menu until the user leaves.
    pub fn run(self, session: &mut Session, console: &mut Console<'_>) -> Result<()> {
        match self {
            Collection::Books => run_table(session, console, books::table(), books::samples),
            Collection::Expenses => {
                run_table(session, console, expenses::table(), expenses::samples)
            }
            Collection::Tasks => run_table(session, console, tasks::table(), tasks::samples),
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collection {
    type Err = LogbookError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| LogbookError::Config(format!("Unknown collection: {}", s)))
    }
}

fn run_table<R: Form>(
    session: &mut Session,
    console: &mut Console<'_>,
    table: CommandTable<Store<R, FsBackend>>,
    seed: fn() -> Vec<R>,
) -> Result<()> {
    let mut store = session.open_store(console, seed)?;
    session.run(&table, &mut store, console)
}

/// Read a generated integer id out of `values`.
pub fn sequence_key(values: &FieldValues, name: &str) -> Result<u64> {
    match values.opt_integer(name)? {
        Some(n) if n > 0 => Ok(n as u64),
        Some(n) => Err(LogbookError::validation(
            name,
            format!("{} is not a valid id", n),
        )),
        None => Err(LogbookError::validation(name, "a value is required")),
    }
}
