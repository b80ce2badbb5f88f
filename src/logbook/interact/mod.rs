//! # Interactive Layer
//!
//! Everything that touches the terminal during a session:
//!
//! - [`console`]: line input, prompts and field-by-field forms
//! - [`table`]: command tables in numeric or keyword discipline
//! - [`render`]: record lists, record details and messages as text
//! - [`workflows`]: the standard add/list/view/edit/delete/search handlers
//!
//! The loop that drives a table lives in [`session`](crate::session).

pub mod console;
pub mod render;
pub mod table;
pub mod workflows;

pub use console::Console;
pub use table::{Action, CommandTable, Discipline, Flow, Outcome};
