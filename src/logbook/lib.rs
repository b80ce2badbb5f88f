//! # Logbook Architecture
//!
//! Logbook is a **file-backed record store with an interactive menu on top**.
//! A collection is a list of records kept in one JSON file; a session loads
//! it, runs a command loop over it, and writes it back.
//!
//! The core is generic. A new kind of record only needs a [`model::Record`]
//! impl, a [`schema::Form`] field table and a [`interact::CommandTable`];
//! storage, prompting, validation, rendering and save policies come for free.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (src/logbook/cli, wired by main.rs)                    │
//! │  - Arguments, config resolution, logging, exit codes        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Session + Interactive layer (session.rs, interact/)        │
//! │  - Command loop, prompts, save points, failure policies     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Workflows on a store, returning structured results       │
//! │  - Never prints, never prompts                              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/, codec.rs)                           │
//! │  - Store: identity, CRUD, load/save                         │
//! │  - FsBackend (atomic files), MemBackend (testing)           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Testing Strategy
//!
//! 1. **Store and commands**: unit tests against `MemBackend`. Most of the
//!    coverage lives here.
//! 2. **Interactive layer and session**: scripted input through an in-memory
//!    [`interact::Console`], asserting on the text written back.
//! 3. **Binary**: `tests/` runs the real executable with piped stdin.
//!
//! ## Module Overview
//!
//! - [`model`]: `Record`, `NaturalKey`, `Money`
//! - [`schema`]: Field descriptors and parsing
//! - [`codec`]: Collection <-> JSON
//! - [`store`]: Storage abstraction and implementations
//! - [`commands`]: Business logic for each workflow
//! - [`interact`]: Console, command tables, rendering
//! - [`session`]: The command loop and its policies
//! - [`config`]: Configuration management
//! - [`domains`]: Books, expenses and tasks
//! - [`error`]: Error types

pub mod codec;
pub mod commands;
pub mod config;
pub mod domains;
pub mod error;
pub mod interact;
pub mod model;
pub mod schema;
pub mod session;
pub mod store;

#[cfg(test)]
pub mod test_utils;
