use super::backend::StorageBackend;
use crate::error::{LogbookError, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since logbook is single-threaded.
/// This avoids the overhead of `RwLock` while still allowing the
/// `StorageBackend` trait to use `&self` for all methods.
#[derive(Default)]
pub struct MemBackend {
    files: RefCell<HashMap<String, Vec<u8>>>,
    simulate_write_error: RefCell<bool>,
    failing_writes: RefCell<usize>,
    writes: RefCell<usize>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a file, e.g. with hand-crafted corrupt content.
    pub fn with_file(self, name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.borrow_mut().insert(name.to_string(), bytes.into());
        self
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Fail only the next `count` writes, then succeed again.
    pub fn fail_next_writes(&self, count: usize) {
        *self.failing_writes.borrow_mut() = count;
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }

    pub fn contents(&self, name: &str) -> Option<Vec<u8>> {
        self.files.borrow().get(name).cloned()
    }

    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}

impl StorageBackend for MemBackend {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.files.borrow().get(name).cloned())
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let transient = {
            let mut failing = self.failing_writes.borrow_mut();
            let fail = *failing > 0;
            *failing = failing.saturating_sub(1);
            fail
        };
        if transient || *self.simulate_write_error.borrow() {
            return Err(LogbookError::Write {
                path: self.location(name),
                source: std::io::Error::other("simulated write error"),
            });
        }
        self.files
            .borrow_mut()
            .insert(name.to_string(), bytes.to_vec());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }

    fn quarantine(&self, name: &str, suffix: &str) -> Result<Option<PathBuf>> {
        let mut files = self.files.borrow_mut();
        match files.remove(name) {
            Some(bytes) => {
                let aside = format!("{}.{}", name, suffix);
                files.insert(aside.clone(), bytes);
                Ok(Some(self.location(&aside)))
            }
            None => Ok(None),
        }
    }

    fn location(&self, name: &str) -> PathBuf {
        PathBuf::from(format!("memory://{}", name))
    }
}
