use crate::error::Result;
use std::path::PathBuf;

/// Abstract interface for raw collection I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while [`Store`](super::Store) handles the "what" (records, identity, codec).
pub trait StorageBackend {
    /// Read the raw bytes of a collection file.
    /// Returns Ok(None) if the file does not exist.
    /// Returns Err only on actual I/O errors (permissions, disk failure).
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>>;

    /// Replace a collection file.
    /// MUST be atomic (e.g. write to tmp then rename) so readers only ever see
    /// the previous or the new content.
    fn write(&self, name: &str, bytes: &[u8]) -> Result<()>;

    /// Move an unreadable file aside under a new name so a fresh collection
    /// can take its place. Returns where it went, or None if there was nothing to move.
    fn quarantine(&self, name: &str, suffix: &str) -> Result<Option<PathBuf>>;

    /// Where a file lives. For FsBackend, this is the real path. For MemBackend, a virtual path.
    fn location(&self, name: &str) -> PathBuf;
}
