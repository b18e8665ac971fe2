//! Storage module for the API.
//!
//! Provides the path-addressed document store trait and its backends:
//! in-memory, JSON file and the realtime database REST API.

pub mod codec;
pub mod error;
pub mod push_id;
pub mod traits;
pub(crate) mod tree;

// Storage backend implementations
pub mod file;
pub mod memory;
pub mod rtdb;

pub use error::StorageError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use rtdb::RtdbStore;
pub use traits::{Collection, DocPath, DocumentStore};
