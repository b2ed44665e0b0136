//! In-memory record storage backend.

pub mod storage;

pub use storage::InMemoryStore;
