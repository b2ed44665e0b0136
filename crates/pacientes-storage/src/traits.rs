//! Storage traits for the record storage abstraction layer.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::query::SearchQuery;
use pacientes_core::Paciente;

/// The main storage trait that record storage backends implement.
///
/// Implementations must be thread-safe (`Send + Sync`). Conflicting writes to
/// the same record are serialized by the backend with last-write-wins
/// semantics; there is no optimistic-concurrency check.
#[async_trait]
pub trait PacienteStore: Send + Sync {
    /// Inserts a new record. The caller assigns the id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if the id is already taken.
    async fn insert(&self, paciente: Paciente) -> Result<Paciente, StorageError>;

    /// Reads a record by id. Returns `None` if it does not exist.
    async fn get(&self, id: &str) -> Result<Option<Paciente>, StorageError>;

    /// Returns all records ordered by id ascending.
    async fn list(&self) -> Result<Vec<Paciente>, StorageError>;

    /// Returns at most `limit` most-recently-inserted records,
    /// ordered by id ascending.
    async fn recent(&self, limit: usize) -> Result<Vec<Paciente>, StorageError>;

    /// Returns the records matching `query`, most recently inserted first.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paciente>, StorageError>;

    /// Replaces the record with the given id (full-document semantics)
    /// and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the record does not exist.
    async fn update(&self, id: &str, paciente: Paciente) -> Result<Paciente, StorageError>;

    /// Sets only the stored photo filename of a record and returns it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the record does not exist.
    async fn set_foto(&self, id: &str, filename: &str) -> Result<Paciente, StorageError>;

    /// Removes a record and returns it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the record does not exist,
    /// including on a repeated delete of the same id.
    async fn delete(&self, id: &str) -> Result<Paciente, StorageError>;

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
