//! Storage abstraction layer for the pacientes server.
//!
//! Defines the [`PacienteStore`] trait implemented by storage backends, the
//! storage error taxonomy, and the search query types with their in-process
//! matching semantics.

pub mod error;
pub mod query;
pub mod traits;

pub use error::{ErrorCategory, StorageError};
pub use query::{CampoTexto, ContainsTerm, RecordFilter, SearchCriteria, SearchQuery};
pub use traits::PacienteStore;
