use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use papaya::HashMap as PapayaHashMap;

use pacientes_core::Paciente;
use pacientes_storage::{PacienteStore, SearchQuery, StorageError};

/// A stored record together with its insertion sequence number. The
/// sequence is the creation-order surrogate used for search ordering and
/// the recent-records cap; it survives updates.
#[derive(Debug, Clone)]
struct Entrada {
    seq: u64,
    paciente: Paciente,
}

/// In-memory record storage backend using the papaya lock-free HashMap.
///
/// Concurrent writes to the same record are last-write-wins; readers never
/// block. Suitable as the single shared store handle of the server.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: PapayaHashMap<String, Entrada>,
    /// Atomic counter assigning insertion sequence numbers.
    seq_counter: AtomicU64,
}

impl InMemoryStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.seq_counter.fetch_add(1, Ordering::SeqCst)
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.data.pin().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn collect_entries(&self) -> Vec<Entrada> {
        let guard = self.data.pin();
        guard.iter().map(|(_, e)| e.clone()).collect()
    }
}

#[async_trait]
impl PacienteStore for InMemoryStore {
    async fn insert(&self, paciente: Paciente) -> Result<Paciente, StorageError> {
        let seq = self.next_seq();
        let entrada = Entrada {
            seq,
            paciente: paciente.clone(),
        };
        let guard = self.data.pin();
        if guard.try_insert(paciente.id.clone(), entrada).is_err() {
            return Err(StorageError::already_exists(&paciente.id));
        }
        tracing::debug!(id = %paciente.id, seq, "paciente inserted");
        Ok(paciente)
    }

    async fn get(&self, id: &str) -> Result<Option<Paciente>, StorageError> {
        let guard = self.data.pin();
        Ok(guard.get(id).map(|e| e.paciente.clone()))
    }

    async fn list(&self) -> Result<Vec<Paciente>, StorageError> {
        let mut entries = self.collect_entries();
        entries.sort_by(|a, b| a.paciente.id.cmp(&b.paciente.id));
        Ok(entries.into_iter().map(|e| e.paciente).collect())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Paciente>, StorageError> {
        let mut entries = self.collect_entries();
        entries.sort_by(|a, b| b.seq.cmp(&a.seq));
        entries.truncate(limit);
        entries.sort_by(|a, b| a.paciente.id.cmp(&b.paciente.id));
        Ok(entries.into_iter().map(|e| e.paciente).collect())
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paciente>, StorageError> {
        let mut entries: Vec<Entrada> = self
            .collect_entries()
            .into_iter()
            .filter(|e| query.matches(&e.paciente))
            .collect();
        entries.sort_by(|a, b| b.seq.cmp(&a.seq));
        Ok(entries.into_iter().map(|e| e.paciente).collect())
    }

    async fn update(&self, id: &str, paciente: Paciente) -> Result<Paciente, StorageError> {
        let guard = self.data.pin();
        let old = guard.get(id).ok_or_else(|| StorageError::not_found(id))?;
        // Insertion order is preserved across updates.
        let entrada = Entrada {
            seq: old.seq,
            paciente: paciente.clone(),
        };
        guard.insert(id.to_string(), entrada);
        Ok(paciente)
    }

    async fn set_foto(&self, id: &str, filename: &str) -> Result<Paciente, StorageError> {
        let guard = self.data.pin();
        let old = guard.get(id).ok_or_else(|| StorageError::not_found(id))?;
        let mut entrada = old.clone();
        entrada.paciente.foto_personal = Some(filename.to_string());
        let paciente = entrada.paciente.clone();
        guard.insert(id.to_string(), entrada);
        Ok(paciente)
    }

    async fn delete(&self, id: &str) -> Result<Paciente, StorageError> {
        let guard = self.data.pin();
        match guard.remove(id) {
            Some(entrada) => Ok(entrada.paciente.clone()),
            None => Err(StorageError::not_found(id)),
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
