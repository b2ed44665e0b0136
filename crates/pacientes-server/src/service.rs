//! The record service: validation, defaults, and storage orchestration.

use std::sync::Arc;

use pacientes_api::ApiError;
use pacientes_core::{Paciente, PacienteInput, generate_id};
use pacientes_storage::{PacienteStore, SearchCriteria};

use crate::forms::UploadedFile;
use crate::uploads::FileIntake;

/// Cap applied when only the most recent records are requested.
pub const RECENT_LIMIT: usize = 5;

/// Application service over the record store. Validation happens here,
/// before any persistence attempt; uploaded files pass through the intake
/// only after the record fields have been validated.
#[derive(Clone)]
pub struct PacienteService {
    store: Arc<dyn PacienteStore>,
}

impl PacienteService {
    pub fn new(store: Arc<dyn PacienteStore>) -> Self {
        Self { store }
    }

    /// Creates a record from validated form input, attaching the uploaded
    /// photo when one was sent.
    pub async fn create(
        &self,
        intake: &FileIntake,
        input: &PacienteInput,
        file: Option<UploadedFile>,
    ) -> Result<Paciente, ApiError> {
        let valid = input.validate()?;
        let foto = self.store_upload(intake, file).await?;
        let paciente = valid.into_paciente(generate_id(), foto);
        Ok(self.store.insert(paciente).await?)
    }

    /// Replaces the record with the given id (full-document semantics).
    /// The stored photo is kept unless a new file was uploaded, and the
    /// stored admission date is kept unless the form sends a new one.
    pub async fn update(
        &self,
        intake: &FileIntake,
        id: &str,
        input: &PacienteInput,
        file: Option<UploadedFile>,
    ) -> Result<Paciente, ApiError> {
        let valid = input.validate()?;
        let existing = self.store.get(id).await?;
        let foto = match self.store_upload(intake, file).await? {
            Some(foto) => Some(foto),
            None => existing.as_ref().and_then(|p| p.foto_personal.clone()),
        };
        let mut paciente = valid.into_paciente(id.to_string(), foto);
        if !input.has_fecha_ingreso() {
            if let Some(existing) = &existing {
                paciente.fecha_ingreso = existing.fecha_ingreso;
            }
        }
        Ok(self.store.update(id, paciente).await?)
    }

    /// Removes a record and returns it.
    pub async fn delete(&self, id: &str) -> Result<Paciente, ApiError> {
        Ok(self.store.delete(id).await?)
    }

    /// Returns a record by id.
    pub async fn get(&self, id: &str) -> Result<Paciente, ApiError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Paciente con id {id} no encontrado")))
    }

    /// Returns all records ordered by id, or with `last` only the most
    /// recently inserted ones. An empty result is reported as not found.
    pub async fn list(&self, last: bool) -> Result<Vec<Paciente>, ApiError> {
        let pacientes = if last {
            self.store.recent(RECENT_LIMIT).await?
        } else {
            self.store.list().await?
        };
        if pacientes.is_empty() {
            return Err(ApiError::not_found(
                "No se encontraron pacientes en la colección",
            ));
        }
        Ok(pacientes)
    }

    /// Runs a filtered search, most recently created records first.
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Paciente>, ApiError> {
        let query = criteria.to_query()?;
        let pacientes = self.store.search(&query).await?;
        if pacientes.is_empty() {
            return Err(ApiError::not_found(
                "No se encontraron pacientes con el criterio de búsqueda",
            ));
        }
        Ok(pacientes)
    }

    /// Stores an uploaded photo and links it to the record.
    pub async fn attach_photo(
        &self,
        intake: &FileIntake,
        id: &str,
        file: Option<UploadedFile>,
    ) -> Result<(Paciente, String), ApiError> {
        let file = file.ok_or_else(|| {
            ApiError::validation("El archivo no puede estar vacío o no es válido")
        })?;
        let stored = intake
            .accept(&file.original_name, file.content_type.as_deref(), &file.bytes)
            .await?;
        let paciente = self.store.set_foto(id, &stored.filename).await?;
        Ok((paciente, stored.filename))
    }

    async fn store_upload(
        &self,
        intake: &FileIntake,
        file: Option<UploadedFile>,
    ) -> Result<Option<String>, ApiError> {
        match file {
            Some(file) => {
                let stored = intake
                    .accept(&file.original_name, file.content_type.as_deref(), &file.bytes)
                    .await?;
                Ok(Some(stored.filename))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacientes_db_memory::InMemoryStore;

    fn service() -> (tempfile::TempDir, FileIntake, PacienteService) {
        let dir = tempfile::tempdir().unwrap();
        let intake = FileIntake::new(dir.path(), 5 * 1024 * 1024);
        let service = PacienteService::new(Arc::new(InMemoryStore::new()));
        (dir, intake, service)
    }

    fn input(rut: &str, nombre: &str) -> PacienteInput {
        let mut input = PacienteInput::default();
        input.set_field("rut", rut.into());
        input.set_field("nombre", nombre.into());
        input.set_field("apellido", "Soto".into());
        input.set_field("edad", "30".into());
        input.set_field("sexo", "F".into());
        input.set_field("enfermedad", "asma".into());
        input
    }

    fn png(bytes: &[u8]) -> UploadedFile {
        UploadedFile {
            original_name: "retrato.png".into(),
            content_type: Some("image/png".into()),
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_defaults() {
        let (_dir, intake, service) = service();
        let paciente = service
            .create(&intake, &input("1-9", "Ana"), None)
            .await
            .unwrap();
        assert!(!paciente.id.is_empty());
        assert!(!paciente.revisado);
        assert_eq!(paciente.fecha_ingreso, pacientes_core::hoy_utc());
        assert!(paciente.foto_personal.is_none());
    }

    #[tokio::test]
    async fn test_create_with_invalid_input_stores_nothing() {
        let (_dir, intake, service) = service();
        let mut bad = input("", "Ana");
        bad.rut = None;
        let err = service.create(&intake, &bad, Some(png(b"x"))).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        // validation ran before intake: nothing was persisted to disk
        assert_eq!(std::fs::read_dir(intake.dir()).unwrap().count(), 0);
        assert!(service.list(false).await.is_err());
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let (_dir, intake, service) = service();
        let err = service
            .update(&intake, "nope", &input("1-9", "Ana"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_keeps_photo_unless_replaced() {
        let (_dir, intake, service) = service();
        let created = service
            .create(&intake, &input("1-9", "Ana"), Some(png(b"uno")))
            .await
            .unwrap();
        let foto = created.foto_personal.clone().unwrap();

        let updated = service
            .update(&intake, &created.id, &input("1-9", "Anita"), None)
            .await
            .unwrap();
        assert_eq!(updated.nombre, "Anita");
        assert_eq!(updated.foto_personal.as_deref(), Some(foto.as_str()));

        let replaced = service
            .update(&intake, &created.id, &input("1-9", "Anita"), Some(png(b"dos")))
            .await
            .unwrap();
        assert_ne!(replaced.foto_personal.as_deref(), Some(foto.as_str()));
    }

    #[tokio::test]
    async fn test_update_without_fecha_keeps_stored_admission_date() {
        let (_dir, intake, service) = service();
        let mut con_fecha = input("1-9", "Ana");
        con_fecha.set_field("fechaIngreso", "2020-01-15".into());
        let created = service.create(&intake, &con_fecha, None).await.unwrap();
        assert_eq!(created.fecha_ingreso.to_string(), "2020-01-15");

        let updated = service
            .update(&intake, &created.id, &input("1-9", "Anita"), None)
            .await
            .unwrap();
        assert_eq!(updated.fecha_ingreso.to_string(), "2020-01-15");

        // an explicit value still replaces the stored date
        let mut nueva = input("1-9", "Anita");
        nueva.set_field("fechaIngreso", "2021-02-02".into());
        let replaced = service
            .update(&intake, &created.id, &nueva, None)
            .await
            .unwrap();
        assert_eq!(replaced.fecha_ingreso.to_string(), "2021-02-02");
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let (_dir, intake, service) = service();
        let created = service
            .create(&intake, &input("1-9", "Ana"), None)
            .await
            .unwrap();

        let removed = service.delete(&created.id).await.unwrap();
        assert_eq!(removed.id, created.id);

        assert!(matches!(
            service.get(&created.id).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
        // repeated delete also reports not found
        assert!(matches!(
            service.delete(&created.id).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_list_empty_collection_is_not_found() {
        let (_dir, _intake, service) = service();
        assert!(matches!(
            service.list(false).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_list_last_caps_at_five() {
        let (_dir, intake, service) = service();
        for i in 0..7 {
            service
                .create(&intake, &input(&format!("{i}-K"), "X"), None)
                .await
                .unwrap();
        }
        assert_eq!(service.list(false).await.unwrap().len(), 7);
        assert_eq!(service.list(true).await.unwrap().len(), RECENT_LIMIT);
    }

    #[tokio::test]
    async fn test_attach_photo_requires_a_file() {
        let (_dir, intake, service) = service();
        let created = service
            .create(&intake, &input("1-9", "Ana"), None)
            .await
            .unwrap();

        let err = service
            .attach_photo(&intake, &created.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let (paciente, filename) = service
            .attach_photo(&intake, &created.id, Some(png(b"img")))
            .await
            .unwrap();
        assert_eq!(paciente.foto_personal.as_deref(), Some(filename.as_str()));
    }

    #[tokio::test]
    async fn test_attach_photo_unknown_id_is_not_found() {
        let (_dir, intake, service) = service();
        let err = service
            .attach_photo(&intake, "nope", Some(png(b"img")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_search_no_match_is_not_found() {
        let (_dir, intake, service) = service();
        service
            .create(&intake, &input("1-9", "Ana"), None)
            .await
            .unwrap();

        let criteria = SearchCriteria {
            sexo: Some("M".into()),
            ..Default::default()
        };
        assert!(matches!(
            service.search(&criteria).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
    }
}
