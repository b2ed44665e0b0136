//! File intake: validation and persistence of uploaded photo bytes.

use std::path::{Path, PathBuf};

use pacientes_api::ApiError;
use uuid::Uuid;

/// MIME types accepted for photo uploads.
pub const ALLOWED_MIME_TYPES: [&str; 4] = ["image/png", "image/jpg", "image/jpeg", "image/gif"];

/// A persisted upload, named independently of the record it may later be
/// attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub filename: String,
    pub size: usize,
}

/// Validates uploaded files and persists them into the flat content
/// directory. Constructed once and passed through application state.
#[derive(Debug, Clone)]
pub struct FileIntake {
    dir: PathBuf,
    max_bytes: usize,
}

impl FileIntake {
    /// Creates the intake over `dir`, creating the directory if absent.
    ///
    /// A directory-creation failure is logged rather than propagated; it
    /// surfaces as an internal error on the first attempted write.
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        let dir = dir.into();
        if let Err(e) = std::fs::create_dir_all(&dir) {
            tracing::error!(dir = %dir.display(), error = %e, "failed to create uploads directory");
        }
        Self { dir, max_bytes }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Generates the stored name for an upload: a random token plus the
    /// original filename's suffix, taken verbatim.
    pub fn stored_name(original_name: &str) -> String {
        let ext = original_name.rsplit('.').next().unwrap_or_default();
        format!("{}.{ext}", Uuid::new_v4())
    }

    /// Validates and persists one uploaded file, returning its stored name
    /// and byte size.
    pub async fn accept(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredFile, ApiError> {
        let mime = content_type.unwrap_or_default();
        if !ALLOWED_MIME_TYPES.contains(&mime) {
            return Err(ApiError::validation("Tipo de archivo no permitido"));
        }
        if bytes.len() > self.max_bytes {
            return Err(ApiError::validation(format!(
                "El archivo supera el tamaño máximo de {} bytes",
                self.max_bytes
            )));
        }

        let filename = Self::stored_name(original_name);
        let path = self.dir.join(&filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ApiError::internal("Error al guardar el archivo", e.to_string()))?;

        tracing::debug!(filename = %filename, size = bytes.len(), "upload stored");
        Ok(StoredFile {
            filename,
            size: bytes.len(),
        })
    }

    /// Reads a stored file back for serving.
    ///
    /// Names with path separators or parent components never match a stored
    /// file, so they report as not found.
    pub async fn open(&self, filename: &str) -> Result<Vec<u8>, ApiError> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return Err(not_found(filename));
        }

        let path = self.dir.join(filename);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found(filename)),
            Err(e) => Err(ApiError::internal(
                "Error al leer el archivo",
                e.to_string(),
            )),
        }
    }
}

fn not_found(filename: &str) -> ApiError {
    ApiError::not_found(format!("Imagen con el nombre {filename} no encontrada"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intake() -> (tempfile::TempDir, FileIntake) {
        let dir = tempfile::tempdir().unwrap();
        let intake = FileIntake::new(dir.path(), 16);
        (dir, intake)
    }

    #[test]
    fn test_stored_name_keeps_original_suffix() {
        let name = FileIntake::stored_name("retrato.png");
        assert!(name.ends_with(".png"));
        // token part is a UUID, so two names never collide
        assert_ne!(name, FileIntake::stored_name("retrato.png"));
    }

    #[test]
    fn test_stored_name_takes_last_suffix_verbatim() {
        let name = FileIntake::stored_name("foto.de.perfil.JPG");
        assert!(name.ends_with(".JPG"));
    }

    #[tokio::test]
    async fn test_accept_rejects_disallowed_mime() {
        let (_dir, intake) = intake();
        let err = intake
            .accept("doc.pdf", Some("application/pdf"), b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_accept_rejects_missing_content_type() {
        let (_dir, intake) = intake();
        let err = intake.accept("foto.png", None, b"x").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_accept_rejects_oversized_file() {
        let (_dir, intake) = intake();
        let err = intake
            .accept("foto.png", Some("image/png"), &[0u8; 17])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_accept_persists_and_open_reads_back() {
        let (_dir, intake) = intake();
        let stored = intake
            .accept("foto.jpeg", Some("image/jpeg"), b"abc")
            .await
            .unwrap();
        assert_eq!(stored.size, 3);
        assert!(stored.filename.ends_with(".jpeg"));

        let bytes = intake.open(&stored.filename).await.unwrap();
        assert_eq!(bytes, b"abc");
    }

    #[tokio::test]
    async fn test_open_missing_file_is_not_found() {
        let (_dir, intake) = intake();
        let err = intake.open("nunca-escrito.png").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_open_rejects_traversal() {
        let (_dir, intake) = intake();
        for name in ["../secreto", "a/b.png", "..\\x", ""] {
            let err = intake.open(name).await.unwrap_err();
            assert!(matches!(err, ApiError::NotFound(_)), "{name}");
        }
    }
}
