//! Multipart form decoding for the record endpoints.

use axum::extract::Multipart;
use pacientes_api::ApiError;
use pacientes_core::PacienteInput;

/// Form field name carrying the uploaded photo.
pub const FOTO_FIELD: &str = "fotoPersonal";

/// An uploaded file as it arrived on the wire, before intake validation.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Reads a create/update form: text fields into a [`PacienteInput`] plus the
/// optional photo file part. Unknown text fields are ignored.
pub async fn read_record_form(
    mut multipart: Multipart,
) -> Result<(PacienteInput, Option<UploadedFile>), ApiError> {
    let mut input = PacienteInput::default();
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == FOTO_FIELD && field.file_name().is_some() {
            let original_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(bad_form)?.to_vec();
            file = Some(UploadedFile {
                original_name,
                content_type,
                bytes,
            });
        } else {
            let value = field.text().await.map_err(bad_form)?;
            input.set_field(&name, value);
        }
    }

    Ok((input, file))
}

/// Reads a photo-only form, returning the file part if one was sent.
pub async fn read_photo_form(mut multipart: Multipart) -> Result<Option<UploadedFile>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        if field.name() == Some(FOTO_FIELD) && field.file_name().is_some() {
            let original_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(bad_form)?.to_vec();
            return Ok(Some(UploadedFile {
                original_name,
                content_type,
                bytes,
            }));
        }
    }
    Ok(None)
}

fn bad_form(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::validation(format!("Formulario multipart inválido: {err}"))
}
