use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use pacientes_api::{ApiError, Envelope};
use pacientes_storage::SearchCriteria;

use crate::forms::{read_photo_form, read_record_form};
use crate::service::PacienteService;
use crate::uploads::FileIntake;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: PacienteService,
    pub intake: FileIntake,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "Pacientes Server",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// When true, only the most recently added records are returned.
    pub last: Option<bool>,
}

pub async fn list_pacientes(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let pacientes = state.service.list(params.last.unwrap_or(false)).await?;
    Ok((
        StatusCode::OK,
        Json(Envelope::success().with_pacientes(pacientes)),
    ))
}

pub async fn search_pacientes(
    State(state): State<AppState>,
    Query(criteria): Query<SearchCriteria>,
) -> Result<impl IntoResponse, ApiError> {
    let pacientes = state.service.search(&criteria).await?;
    Ok((
        StatusCode::OK,
        Json(Envelope::success().with_pacientes(pacientes)),
    ))
}

pub async fn get_paciente(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let paciente = state.service.get(&id).await?;
    Ok((
        StatusCode::OK,
        Json(Envelope::success().with_paciente(paciente)),
    ))
}

pub async fn create_paciente(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (input, file) = read_record_form(multipart).await?;
    let paciente = state.service.create(&state.intake, &input, file).await?;
    Ok((
        StatusCode::CREATED,
        Json(
            Envelope::success()
                .with_message("Paciente guardado exitosamente")
                .with_paciente(paciente),
        ),
    ))
}

pub async fn update_paciente(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (input, file) = read_record_form(multipart).await?;
    let paciente = state
        .service
        .update(&state.intake, &id, &input, file)
        .await?;
    Ok((
        StatusCode::OK,
        Json(
            Envelope::success()
                .with_message("Paciente actualizado exitosamente")
                .with_paciente(paciente),
        ),
    ))
}

pub async fn delete_paciente(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let paciente = state.service.delete(&id).await?;
    Ok((
        StatusCode::OK,
        Json(
            Envelope::success()
                .with_message("Paciente eliminado exitosamente")
                .with_paciente(paciente),
        ),
    ))
}

pub async fn attach_foto(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let file = read_photo_form(multipart).await?;
    let (paciente, filename) = state.service.attach_photo(&state.intake, &id, file).await?;
    Ok((
        StatusCode::OK,
        Json(
            Envelope::success()
                .with_message("Foto de paciente actualizada exitosamente")
                .with_filename(filename)
                .with_paciente(paciente),
        ),
    ))
}

pub async fn get_foto(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let bytes = state.intake.open(&filename).await?;
    let mime = mime_guess::from_path(&filename).first_or_octet_stream();
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime.to_string())],
        bytes,
    )
        .into_response())
}
