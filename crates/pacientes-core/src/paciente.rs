use crate::error::{CoreError, Result};
use crate::fecha::{FechaIngreso, hoy_utc, parse_fecha};
use serde::{Deserialize, Serialize};

/// Form fields that must be present and non-empty, checked in this order.
pub const REQUIRED_FIELDS: [&str; 6] = ["rut", "nombre", "apellido", "edad", "sexo", "enfermedad"];

/// One patient record as stored and served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paciente {
    pub id: String,
    pub rut: String,
    pub nombre: String,
    pub apellido: String,
    pub edad: u16,
    pub sexo: String,
    pub enfermedad: String,
    #[serde(rename = "fechaIngreso")]
    pub fecha_ingreso: FechaIngreso,
    pub revisado: bool,
    #[serde(
        rename = "fotoPersonal",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub foto_personal: Option<String>,
}

/// Raw form input for create/update. Multipart form values arrive as text,
/// so every field is carried as an optional string until validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PacienteInput {
    pub rut: Option<String>,
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub edad: Option<String>,
    pub sexo: Option<String>,
    pub enfermedad: Option<String>,
    #[serde(rename = "fechaIngreso")]
    pub fecha_ingreso: Option<String>,
    pub revisado: Option<String>,
}

impl PacienteInput {
    /// Assigns a named form field. Returns `false` for unknown field names,
    /// which callers are expected to ignore.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        match name {
            "rut" => self.rut = Some(value),
            "nombre" => self.nombre = Some(value),
            "apellido" => self.apellido = Some(value),
            "edad" => self.edad = Some(value),
            "sexo" => self.sexo = Some(value),
            "enfermedad" => self.enfermedad = Some(value),
            "fechaIngreso" => self.fecha_ingreso = Some(value),
            "revisado" => self.revisado = Some(value),
            _ => return false,
        }
        true
    }

    /// Validates the input, returning the first violated constraint.
    ///
    /// Required fields are checked for presence and non-emptiness in
    /// [`REQUIRED_FIELDS`] order; only then are the typed fields parsed.
    /// Defaults are applied here: `fechaIngreso` falls back to the current
    /// UTC day and `revisado` to `false`.
    pub fn validate(&self) -> Result<PacienteValidado> {
        for field in REQUIRED_FIELDS {
            if self.raw_field(field).unwrap_or("").is_empty() {
                return Err(CoreError::missing_field(field));
            }
        }

        let edad: u16 = self
            .edad
            .as_deref()
            .unwrap_or_default()
            .trim()
            .parse()
            .map_err(|_| CoreError::invalid_field("edad", "se esperaba un número entero"))?;

        let fecha_ingreso = match self.fecha_ingreso.as_deref() {
            Some(s) if !s.is_empty() => parse_fecha(s)?,
            _ => hoy_utc(),
        };

        let revisado = match self.revisado.as_deref() {
            Some(s) if !s.is_empty() => parse_revisado(s)?,
            _ => false,
        };

        Ok(PacienteValidado {
            rut: self.rut.clone().unwrap_or_default(),
            nombre: self.nombre.clone().unwrap_or_default(),
            apellido: self.apellido.clone().unwrap_or_default(),
            edad,
            sexo: self.sexo.clone().unwrap_or_default(),
            enfermedad: self.enfermedad.clone().unwrap_or_default(),
            fecha_ingreso,
            revisado,
        })
    }

    /// Whether the form carried a non-empty `fechaIngreso` value.
    pub fn has_fecha_ingreso(&self) -> bool {
        self.fecha_ingreso.as_deref().is_some_and(|s| !s.is_empty())
    }

    fn raw_field(&self, name: &str) -> Option<&str> {
        match name {
            "rut" => self.rut.as_deref(),
            "nombre" => self.nombre.as_deref(),
            "apellido" => self.apellido.as_deref(),
            "edad" => self.edad.as_deref(),
            "sexo" => self.sexo.as_deref(),
            "enfermedad" => self.enfermedad.as_deref(),
            _ => None,
        }
    }
}

fn parse_revisado(s: &str) -> Result<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(CoreError::invalid_field(
            "revisado",
            format!("'{other}' no es un booleano"),
        )),
    }
}

/// Validated record fields with defaults applied, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacienteValidado {
    pub rut: String,
    pub nombre: String,
    pub apellido: String,
    pub edad: u16,
    pub sexo: String,
    pub enfermedad: String,
    pub fecha_ingreso: FechaIngreso,
    pub revisado: bool,
}

impl PacienteValidado {
    /// Builds the final record with its assigned id and optional photo.
    pub fn into_paciente(self, id: String, foto_personal: Option<String>) -> Paciente {
        Paciente {
            id,
            rut: self.rut,
            nombre: self.nombre,
            apellido: self.apellido,
            edad: self.edad,
            sexo: self.sexo,
            enfermedad: self.enfermedad,
            fecha_ingreso: self.fecha_ingreso,
            revisado: self.revisado,
            foto_personal,
        }
    }
}
