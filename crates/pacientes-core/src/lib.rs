//! Core domain types and utilities for the pacientes server.

pub mod error;
pub mod fecha;
pub mod id;
pub mod paciente;

pub use error::{CoreError, Result};
pub use fecha::{FechaIngreso, hoy_utc, parse_fecha};
pub use id::generate_id;
pub use paciente::{Paciente, PacienteInput, PacienteValidado, REQUIRED_FIELDS};
