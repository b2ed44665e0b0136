//! HTTP server for the pacientes record backend.

pub mod config;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod service;
pub mod uploads;

pub use config::{AppConfig, load_config};
pub use server::{PacientesServer, ServerBuilder, build_app, build_app_with_store};
pub use service::PacienteService;
pub use uploads::FileIntake;
