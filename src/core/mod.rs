//! Core Module - Componenti infrastrutturali dell'applicazione
//!
//! Questo modulo contiene tutti i componenti "core" dell'applicazione:
//! - Identità verificata della richiesta
//! - Configurazione
//! - Gestione errori
//! - Stato applicazione

pub mod config;
pub mod error;
pub mod identity;
pub mod state;

// Re-exports per facilitare l'import
pub use config::{ChatConfig, Config};
pub use error::AppError;
pub use identity::{Identity, identity_middleware};
pub use state::AppState;
