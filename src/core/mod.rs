//! Core Module - Componenti infrastrutturali dell'applicazione
//!
//! Questo modulo contiene tutti i componenti "core" dell'applicazione:
//! - Autenticazione e JWT (identity resolver)
//! - Configurazione
//! - Gestione errori
//! - Stato applicazione
//! - Token CSRF e sanitizzazione del testo

pub mod auth;
pub mod config;
pub mod csrf;
pub mod error;
pub mod sanitize;
pub mod state;

// Re-exports per facilitare l'import
pub use auth::{Claims, authentication_middleware, decode_jwt, encode_jwt, require_administrator};
pub use config::Config;
pub use csrf::CsrfGuard;
pub use error::AppError;
pub use state::AppState;
