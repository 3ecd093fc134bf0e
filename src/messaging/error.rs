//! Errori del dominio messaggi

use std::borrow::Cow;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

#[derive(Debug, Error)]
pub enum MessagingError {
    /// Input non valido, con il motivo per ogni campo
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// Autenticato ma non mittente, destinatario o amministratore del messaggio
    #[error("operation not allowed on message {0}")]
    Forbidden(i32),
    #[error("message {0} not found")]
    NotFound(i32),
    #[error("message store failure: {0}")]
    Store(#[from] sqlx::Error),
}

impl MessagingError {
    /// Errore di validazione su un singolo campo
    pub fn invalid_field(field: &'static str, code: &'static str, message: &'static str) -> Self {
        let mut error = ValidationError::new(code);
        error.message = Some(Cow::Borrowed(message));
        let mut errors = ValidationErrors::new();
        errors.add(field, error);
        MessagingError::Validation(errors)
    }

    /// Per le letture e le cancellazioni un Forbidden viene presentato come NotFound,
    /// così non si rivela l'esistenza del messaggio
    pub fn conceal_forbidden(self) -> Self {
        match self {
            MessagingError::Forbidden(id) => MessagingError::NotFound(id),
            other => other,
        }
    }
}

pub type MessagingResult<T> = Result<T, MessagingError>;
