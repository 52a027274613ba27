// ============================================================================
// ERRORES - Taxonomía de errores de la aplicación
// ============================================================================

use thiserror::Error;

/// Error de la aplicación
///
/// `Validation` se resuelve siempre antes de emitir cualquier request.
/// `Auth` sobre una llamada protegida fuerza el logout (ver `ApiClient`).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    #[error("Error de autenticación: {0}")]
    Auth(String),
    #[error("{0}")]
    Validation(String),
    #[error("Sin permiso: {0}")]
    Permission(String),
    #[error("No encontrado: {0}")]
    NotFound(String),
    #[error("Error de red: {0}")]
    Network(String),
    #[error("Error al activar la cuenta: {0}")]
    Acceptance(String),
    #[error("Operación en curso: {0}")]
    Busy(String),
    #[error("Error del servidor ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("Error de formato: {0}")]
    Parse(String),
    #[error("Error de almacenamiento local: {0}")]
    Storage(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Mensaje transitorio para mostrar al usuario
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Auth(msg) if msg.is_empty() => "Sesión inválida o expirada".to_string(),
            AppError::Network(_) => "No se pudo conectar con el servidor".to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, AppError::Auth(_))
    }

    pub fn is_permission(&self) -> bool {
        matches!(self, AppError::Permission(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::Parse(error.to_string())
    }
}
