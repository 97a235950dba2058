//! Error types for the FinTrack client and the central error translator.

use fintrack_core::CoreError;
use thiserror::Error;

/// Errors that can occur when talking to the FinTrack API.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed without a response
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),

    /// No response within the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Server answered with a non-success status
    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Http {
        status: u16,
        /// Message extracted from the error body, if any
        message: Option<String>,
    },

    /// Envelope came back with `success: false` (or without data)
    #[error("{0}")]
    Api(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted session could not be read or written
    #[error("Session storage error: {0}")]
    Storage(String),

    /// Rejected by the development mock backend
    #[error("{0}")]
    InvalidCredentials(String),

    /// Form failed client-side validation
    #[error(transparent)]
    Validation(#[from] CoreError),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// No HTTP response was received
    pub fn is_connectivity(&self) -> bool {
        match self {
            Self::ServerUnreachable(_) | Self::Timeout => true,
            Self::Request(e) => e.status().is_none(),
            _ => false,
        }
    }

    /// 5xx response
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(s) if s >= 500)
    }

    /// 401 response
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Human-readable message for display; see [`handle_api_error`]
    pub fn user_message(&self) -> String {
        handle_api_error(self)
    }
}

/// Translate any client error into one human-readable string.
///
/// HTTP errors map by status; errors without a response map to a
/// connectivity message; everything else carries its own message.
pub fn handle_api_error(error: &ClientError) -> String {
    match error {
        ClientError::ServerUnreachable(_) => {
            "Error de conexión. Verifica tu conexión a internet.".to_string()
        }
        ClientError::Timeout => {
            "La solicitud ha excedido el tiempo límite. Intenta nuevamente.".to_string()
        }
        ClientError::Request(e) if e.is_timeout() => {
            "La solicitud ha excedido el tiempo límite. Intenta nuevamente.".to_string()
        }
        ClientError::Request(e) if e.is_connect() => {
            "Error de conexión. Verifica tu conexión a internet.".to_string()
        }
        ClientError::Request(e) => match e.status() {
            Some(status) => status_message(status.as_u16(), None),
            None => "Error de conexión con el servidor".to_string(),
        },
        ClientError::Http { status, message } => status_message(*status, message.as_deref()),
        ClientError::ParseError(_) => {
            "Respuesta inválida del servidor. Intenta más tarde.".to_string()
        }
        other => other.to_string(),
    }
}

fn status_message(status: u16, message: Option<&str>) -> String {
    let or = |default: &str| message.unwrap_or(default).to_string();
    match status {
        400 => or("Datos de solicitud inválidos"),
        401 => "Credenciales inválidas o sesión expirada".to_string(),
        403 => "No tienes permisos para realizar esta acción".to_string(),
        404 => "Recurso no encontrado".to_string(),
        409 => or("Conflicto con los datos existentes"),
        422 => or("Datos de validación incorrectos"),
        500 => "Error interno del servidor. Intenta más tarde.".to_string(),
        502..=504 => "Servidor temporalmente no disponible. Intenta más tarde.".to_string(),
        _ => message
            .map(str::to_string)
            .unwrap_or_else(|| format!("Error del servidor ({status})")),
    }
}
