/// Core error types for FinTrack
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for FinTrack
///
/// These errors never come from the network; they are raised by form
/// validation and client-side rules before a request is issued.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A required form field was left blank
    #[error("El campo '{0}' es obligatorio")]
    MissingField(&'static str),

    /// Amount was zero, negative or not a finite number
    #[error("La cantidad debe ser un número positivo")]
    NonPositiveAmount,

    /// End date precedes start date
    #[error("La fecha de fin debe ser posterior a la fecha de inicio")]
    InvalidDateRange,

    /// Deleting the category would leave fewer than the required minimum
    #[error("Se requieren como mínimo {minimum} categorías.")]
    TooFewCategories {
        /// Minimum number of categories that must remain
        minimum: usize,
    },
}
