use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("No encontrado: {0}")]
    NotFound(String),
    #[error("Entrada inválida: {0}")]
    InvalidInput(String),
    #[error("Error de operación: {0}")]
    OperationFailed(String),
    #[error("No se pudo cargar el modelo: {0}")]
    ModelLoad(String),
    #[error("Cámara no disponible: {0}")]
    Capture(String),
    #[error("Fallo de inferencia: {0}")]
    Inference(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
