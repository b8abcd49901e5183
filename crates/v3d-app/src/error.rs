use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),

    #[error("Graphics setup failed: {0}")]
    Graphics(String),

    #[error("Invalid service origin {0:?}")]
    InvalidOrigin(String),
}
