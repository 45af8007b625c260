pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Invalid document: {message}")]
    InvalidDocument { message: String },

    #[error("Unknown layout mode: {mode} (expected `hierarchical` or `radial`)")]
    UnknownMode { mode: String },
}
