use thiserror::Error;

/// Structural problems with a config bundle. Bad content inside a well-formed
/// bundle never produces one of these; it is coerced or skipped with a
/// warning instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config bundle: {0}")]
    Io(#[from] std::io::Error),

    #[error("config bundle is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config bundle must be a JSON object of tables")]
    NotAnObject,

    #[error("table `{0}` must be an array of rows")]
    TableNotArray(String),
}
