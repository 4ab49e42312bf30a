/// Run-fatal failures. Anything here aborts the run before an artifact is
/// produced; per-slot fetch problems are not errors but
/// [`coverscan_model::Diagnostic`]s on the run result.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server rejected the API key")]
    InvalidApiKey,

    #[error("API error: {status} while {context}")]
    Api { status: u16, context: String },

    #[error("no enabled user found on the server")]
    NoUsers,

    #[error("library '{0}' not found")]
    LibraryNotFound(String),

    #[error("invalid run options: {0}")]
    InvalidOptions(String),

    #[error("invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
