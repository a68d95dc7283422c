/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rate limited by AniList after {attempts} attempt(s)")]
    RateLimited { attempts: u32 },

    #[error("AniList is down, please try again later")]
    ServiceUnavailable,

    #[error("External API error: {0}")]
    ExternalApi(String),
}

impl AppError {
    /// Whether the error is a transport-level failure that ends the run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::HttpClient(_) | AppError::Io(_) | AppError::ExternalApi(_)
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;
