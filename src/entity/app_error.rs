#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Failed to decode {entity}: {source}")]
    Decode {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Authentication failed: {0}")]
    AuthRejected(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Account is blocked")]
    AccountBlocked,

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Invalid wallet address")]
    InvalidWallet,

    #[error("Price feed error: {0}")]
    PriceFeed(String),

    #[error("Session storage error: {0}")]
    SessionStorage(#[from] std::io::Error),
}
