use thiserror::Error;

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    CoreError(#[from] almanac_core::error::CoreError),

    #[error(transparent)]
    EngineError(#[from] almanac_engine::EngineError),

    #[error("Feed request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Feed responded with status {0}")]
    UpstreamStatus(u16),

    #[error("Invalid feed URL {url}: {reason}")]
    InvalidFeedUrl { url: String, reason: String },

    #[error("No event feed is configured")]
    NoFeed,

    #[error("Refresh was superseded by a newer one")]
    Superseded,

    #[error("Fetch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Invalid message catalog: {0}")]
    Catalog(#[from] config::ConfigError),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
