//! Error Types for Market Analytics

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MarketError>;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("Market data provider error: {0}")]
    Provider(String),

    #[error("Market data provider returned HTTP {status} for {endpoint}")]
    Http {
        status: u16,
        endpoint: String,
    },

    #[error("Asset not supported: {0}")]
    UnknownAsset(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Favorites store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MarketError {
    /// Message suitable for showing on the dashboard
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(_) | Self::Http { .. } | Self::Network(_) => {
                "Market data is currently unavailable. Please try again.".into()
            }
            Self::UnknownAsset(id) => format!("The asset '{id}' is not available."),
            Self::InvalidPeriod(p) => format!("'{p}' is not a supported period."),
            Self::Store(_) | Self::Io(_) => "Favorites could not be saved.".into(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}
