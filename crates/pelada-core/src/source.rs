// Where season CSV text comes from.

use async_trait::async_trait;
use thiserror::Error;

use crate::season::Season;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to download season {season}: {message}")]
    Transport { season: String, message: String },

    #[error("season {season} sheet returned HTTP {status}")]
    Status { season: String, status: u16 },
}

/// Fetches the raw CSV export for a season.
#[async_trait]
pub trait SeasonSource: Send + Sync {
    async fn fetch_csv(&self, season: &Season) -> Result<String, FetchError>;
}
