// Google Sheets "publish to web" CSV client.

use async_trait::async_trait;
use pelada_core::{FetchError, Season, SeasonSource};
use reqwest::header::CACHE_CONTROL;
use tracing::debug;

use crate::config::SheetConfig;

/// Fetches season tabs of a published spreadsheet as CSV.
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    published_id: String,
}

impl SheetsClient {
    pub fn new(sheet: &SheetConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: sheet.base_url.trim_end_matches('/').to_string(),
            published_id: sheet.published_id.clone(),
        }
    }

    /// CSV export URL for one tab (`gid`) of the published sheet.
    pub fn csv_url(&self, gid: &str) -> String {
        format!(
            "{}/{}/pub?gid={}&single=true&output=csv",
            self.base_url, self.published_id, gid
        )
    }
}

#[async_trait]
impl SeasonSource for SheetsClient {
    async fn fetch_csv(&self, season: &Season) -> Result<String, FetchError> {
        let url = self.csv_url(&season.gid);
        debug!(season = %season.year, %url, "fetching season sheet");

        let transport = |e: reqwest::Error| FetchError::Transport {
            season: season.year.clone(),
            message: e.to_string(),
        };

        let response = self
            .http
            .get(&url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                season: season.year.clone(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(transport)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
