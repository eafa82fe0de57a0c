// Season catalog: which sheet tabs exist and which selections combine them.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Store key remembering the last selection used.
pub const SELECTED_SEASON_KEY: &str = "pelada:v2:selectedSeason";

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("at least one season selection is required")]
    NoOptions,

    #[error("duplicate season selection `{0}`")]
    DuplicateOption(String),

    #[error("season selection `{0}` lists no seasons")]
    EmptyOption(String),

    #[error("season selection `{option}` references unknown season `{year}`")]
    UnknownSeason { option: String, year: String },
}

/// One season's tab in the published spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub year: String,
    pub gid: String,
    pub label: String,
}

/// A selectable view: one season, or several merged oldest-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionOption {
    pub value: String,
    pub label: String,
    pub years: Vec<String>,
}

impl SelectionOption {
    pub fn is_multi_season(&self) -> bool {
        self.years.len() > 1
    }
}

#[derive(Debug, Clone)]
pub struct SeasonCatalog {
    source_id: String,
    seasons: Vec<Season>,
    options: Vec<SelectionOption>,
}

impl SeasonCatalog {
    /// Build a catalog, checking that every option resolves to known seasons.
    ///
    /// `source_id` identifies the spreadsheet and scopes every cache key.
    pub fn new(
        source_id: impl Into<String>,
        seasons: Vec<Season>,
        options: Vec<SelectionOption>,
    ) -> Result<Self, CatalogError> {
        if options.is_empty() {
            return Err(CatalogError::NoOptions);
        }
        for (i, option) in options.iter().enumerate() {
            if options[..i].iter().any(|o| o.value == option.value) {
                return Err(CatalogError::DuplicateOption(option.value.clone()));
            }
            if option.years.is_empty() {
                return Err(CatalogError::EmptyOption(option.value.clone()));
            }
            if let Some(year) = option
                .years
                .iter()
                .find(|y| !seasons.iter().any(|s| &s.year == *y))
            {
                return Err(CatalogError::UnknownSeason {
                    option: option.value.clone(),
                    year: year.clone(),
                });
            }
        }
        Ok(Self {
            source_id: source_id.into(),
            seasons,
            options,
        })
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn options(&self) -> &[SelectionOption] {
        &self.options
    }

    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }

    /// Look up a selection; unknown values fall back to the first option.
    pub fn option(&self, value: &str) -> &SelectionOption {
        match self.options.iter().find(|o| o.value == value) {
            Some(option) => option,
            None => {
                let fallback = &self.options[0];
                warn!(
                    "unknown season selection '{}', using '{}'",
                    value, fallback.value
                );
                fallback
            }
        }
    }

    /// Seasons for an option, in the option's year order.
    pub fn seasons_for(&self, option: &SelectionOption) -> Vec<&Season> {
        option
            .years
            .iter()
            .filter_map(|y| self.seasons.iter().find(|s| &s.year == y))
            .collect()
    }

    pub fn cache_key(&self, value: &str) -> String {
        format!("pelada:v2:players:{}:{}", self.source_id, value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
