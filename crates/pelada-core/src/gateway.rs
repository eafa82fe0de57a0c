// Stale-while-revalidate access to player datasets.
//
// A cached dataset is returned immediately and refreshed in a detached task;
// without one, the seasons are fetched (in parallel), parsed, merged, and
// stored before returning.

use std::sync::Arc;

use futures_util::future::try_join_all;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::merge::merge_seasons;
use crate::player::{parse_season, PlayerRecord};
use crate::season::{Season, SeasonCatalog, SelectionOption, SELECTED_SEASON_KEY};
use crate::source::{FetchError, SeasonSource};
use crate::store::CacheStore;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to encode dataset for the cache: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Where a loaded dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Network,
}

/// Handle to a detached background refresh. Dropping it does not cancel the
/// refresh.
#[derive(Debug)]
pub struct RefreshHandle(JoinHandle<()>);

impl RefreshHandle {
    pub fn is_finished(&self) -> bool {
        self.0.is_finished()
    }

    /// Wait for the refresh to finish. Its outcome only shows up in the cache.
    pub async fn wait(self) {
        if let Err(e) = self.0.await {
            warn!("background refresh task aborted: {e}");
        }
    }
}

#[derive(Debug)]
pub struct Loaded {
    /// The resolved selection (after unknown-value fallback).
    pub option: SelectionOption,
    pub players: Vec<PlayerRecord>,
    pub origin: Origin,
    /// Set when the players came from the cache and a refresh was spawned.
    pub refresh: Option<RefreshHandle>,
}

struct Inner<S, C> {
    source: S,
    store: C,
    catalog: SeasonCatalog,
}

impl<S: SeasonSource, C: CacheStore> Inner<S, C> {
    /// Fetch every season of `option`, merge, and overwrite the cache entry.
    async fn refresh(
        &self,
        option: &SelectionOption,
        key: &str,
    ) -> Result<Vec<PlayerRecord>, LoadError> {
        let seasons = self.catalog.seasons_for(option);
        let mut fetches = Vec::with_capacity(seasons.len());
        for season in seasons {
            fetches.push(self.fetch_season(season));
        }
        let datasets = try_join_all(fetches).await?;

        let players = merge_seasons(datasets);
        let json = serde_json::to_string(&players)?;
        if let Err(e) = self.store.set(key, &json) {
            warn!("failed to store dataset under {key}: {e:#}");
        }
        Ok(players)
    }

    async fn fetch_season(&self, season: &Season) -> Result<Vec<PlayerRecord>, FetchError> {
        let text = self.source.fetch_csv(season).await?;
        let players = parse_season(&text);
        debug!(season = %season.year, players = players.len(), "season fetched");
        Ok(players)
    }

    fn cached(&self, key: &str) -> Option<Vec<PlayerRecord>> {
        let json = match self.store.get(key) {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                warn!("failed to read cache entry {key}: {e:#}");
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(players) => Some(players),
            Err(e) => {
                warn!("discarding unreadable cache entry {key}: {e}");
                None
            }
        }
    }
}

/// Data access for the presentation layer.
pub struct PlayerGateway<S, C> {
    inner: Arc<Inner<S, C>>,
}

impl<S, C> Clone for PlayerGateway<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, C> PlayerGateway<S, C>
where
    S: SeasonSource + 'static,
    C: CacheStore + 'static,
{
    pub fn new(source: S, store: C, catalog: SeasonCatalog) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                store,
                catalog,
            }),
        }
    }

    pub fn catalog(&self) -> &SeasonCatalog {
        &self.inner.catalog
    }

    pub fn store(&self) -> &C {
        &self.inner.store
    }

    /// Load the dataset for `selection`.
    ///
    /// Warm: returns the cached dataset without touching the network and
    /// spawns a refresh whose failure is only logged. Cold: fetches all
    /// seasons; any fetch failure fails the load and nothing is stored.
    ///
    /// Must be called within a Tokio runtime.
    pub async fn load(&self, selection: &str) -> Result<Loaded, LoadError> {
        let option = self.inner.catalog.option(selection).clone();
        let key = self.inner.catalog.cache_key(&option.value);

        if let Some(players) = self.inner.cached(&key) {
            info!(
                "serving {} cached players for '{}', refreshing in background",
                players.len(),
                option.value
            );
            let refresh = self.spawn_refresh(option.clone(), key);
            return Ok(Loaded {
                option,
                players,
                origin: Origin::Cache,
                refresh: Some(refresh),
            });
        }

        let players = self.inner.refresh(&option, &key).await?;
        info!("loaded {} players for '{}'", players.len(), option.value);
        Ok(Loaded {
            option,
            players,
            origin: Origin::Network,
            refresh: None,
        })
    }

    fn spawn_refresh(&self, option: SelectionOption, key: String) -> RefreshHandle {
        let inner = Arc::clone(&self.inner);
        RefreshHandle(tokio::spawn(async move {
            match inner.refresh(&option, &key).await {
                Ok(players) => debug!(
                    "background refresh stored {} players for '{}'",
                    players.len(),
                    option.value
                ),
                Err(e) => warn!("background refresh for '{}' failed: {e}", option.value),
            }
        }))
    }

    /// Remember `value` as the last selection used.
    pub fn remember_selection(&self, value: &str) -> anyhow::Result<()> {
        self.inner.store.set(SELECTED_SEASON_KEY, value)
    }

    /// The last remembered selection, if it still names a known option.
    pub fn last_selection(&self) -> Option<String> {
        match self.inner.store.get(SELECTED_SEASON_KEY) {
            Ok(Some(value)) if self.inner.catalog.contains(&value) => Some(value),
            Ok(_) => None,
            Err(e) => {
                warn!("failed to read remembered selection: {e:#}");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
