// Library root: the season data pipeline behind the pelada dashboard.
//
// raw CSV text -> decode -> map -> filter -> merge -> cache gateway

pub mod csv_decode;
pub mod gateway;
pub mod merge;
pub mod player;
pub mod season;
pub mod source;
pub mod stats;
pub mod store;

pub use gateway::{LoadError, Loaded, Origin, PlayerGateway, RefreshHandle};
pub use player::{PlayerRecord, Skills};
pub use season::{Season, SeasonCatalog, SelectionOption};
pub use source::{FetchError, SeasonSource};
pub use store::{CacheStore, Database};
