// End-to-end tests: fixture CSV sheets through the gateway into the cache.

use std::path::PathBuf;

use async_trait::async_trait;
use pelada_core::player::parse_season;
use pelada_core::stats;
use pelada_core::{
    CacheStore, Database, FetchError, Origin, PlayerGateway, PlayerRecord, Season,
    SeasonCatalog, SeasonSource, SelectionOption,
};

const FIXTURES: &str = "tests/fixtures";

fn fixture_path(year: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join(FIXTURES)
        .join(format!("season_{year}.csv"))
}

fn fixture(year: &str) -> String {
    std::fs::read_to_string(fixture_path(year)).unwrap()
}

/// Reads season sheets from the fixtures directory.
struct FixtureSheets;

#[async_trait]
impl SeasonSource for FixtureSheets {
    async fn fetch_csv(&self, season: &Season) -> Result<String, FetchError> {
        std::fs::read_to_string(fixture_path(&season.year)).map_err(|e| FetchError::Transport {
            season: season.year.clone(),
            message: e.to_string(),
        })
    }
}

fn catalog() -> SeasonCatalog {
    let season = |year: &str, gid: &str| Season {
        year: year.into(),
        gid: gid.into(),
        label: year.into(),
    };
    let option = |value: &str, label: &str, years: &[&str]| SelectionOption {
        value: value.into(),
        label: label.into(),
        years: years.iter().map(|y| y.to_string()).collect(),
    };
    SeasonCatalog::new(
        "fixture-sheet",
        vec![season("2025", "557483612"), season("2026", "19389941"), season("2030", "0")],
        vec![
            option("2026", "Season 2026", &["2026"]),
            option("2025", "Season 2025", &["2025"]),
            option("2025_2026", "2025 + 2026", &["2025", "2026"]),
            option("2030", "Season 2030", &["2030"]),
        ],
    )
    .unwrap()
}

fn names(players: &[PlayerRecord]) -> Vec<&str> {
    players.iter().map(|p| p.name.as_str()).collect()
}

#[test]
fn season_2025_fixture_parses() {
    let players = parse_season(&fixture("2025"));
    assert_eq!(names(&players), vec!["Ana", "Silva, Bruno", "Dida", "Caio"]);

    let dida = &players[2];
    assert!(dida.is_goalkeeper());
    assert_eq!(dida.goals, 11);
    assert_eq!(dida.skills.sum(), 0.0);
}

#[test]
fn season_2026_fixture_uses_unaccented_headers() {
    let players = parse_season(&fixture("2026"));
    assert_eq!(names(&players), vec!["ANA", "Silva, Bruno", "Dida", "Edu"]);

    assert!((players[0].skills.finishing - 60.5).abs() < 1e-9);
    assert_eq!(players[2].saves, 14);
    assert_eq!(players[2].position, "GOL");
    assert_eq!(players[3].position, "ATA");
}

#[tokio::test]
async fn merged_selection_combines_both_fixtures() {
    let gw = PlayerGateway::new(FixtureSheets, Database::open(":memory:").unwrap(), catalog());

    let loaded = gw.load("2025_2026").await.unwrap();
    assert_eq!(loaded.origin, Origin::Network);
    assert_eq!(
        names(&loaded.players),
        vec!["Ana", "Silva, Bruno", "Dida", "Caio", "Edu"]
    );

    let ana = &loaded.players[0];
    assert_eq!(ana.attendances, 15);
    assert_eq!(ana.goals, 6);
    assert!((ana.skills.pace - 70.0).abs() < 1e-9);
    assert!((ana.skills.finishing - (70.0 * 10.0 + 60.5 * 5.0) / 15.0).abs() < 1e-9);
    assert_eq!(ana.position, "MEIO");

    let bruno = &loaded.players[1];
    assert_eq!(bruno.attendances, 12);
    assert!((bruno.skills.pace - 77.0).abs() < 1e-9);
    assert_eq!(bruno.position, "MEIO");

    let dida = &loaded.players[2];
    assert_eq!(dida.goals, 16);
    assert_eq!(dida.saves, 14);

    let scorers: Vec<&str> = stats::goal_ranking(&loaded.players)
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(scorers, vec!["Silva, Bruno", "Ana", "Edu", "Caio"]);
}

#[tokio::test]
async fn second_load_is_served_from_cache() {
    let gw = PlayerGateway::new(FixtureSheets, Database::open(":memory:").unwrap(), catalog());

    let cold = gw.load("2025").await.unwrap();
    assert_eq!(cold.origin, Origin::Network);

    let warm = gw.load("2025").await.unwrap();
    assert_eq!(warm.origin, Origin::Cache);
    assert_eq!(warm.players, cold.players);
    warm.refresh.unwrap().wait().await;
}

#[tokio::test]
async fn missing_fixture_fails_cold_load() {
    let gw = PlayerGateway::new(FixtureSheets, Database::open(":memory:").unwrap(), catalog());

    assert!(gw.load("2030").await.is_err());
    let key = gw.catalog().cache_key("2030");
    assert_eq!(gw.store().get(&key).unwrap(), None);
}
