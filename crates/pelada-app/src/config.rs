// Configuration loading and parsing (config/pelada.toml).

use std::path::{Path, PathBuf};

use pelada_core::{Season, SeasonCatalog, SelectionOption};
use serde::Deserialize;
use thiserror::Error;

/// Shipped defaults, written to `config/pelada.toml` on first run.
pub const DEFAULT_CONFIG: &str = include_str!("../defaults/pelada.toml");

const CONFIG_FILE: &str = "pelada.toml";
const FALLBACK_CACHE_PATH: &str = "pelada-cache.db";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub sheet: SheetConfig,
    pub catalog: SeasonCatalog,
    pub cache_path: String,
    pub default_selection: Option<String>,
}

// ---------------------------------------------------------------------------
// pelada.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the whole file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    sheet: SheetConfig,
    seasons: Vec<Season>,
    selections: Vec<SelectionOption>,
    #[serde(default)]
    cache: CacheSection,
    #[serde(default)]
    default_selection: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetConfig {
    /// The `2PACX-...` id of the published spreadsheet; also scopes cache keys.
    pub published_id: String,
    /// Editor document id. Informational only.
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CacheSection {
    path: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/pelada.toml` relative to `base_dir`.
///
/// Does not create the file; see [`load_config`].
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound {
        path: path.clone(),
    })?;
    parse_config(&text, &path)
}

/// Parse and validate configuration text. `path` is only used in errors.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let file: ConfigFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    validate_sheet(&file.sheet)?;

    let catalog = SeasonCatalog::new(file.sheet.published_id.clone(), file.seasons, file.selections)
        .map_err(|e| ConfigError::ValidationError {
            field: "selections".into(),
            message: e.to_string(),
        })?;

    if let Some(value) = &file.default_selection {
        if !catalog.contains(value) {
            return Err(ConfigError::ValidationError {
                field: "default_selection".into(),
                message: format!("`{value}` is not one of the configured selections"),
            });
        }
    }

    Ok(Config {
        sheet: file.sheet,
        catalog,
        cache_path: file.cache.path.unwrap_or_else(default_cache_path),
        default_selection: file.default_selection,
    })
}

/// Write the shipped defaults to `config/pelada.toml` unless it already
/// exists. Returns `true` when the file was created.
pub fn ensure_config_file(base_dir: &Path) -> Result<bool, ConfigError> {
    let config_dir = base_dir.join("config");
    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let target = config_dir.join(CONFIG_FILE);
    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(mut dest) => {
            std::io::Write::write_all(&mut dest, DEFAULT_CONFIG.as_bytes()).map_err(|e| {
                ConfigError::DefaultsCopyError {
                    message: format!("failed to write {}: {e}", target.display()),
                }
            })?;
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", target.display()),
        }),
    }
}

/// Convenience wrapper: loads config relative to the current working directory,
/// writing the defaults first when no config exists.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `<data dir>/cache.db` for the platform, or a file in the working directory
/// when no home directory can be determined.
fn default_cache_path() -> String {
    directories::ProjectDirs::from("", "", "pelada")
        .map(|dirs| dirs.data_dir().join("cache.db"))
        .and_then(|p| p.to_str().map(str::to_string))
        .unwrap_or_else(|| FALLBACK_CACHE_PATH.to_string())
}

fn validate_sheet(sheet: &SheetConfig) -> Result<(), ConfigError> {
    let fields: &[(&str, &str)] = &[
        ("sheet.published_id", sheet.published_id.as_str()),
        ("sheet.base_url", sheet.base_url.as_str()),
    ];
    for (name, val) in fields {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    if !sheet.base_url.starts_with("http://") && !sheet.base_url.starts_with("https://") {
        return Err(ConfigError::ValidationError {
            field: "sheet.base_url".into(),
            message: format!("must be an http(s) URL, got {}", sheet.base_url),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Config, ConfigError> {
        parse_config(text, Path::new("test.toml"))
    }

    const MINIMAL: &str = r#"
[sheet]
published_id = "2PACX-abc"
base_url = "https://docs.google.com/spreadsheets/d/e"

[cache]
path = "cache.db"

[[seasons]]
year = "2025"
gid = "1"
label = "2025"

[[selections]]
value = "2025"
label = "Season 2025"
years = ["2025"]
"#;

    #[test]
    fn shipped_defaults_are_valid() {
        let config = parse(DEFAULT_CONFIG).expect("defaults should parse");
        assert_eq!(config.default_selection.as_deref(), Some("2026"));
        assert_eq!(config.catalog.options().len(), 3);
        assert_eq!(config.catalog.options()[0].value, "2026");
        assert!(config.sheet.published_id.starts_with("2PACX-"));

        let both = config.catalog.option("2025_2026");
        let gids: Vec<&str> = config
            .catalog
            .seasons_for(both)
            .iter()
            .map(|s| s.gid.as_str())
            .collect();
        assert_eq!(gids, vec!["557483612", "19389941"]);
    }

    #[test]
    fn minimal_config_parses() {
        let config = parse(MINIMAL).unwrap();
        assert_eq!(config.cache_path, "cache.db");
        assert!(config.default_selection.is_none());
        assert!(config.sheet.spreadsheet_id.is_none());
        assert_eq!(
            config.catalog.cache_key("2025"),
            "pelada:v2:players:2PACX-abc:2025"
        );
    }

    #[test]
    fn missing_cache_path_gets_a_default() {
        let text = MINIMAL.replace("[cache]\npath = \"cache.db\"\n", "");
        let config = parse(&text).unwrap();
        assert!(config.cache_path.ends_with(".db"));
    }

    #[test]
    fn empty_published_id_rejected() {
        let text = MINIMAL.replace("2PACX-abc", "");
        let err = parse(&text).unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { ref field, .. } if field == "sheet.published_id")
        );
    }

    #[test]
    fn non_http_base_url_rejected() {
        let text = MINIMAL.replace("https://docs.google.com/spreadsheets/d/e", "ftp://x");
        assert!(matches!(
            parse(&text).unwrap_err(),
            ConfigError::ValidationError { ref field, .. } if field == "sheet.base_url"
        ));
    }

    #[test]
    fn selection_with_unknown_year_rejected() {
        let text = MINIMAL.replace("years = [\"2025\"]", "years = [\"2024\"]");
        let err = parse(&text).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ValidationError { ref field, .. } if field == "selections"
        ));
        assert!(err.to_string().contains("2024"));
    }

    #[test]
    fn unknown_default_selection_rejected() {
        let text = format!("default_selection = \"1999\"\n{MINIMAL}");
        assert!(matches!(
            parse(&text).unwrap_err(),
            ConfigError::ValidationError { ref field, .. } if field == "default_selection"
        ));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(matches!(
            parse("[sheet\npublished_id = 1").unwrap_err(),
            ConfigError::ParseError { .. }
        ));
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_config_from(tmp.path()).unwrap_err(),
            ConfigError::FileNotFound { .. }
        ));
    }

    #[test]
    fn ensure_config_file_writes_defaults_once() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(ensure_config_file(tmp.path()).unwrap());

        let path = tmp.path().join("config").join(CONFIG_FILE);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);

        // A user-edited file is never overwritten.
        std::fs::write(&path, MINIMAL).unwrap();
        assert!(!ensure_config_file(tmp.path()).unwrap());
        let config = load_config_from(tmp.path()).unwrap();
        assert_eq!(config.catalog.options()[0].value, "2025");
    }
}
