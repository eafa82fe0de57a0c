// Pelada stats entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log to file; stdout carries the report)
// 3. Load config
// 4. Open the cache database
// 5. Resolve the season selection
// 6. Load players and print the requested page
// 7. Give a pending background refresh time to land in the cache

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pelada_app::config;
use pelada_app::http::SheetsClient;
use pelada_app::report;
use pelada_core::stats;
use pelada_core::{Database, Loaded, PlayerGateway};
use tracing::{info, warn};

const REFRESH_GRACE: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "pelada")]
#[command(about = "Season stats for the pelada group, from the published sheet", long_about = None)]
struct Cli {
    /// Season selection (see `pelada seasons`)
    #[arg(long, global = true)]
    season: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Totals and highlights
    Home,

    /// Top scorers (goalkeepers excluded)
    Goals {
        /// Show only the first N players
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Most frequent players
    Attendance {
        /// Show only the first N players
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Goals per game, top ten outfield players
    Efficiency,

    /// Player roster, or one player's profile
    Players {
        /// Player to show
        #[arg(long)]
        name: Option<String>,
    },

    /// List the configured season selections
    Seasons,

    /// Write the selected dataset as CSV
    Export {
        /// Output CSV file path
        #[arg(long)]
        out: PathBuf,
    },

    /// Delete cached datasets (only the `--season` one when given)
    ClearCache,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Parse arguments
    let cli = Cli::parse();

    // 2. Initialize tracing
    init_tracing()?;
    info!("pelada starting up");

    // 3. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: sheet={}, {} selections",
        config.catalog.source_id(),
        config.catalog.options().len()
    );

    // 4. Open the cache database
    ensure_parent_dir(Path::new(&config.cache_path))?;
    let db = Database::open(&config.cache_path).context("failed to open cache database")?;
    info!("Cache database opened at {}", config.cache_path);

    let client = SheetsClient::new(&config.sheet);
    let gateway = PlayerGateway::new(client, db, config.catalog.clone());

    match &cli.command {
        Commands::Seasons => {
            let catalog = gateway.catalog();
            let rows: Vec<_> = catalog
                .options()
                .iter()
                .map(|option| {
                    let key = catalog.cache_key(&option.value);
                    let updated_at = gateway.store().updated_at(&key).unwrap_or_else(|e| {
                        warn!("failed to read cache timestamp for '{}': {e:#}", option.value);
                        None
                    });
                    (option, updated_at)
                })
                .collect();
            print!("{}", report::render_seasons(&rows));
            return Ok(());
        }
        Commands::ClearCache => {
            match &cli.season {
                Some(selection) => {
                    let option = gateway.catalog().option(selection);
                    let key = gateway.catalog().cache_key(&option.value);
                    gateway
                        .store()
                        .remove(&key)
                        .context("failed to clear cache")?;
                    println!("Removed cached data for {}", option.label);
                }
                None => {
                    let removed = gateway.store().clear().context("failed to clear cache")?;
                    println!("Removed {removed} cached entries");
                }
            }
            return Ok(());
        }
        _ => {}
    }

    // 5. Resolve the season selection
    let selection = cli
        .season
        .clone()
        .or_else(|| gateway.last_selection())
        .or_else(|| config.default_selection.clone())
        .unwrap_or_else(|| gateway.catalog().options()[0].value.clone());

    // 6. Load players and print
    let Loaded {
        option,
        players,
        refresh,
        ..
    } = gateway
        .load(&selection)
        .await
        .with_context(|| format!("failed to load season '{selection}'"))?;

    if let Err(e) = gateway.remember_selection(&option.value) {
        warn!("failed to remember selection: {e:#}");
    }

    match cli.command {
        Commands::Home => print!("{}", report::render_home(&option.label, &players)),
        Commands::Goals { limit } => {
            print!("{}", report::render_goals(&option.label, &players, limit))
        }
        Commands::Attendance { limit } => {
            print!("{}", report::render_attendance(&option.label, &players, limit))
        }
        Commands::Efficiency => {
            print!("{}", report::render_efficiency(&option.label, &players))
        }
        Commands::Players { name: Some(name) } => match stats::find_player(&players, &name) {
            Some(player) => print!("{}", report::render_player(player)),
            None => println!("No player named '{name}' in {}", option.label),
        },
        Commands::Players { name: None } => {
            print!("{}", report::render_roster(&option.label, &players))
        }
        Commands::Export { out } => {
            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            report::export_csv(file, &players)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Wrote {} players to {}", players.len(), out.display());
        }
        Commands::Seasons | Commands::ClearCache => {}
    }

    // 7. Let the background refresh finish (with timeout)
    if let Some(refresh) = refresh.filter(|r| !r.is_finished()) {
        info!("waiting for background refresh");
        if tokio::time::timeout(REFRESH_GRACE, refresh.wait())
            .await
            .is_err()
        {
            warn!("background refresh still running at exit; abandoning it");
        }
    }

    info!("pelada finished");
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

/// Initialize tracing to log to a file (stdout is used for reports).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("pelada.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("pelada=info,pelada_app=info,pelada_core=info,warn")
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
