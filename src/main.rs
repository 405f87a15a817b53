//! Binary entrypoint for the stamprally CLI.
//!
//! Commands:
//! - `init` - create a starter `config.toml` and quest list
//! - `status` - print collected stamps and the per-quest checklist
//! - `quests` - list the configured quests
//! - `scan <index>` - run a scan session for a quest (1-based index)
//! - `reset` - wipe all recorded progress
//!
//! See the library crate docs for module-level details: `stamprally::`.
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use stamprally::config::Config;
use stamprally::hunt::{AttemptOutcome, HuntService};
use stamprally::progress::ProgressStore;
use stamprally::quests::{starter_quests, write_quest_file, JsonQuestFile};
use stamprally::scanner::console::{ConsoleCamera, ConsoleSink, LineDetector, PresetDetector};
use stamprally::scanner::CancelToken;
use stamprally::storage::SledSlot;

#[derive(Parser)]
#[command(name = "stamprally")]
#[command(about = "A QR scavenger-hunt progress tracker")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a starter configuration and quest list
    Init,
    /// Show collected stamps and per-quest completion
    Status,
    /// List the configured quests
    Quests,
    /// Scan a code for a quest (1-based index as shown by `quests`)
    Scan {
        index: usize,

        /// Supply the code directly instead of entering it interactively
        #[arg(long)]
        code: Option<String>,
    },
    /// Reset all recorded progress to zero
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config early to configure logging (except for Init which writes it)
    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Init => init_command(&cli.config).await,
        Commands::Status => {
            let (config, store) = open_hunt(&cli.config, pre_config).await?;
            status_command(&config, &store);
            Ok(())
        }
        Commands::Quests => {
            let (_config, store) = open_hunt(&cli.config, pre_config).await?;
            quests_command(&store);
            Ok(())
        }
        Commands::Scan { index, code } => {
            let (config, store) = open_hunt(&cli.config, pre_config).await?;
            scan_command(config, store, index, code).await
        }
        Commands::Reset => reset_command(&cli.config, pre_config).await,
    }
}

/// Write a starter `config.toml` plus the quest list it points at.
async fn init_command(config_path: &str) -> Result<()> {
    if Path::new(config_path).exists() {
        bail!("{config_path} already exists; refusing to overwrite");
    }
    Config::create_default(config_path).await?;
    let config = Config::load(config_path).await?;

    tokio::fs::create_dir_all(&config.storage.data_dir)
        .await
        .with_context(|| format!("creating data dir {}", config.storage.data_dir))?;
    if Path::new(&config.hunt.quests_file).exists() {
        warn!("{} already exists; keeping it", config.hunt.quests_file);
    } else {
        write_quest_file(&config.hunt.quests_file, &starter_quests())
            .with_context(|| format!("writing {}", config.hunt.quests_file))?;
    }

    println!("Created {config_path}");
    println!("Created {} with 3 starter quests", config.hunt.quests_file);
    println!("Edit the quest list, then run: stamprally status");
    Ok(())
}

/// Load config, open the progress slot, and load the quest list. A quest
/// load failure is fatal here: no quest interaction is permitted without it.
async fn open_hunt(config_path: &str, pre_config: Option<Config>) -> Result<(Config, ProgressStore)> {
    let config = match pre_config {
        Some(config) => config,
        None => Config::load(config_path).await?,
    };

    let db_path = Path::new(&config.storage.data_dir).join("progress");
    let slot = SledSlot::open(&db_path)
        .with_context(|| format!("opening progress database at {}", db_path.display()))?;
    let mut store = ProgressStore::new(Box::new(slot))?;

    store
        .load(&JsonQuestFile::new(&config.hunt.quests_file))
        .context("quest list unavailable; the hunt cannot start")?;
    Ok((config, store))
}

fn status_command(config: &Config, store: &ProgressStore) {
    println!("=== {} ===", config.hunt.name);
    println!(
        "You have collected {} / {} stamps!",
        store.completed_count(),
        store.quest_count()
    );
    for (index, quest) in store.quests().iter().enumerate() {
        let mark = if store.is_complete(index) { "x" } else { " " };
        println!("  [{}] {}. {}", mark, index + 1, quest.name);
    }
}

fn quests_command(store: &ProgressStore) {
    for (index, quest) in store.quests().iter().enumerate() {
        println!("{}. {}", index + 1, quest.name);
        if !quest.description.is_empty() {
            println!("   {}", quest.description);
        }
    }
}

async fn scan_command(
    config: Config,
    store: ProgressStore,
    display_index: usize,
    code: Option<String>,
) -> Result<()> {
    if display_index == 0 || display_index > store.quest_count() {
        bail!(
            "quest index must be between 1 and {} (see `stamprally quests`)",
            store.quest_count()
        );
    }
    let index = display_index - 1;

    let total = store.quest_count();
    let mut hunt = HuntService::new(store, config.scanner.scan_options());
    let quest = match hunt.open_challenge(index) {
        Some(quest) => quest.clone(),
        None => bail!("quest {display_index} not found"),
    };

    let token = CancelToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received cancel signal");
            canceller.cancel();
        }
    });

    let mut camera = ConsoleCamera;
    let mut sink = ConsoleSink::default();
    let outcome = match code {
        Some(code) => {
            let mut detector = PresetDetector::new(code);
            hunt.attempt(index, &mut camera, &mut sink, &mut detector, &token)
                .await?
        }
        None => {
            println!("Scanning for: {}", quest.name);
            println!("Enter the code (blank line to keep scanning, Ctrl-C to cancel):");
            let mut detector = LineDetector::new();
            hunt.attempt(index, &mut camera, &mut sink, &mut detector, &token)
                .await?
        }
    };

    match outcome {
        AttemptOutcome::Completed => {
            println!("Code matched! Quest {display_index} complete.");
            println!(
                "You have collected {} / {} stamps!",
                hunt.store().completed_count(),
                total
            );
        }
        AttemptOutcome::AlreadyComplete => {
            println!("Quest {display_index} was already completed!");
        }
        AttemptOutcome::Mismatch { .. } => {
            println!("Code mismatch or invalid for this quest. Please try again!");
        }
        AttemptOutcome::Cancelled => {
            println!("Scan cancelled.");
        }
    }
    Ok(())
}

/// Reset works even when the quest list is missing or broken, so it opens
/// the slot directly instead of going through `open_hunt`.
async fn reset_command(config_path: &str, pre_config: Option<Config>) -> Result<()> {
    let config = match pre_config {
        Some(config) => config,
        None => Config::load(config_path).await?,
    };
    let db_path = Path::new(&config.storage.data_dir).join("progress");
    let slot = SledSlot::open(&db_path)
        .with_context(|| format!("opening progress database at {}", db_path.display()))?;
    let mut store = ProgressStore::new(Box::new(slot))?;
    store.reset()?;
    println!("All quest progress has been reset!");
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // Base level from CLI verbosity overrides config
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|cfg| cfg.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    if let Some(file) = config.as_ref().and_then(|cfg| cfg.logging.file.clone()) {
        if let Ok(f) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file)
        {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));

            // If stdout is a terminal, echo log lines to the console as well
            // as the file.
            let is_tty = atty::is(atty::Stream::Stdout);

            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());

                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }

                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
    }

    let _ = builder.try_init();
}
