//! paper-heart CLI
//!
//! Open the card, or print what it says.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use paper_heart::audio::{default_player, resolve_track, CommandPlayer, Silent};
use paper_heart::content::{default_pages, load_pages, Page};
use paper_heart::report::{format_pages, OutputFormat};
use paper_heart::tui::run::{run, RunConfig};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "PAPER_HEART_LOG";

#[derive(Parser)]
#[command(name = "paper-heart")]
#[command(about = "A flipbook greeting card for the terminal")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Write logs to FILE
    #[arg(long, global = true, value_name = "FILE")]
    log: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    open: OpenArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the card (the default)
    Open(OpenArgs),

    /// Print the card's pages (no interaction)
    Pages {
        /// Page content file (default: the built-in book)
        #[arg(long)]
        pages: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormatArg,
    },
}

#[derive(Args)]
struct OpenArgs {
    /// Page content file (default: the built-in book)
    #[arg(long)]
    pages: Option<PathBuf>,

    /// Audio track to play
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Player program used for the audio track
    #[arg(long)]
    player: Option<String>,

    /// Open the card without music
    #[arg(long)]
    no_audio: bool,

    /// Width of a terminal column in pixels, for drag gestures
    #[arg(long, default_value_t = 8.0)]
    cell_width: f32,

    /// Seed for the random source
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormatArg {
    Human,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Some(Commands::Open(args)) => cmd_open(args),
        Some(Commands::Pages { pages, format }) => cmd_pages(pages, format.into()),
        None => cmd_open(cli.open),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// LOGGING
// ============================================================================

/// Install a file logger if asked to. The terminal belongs to the card, so
/// logs never go to stdout or stderr.
fn init_logging(log: Option<PathBuf>) -> Result<(), String> {
    let Some(path) = log else {
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("{}: {}", parent.display(), e))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("{}: {}", path.display(), e))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .init();

    tracing::info!(path = %path.display(), "logging started");
    Ok(())
}

// ============================================================================
// COMMANDS
// ============================================================================

fn resolve_pages(path: Option<PathBuf>) -> Result<Vec<Page>, String> {
    match path {
        Some(p) => load_pages(&p).map_err(|e| e.to_string()),
        None => Ok(default_pages()),
    }
}

fn cmd_open(args: OpenArgs) -> Result<(), String> {
    if !(args.cell_width > 0.0) {
        return Err(format!("--cell-width must be positive, got {}", args.cell_width));
    }

    let pages = resolve_pages(args.pages)?;
    let config = RunConfig {
        cell_width: args.cell_width,
        seed: args.seed,
    };

    let result = if args.no_audio {
        run(pages, Silent, config)
    } else {
        let player = args.player.unwrap_or_else(|| default_player().to_string());
        let track = resolve_track(args.audio);
        tracing::info!(%player, track = %track.display(), "opening card");
        run(pages, CommandPlayer::new(player, track), config)
    };

    result.map_err(|e| e.to_string())
}

fn cmd_pages(path: Option<PathBuf>, format: OutputFormat) -> Result<(), String> {
    let pages = resolve_pages(path)?;
    print!("{}", format_pages(&pages, format));
    if format == OutputFormat::Json {
        println!();
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
