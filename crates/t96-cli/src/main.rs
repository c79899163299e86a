//! Terminal frontend for Terminal 1996.

mod commands;
mod render;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "t96",
    about = "Terminal 1996 — a text adventure inside a 1996 intelligence archive",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively (Enter skips streaming output)
    Play {
        /// Run seed; drawn at random when omitted
        #[arg(short, long)]
        seed: Option<u32>,

        /// Resume from a save file
        #[arg(short, long)]
        load: Option<PathBuf>,

        /// Save file written by the save command and on exit
        #[arg(long)]
        save: Option<PathBuf>,

        /// Print output without pacing
        #[arg(short, long)]
        instant: bool,

        /// Start in free play
        #[arg(long)]
        skip_tutorial: bool,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Execute a script of commands, one per line ("-" reads stdin)
    Run {
        /// Script path, or "-" for stdin
        script: PathBuf,

        /// Run seed
        #[arg(short, long, default_value = "1996")]
        seed: u32,

        /// Start in free play
        #[arg(long)]
        skip_tutorial: bool,

        /// Emit one JSON object per command
        #[arg(long)]
        json: bool,

        /// Write the final state to this save file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Summarize a save file
    Inspect {
        /// Save file
        file: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            seed,
            load,
            save,
            instant,
            skip_tutorial,
            config,
        } => commands::load_config(config.as_deref(), seed, skip_tutorial, instant)
            .and_then(|cfg| commands::play::run(cfg, load.as_deref(), save.as_deref())),
        Commands::Run {
            script,
            seed,
            skip_tutorial,
            json,
            save,
        } => commands::load_config(None, Some(seed), skip_tutorial, true)
            .and_then(|cfg| commands::run::run(cfg, &script, json, save.as_deref())),
        Commands::Inspect { file } => commands::inspect::run(&file),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
