//! Synheart Research Log CLI
//!
//! Replays recorded input sessions into privacy-filtered research logs.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use synheart_research_log::{
    config::Config,
    replay::Replayer,
    sink::{EchoSink, FileSink, SharedSink},
    transparency::create_shared_log_with_persistence,
    UnitPublisher, PRIVACY_DECLARATION, VERSION,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "synheart-research-log")]
#[command(author = "Synheart")]
#[command(version = VERSION)]
#[command(about = "Privacy-filtered log units for typing research", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded session script into a research log
    Replay {
        /// JSON-lines script of session operations
        script: PathBuf,

        /// Allow potentially private events and words in the output
        #[arg(long, conflicts_with = "withhold_private")]
        include_private: bool,

        /// Withhold private data even if the configuration includes it
        #[arg(long)]
        withhold_private: bool,

        /// Output file (defaults to a new file in the configured log directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show publishing statistics
    Status,

    /// Display privacy declaration
    Privacy,

    /// Show configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            script,
            include_private,
            withhold_private,
            output,
        } => {
            let requested = if include_private {
                Some(true)
            } else if withhold_private {
                Some(false)
            } else {
                None
            };
            cmd_replay(script, requested, output)
        }
        Commands::Status => {
            cmd_status();
            Ok(())
        }
        Commands::Privacy => {
            cmd_privacy();
            Ok(())
        }
        Commands::Config => {
            cmd_config();
            Ok(())
        }
    }
}

fn cmd_replay(
    script: PathBuf,
    requested_private: Option<bool>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Could not load config, using defaults: {e}");
        Config::default()
    });
    if let Err(e) = config.ensure_directories() {
        tracing::warn!("Could not create directories: {e}");
    }

    let output = output.unwrap_or_else(|| config.log_file_path());
    let file_sink = FileSink::new(&output);
    let sink = if config.echo_frames {
        SharedSink::new(EchoSink::new(file_sink))
    } else {
        SharedSink::new(file_sink)
    };

    let transparency = create_shared_log_with_persistence(config.stats_path());
    let publisher = UnitPublisher::new(sink, transparency.clone());
    let include_private = config.private_data_decision(requested_private);

    let reader = BufReader::new(
        File::open(&script).with_context(|| format!("opening script {}", script.display()))?,
    );

    println!("Replaying {}", script.display());
    println!(
        "  Private data: {}",
        if include_private {
            "included"
        } else {
            "withheld"
        }
    );

    let summary = Replayer::new(publisher, include_private)
        .run(reader)
        .with_context(|| format!("replaying {}", script.display()))?;

    if let Err(e) = transparency.save() {
        tracing::warn!("Could not save transparency stats: {e}");
    }

    println!("  Operations: {}", summary.operations);
    println!("  Units published: {}", summary.units_published());
    println!("  Frames written: {}", summary.frames_written());
    if summary.units_published() > 0 {
        println!("  Output: {}", output.display());
    } else {
        println!("  Nothing passed the privacy filter; no log written.");
    }
    Ok(())
}

fn cmd_status() {
    let config = Config::load().unwrap_or_default();

    println!("Synheart Research Log Status");
    println!("============================");
    println!();

    println!("Configuration:");
    println!(
        "  Private data by default: {}",
        if config.include_private_data {
            "included"
        } else {
            "withheld"
        }
    );
    println!("  Log directory: {}", config.log_dir.display());
    println!();

    let transparency = create_shared_log_with_persistence(config.stats_path());
    if config.stats_path().exists() {
        println!("{}", transparency.summary());
    } else {
        println!("No previous session data found.");
    }
}

fn cmd_privacy() {
    println!("{PRIVACY_DECLARATION}");
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}
