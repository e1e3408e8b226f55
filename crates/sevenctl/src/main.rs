//! Seven Control - text console for the Seven voice assistant
//!
//! Type what you would say. Replies are printed, and command tags are
//! shown by a dry-run executor instead of being carried out.

use anyhow::{Context, Result};
use clap::Parser;
use seven_common::{Config, Dispatcher};
use seven_shared::UNIDENTIFIED_SPEAKER;
use sevenctl::{logging, Console};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "sevenctl")]
#[command(about = "Seven - conversational dispatch console", long_about = None)]
#[command(version)]
struct Cli {
    /// Handle one utterance and exit
    #[arg(long, value_name = "TEXT")]
    once: Option<String>,

    /// Speaker id for every utterance
    #[arg(long, default_value = UNIDENTIFIED_SPEAKER)]
    speaker: String,

    /// Config file (default: $SEVEN_CONFIG or the user config dir)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the default config to the config path and exit
    #[arg(long)]
    write_config: bool,

    /// Answer without the inference backend
    #[arg(long)]
    no_inference: bool,

    /// Plain output
    #[arg(long)]
    no_color: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    logging::install_panic_hook();

    if cli.write_config {
        let path = cli
            .config
            .or_else(Config::default_path)
            .context("no config path available")?;
        Config::save_default(&path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_or_default(path),
        None => Config::load(),
    };
    if cli.no_inference {
        config.inference.enabled = false;
    }

    let dispatcher = Dispatcher::builder(config).build()?;
    let stdout = io::stdout();
    let color = !cli.no_color && stdout.is_terminal();
    let mut console = Console::new(&dispatcher, &cli.speaker).with_color(color);
    let mut out = stdout.lock();

    if let Some(text) = cli.once {
        console.respond(&text, &mut out)?;
        return Ok(());
    }

    info!(speaker = %cli.speaker, "console started");
    let interactive = io::stdin().is_terminal();
    console.run(io::stdin().lock(), &mut out, interactive)?;
    info!("console closed");
    Ok(())
}
