//! sdtmpipe - CDISC Library client and pilot dataset converter
//!
//! Fetches SDTM metadata from the CDISC Library API and converts the
//! PHUSE-published pilot study datasets into CSV files.

use std::io::IsTerminal;

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::MultiProgress;

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "sdtmpipe")]
#[command(about = "CDISC Library client and pilot dataset converter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./sdtmpipe.toml or ~/.config/sdtmpipe/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// List published SDTMIG or SDTM versions
    Versions(cmd::versions::VersionsArgs),
    /// Fetch versioned dataset metadata
    Dataset(cmd::dataset::DatasetArgs),
    /// Fetch a controlled-terminology package
    Ct(cmd::ct::CtArgs),
    /// Convert pilot domains to CSV
    Convert(cmd::convert::ConvertArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let multi = MultiProgress::new();
    let is_tty = std::io::stderr().is_terminal();

    // On a TTY the bars carry the activity, so default to warn; piped
    // output gets info-level logs instead.
    let quiet = is_tty && !cli.debug;
    sdtmpipe_core::init_logging(quiet, cli.debug, is_tty.then_some(&multi));

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Versions(args) => cmd::versions::run(args, &config),
        Command::Dataset(args) => cmd::dataset::run(args, &config),
        Command::Ct(args) => cmd::ct::run(args, &config),
        Command::Convert(args) => cmd::convert::run(args, &config, &multi),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec!["Library base URL", &config.library.base_url]);
            table.add_row(vec![
                "API key",
                if config.library.api_key.is_some() {
                    "configured"
                } else {
                    "not set"
                },
            ]);
            table.add_row(vec![
                "Output directory",
                &config.output.default_dir.display().to_string(),
            ]);
            table.add_row(vec!["Pilot source (original)", &config.pilot.original]);
            table.add_row(vec!["Pilot source (updated)", &config.pilot.updated]);
            table.add_row(vec!["Pilot source (tdf)", &config.pilot.tdf]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
