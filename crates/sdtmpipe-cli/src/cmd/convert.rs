//! Convert subcommand - batch pilot domain conversion

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use sdtmpipe_pilot::{ConvertOutcome, PilotConverter, SourceRevision};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Domain prefixes to convert, e.g. DM VS LB
    #[arg(required = true)]
    pub domains: Vec<String>,

    /// Output directory (default: from config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pilot data revision to read
    #[arg(short, long, value_enum, default_value = "updated")]
    pub source: Source,
}

#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum Source {
    Original,
    Updated,
    Tdf,
}

impl From<Source> for SourceRevision {
    fn from(source: Source) -> Self {
        match source {
            Source::Original => SourceRevision::Original,
            Source::Updated => SourceRevision::Updated,
            Source::Tdf => SourceRevision::Tdf,
        }
    }
}

pub fn run(args: ConvertArgs, config: &Config, multi: &MultiProgress) -> Result<()> {
    let output_dir = args
        .output
        .unwrap_or_else(|| config.output.default_dir.clone());
    let revision = SourceRevision::from(args.source);
    let converter = PilotConverter::new(config.pilot.clone());

    log::info!(
        "converting {} domains from the {} revision into {}",
        args.domains.len(),
        revision.as_str(),
        output_dir.display()
    );

    let bar = multi.add(ProgressBar::new(args.domains.len() as u64));
    bar.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut outcomes = Vec::new();
    for domain in &args.domains {
        bar.set_message(domain.clone());
        let outcome = converter.convert_domain(domain, revision, &output_dir)?;
        match &outcome {
            ConvertOutcome::Written { path, rows } => {
                log::info!("{domain}: wrote {} ({rows} rows)", path.display());
            }
            ConvertOutcome::NoSourceData { url } => {
                log::warn!("{domain}: no source data at {url}");
            }
            ConvertOutcome::MissingOutputDir { dir } => {
                log::error!("output directory {} does not exist", dir.display());
            }
        }
        let abort = matches!(outcome, ConvertOutcome::MissingOutputDir { .. });
        outcomes.push((domain.clone(), outcome));
        bar.inc(1);
        if abort {
            // every remaining domain would hit the same outcome
            break;
        }
    }
    bar.finish_and_clear();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Domain").fg(Color::Cyan),
            Cell::new("Status").fg(Color::Cyan),
            Cell::new("Detail").fg(Color::Cyan),
        ]);
    for (domain, outcome) in &outcomes {
        let (status, detail) = match outcome {
            ConvertOutcome::Written { path, rows } => {
                ("written", format!("{} ({rows} rows)", path.display()))
            }
            ConvertOutcome::NoSourceData { url } => ("no data", url.clone()),
            ConvertOutcome::MissingOutputDir { dir } => {
                ("missing dir", dir.display().to_string())
            }
        };
        table.add_row(vec![domain.as_str(), status, &detail]);
    }
    println!("{table}");

    Ok(())
}
