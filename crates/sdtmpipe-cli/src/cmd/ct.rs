//! Ct subcommand - fetch a controlled-terminology package

use anyhow::Result;
use clap::Args;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct CtArgs {
    /// Package version, e.g. 2021-06-25
    pub version: String,

    /// Print the raw JSON body instead of a summary
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: CtArgs, config: &Config) -> Result<()> {
    let mut client = config.library_client()?;
    let package = client.get_ct_package(&args.version)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(package.as_ref())?);
        return Ok(());
    }

    let label = package
        .get("label")
        .and_then(|v| v.as_str())
        .unwrap_or("(no label)");
    let codelists = package
        .get("codelists")
        .and_then(|v| v.as_array())
        .map(|v| v.len())
        .unwrap_or(0);
    println!(
        "sdtmct-{}: {} with {} codelists",
        args.version, label, codelists
    );
    Ok(())
}
