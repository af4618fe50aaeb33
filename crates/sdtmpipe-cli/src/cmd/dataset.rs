//! Dataset subcommand - fetch versioned dataset metadata

use anyhow::Result;
use clap::Args;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct DatasetArgs {
    /// Implementation guide version, e.g. 3-3
    pub version: String,

    /// Dataset name, e.g. DM
    pub name: String,

    /// Print the raw JSON body instead of a summary
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: DatasetArgs, config: &Config) -> Result<()> {
    let mut client = config.library_client()?;
    let dataset = client.get_ig_dataset(&args.version, &args.name)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(dataset.as_ref())?);
        return Ok(());
    }

    let label = dataset
        .get("label")
        .and_then(|v| v.as_str())
        .unwrap_or("(no label)");
    let variables = dataset
        .get("datasetVariables")
        .and_then(|v| v.as_array())
        .map(|v| v.len())
        .unwrap_or(0);
    println!(
        "{} (SDTMIG {}): {} with {} variables",
        args.name, args.version, label, variables
    );
    Ok(())
}
