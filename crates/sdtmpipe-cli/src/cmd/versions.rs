//! Versions subcommand - list published standards versions

use anyhow::Result;
use clap::{Args, ValueEnum};
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct VersionsArgs {
    /// Product family to list
    #[arg(short, long, value_enum, default_value = "sdtmig")]
    pub product: Product,
}

#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum Product {
    /// SDTM Implementation Guides
    Sdtmig,
    /// SDTM foundational models
    Sdtm,
}

pub fn run(args: VersionsArgs, config: &Config) -> Result<()> {
    let mut client = config.library_client()?;
    let links = match args.product {
        Product::Sdtmig => client.get_sdtmig_versions()?,
        Product::Sdtm => client.get_sdtm_versions()?,
    };
    log::info!("{} published versions", links.len());

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Version").fg(Color::Cyan),
            Cell::new("Title").fg(Color::Cyan),
            Cell::new("Href").fg(Color::Cyan),
        ]);
    for link in &links {
        table.add_row(vec![
            link.version().unwrap_or("?"),
            link.title.as_deref().unwrap_or(""),
            &link.href,
        ]);
    }
    println!("{table}");
    Ok(())
}
