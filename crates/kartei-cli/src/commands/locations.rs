use crate::commands::{print_json, Context};
use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

#[derive(Debug, Subcommand)]
pub enum LocationCommand {
    Ls(LocationListArgs),
}

#[derive(Debug, Args)]
pub struct LocationListArgs {}

#[derive(Debug, Serialize)]
struct LocationCountDto {
    name: String,
    admin_only: bool,
    count: i64,
}

pub fn list_locations(ctx: &Context<'_>, _args: LocationListArgs) -> Result<()> {
    let locations = ctx.store.locations().list_with_counts()?;

    if ctx.json {
        let items: Vec<LocationCountDto> = locations
            .into_iter()
            .map(|(location, count)| LocationCountDto {
                name: location.name,
                admin_only: location.admin_only,
                count,
            })
            .collect();
        return print_json(&items);
    }

    if locations.is_empty() {
        println!("no locations");
        return Ok(());
    }
    for (location, count) in locations {
        let marker = if location.admin_only { " [admin]" } else { "" };
        println!("{}{marker} ({count})", location.name);
    }
    Ok(())
}
