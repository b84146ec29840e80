use crate::commands::{print_json, Context};
use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

#[derive(Debug, Subcommand)]
pub enum LabelCommand {
    Ls(LabelListArgs),
}

#[derive(Debug, Args)]
pub struct LabelListArgs {}

#[derive(Debug, Serialize)]
struct LabelCountDto {
    name: String,
    count: i64,
}

pub fn list_labels(ctx: &Context<'_>, _args: LabelListArgs) -> Result<()> {
    let labels = ctx.store.labels().list_with_counts()?;

    if ctx.json {
        let items: Vec<LabelCountDto> = labels
            .into_iter()
            .map(|(label, count)| LabelCountDto {
                name: label.name,
                count,
            })
            .collect();
        return print_json(&items);
    }

    if labels.is_empty() {
        println!("no labels");
        return Ok(());
    }
    for (label, count) in labels {
        println!("{} ({count})", label.name);
    }
    Ok(())
}
