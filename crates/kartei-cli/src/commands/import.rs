use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use crate::util::now_utc;
use anyhow::{anyhow, Context as _, Result};
use clap::{Args, Subcommand};
use kartei_import::confirm::{confirm_with_tables, LookupTables, RowError};
use kartei_import::preview;
use kartei_import::row::ImportIssue;
use kartei_import::sheet::{read_sheet, MappedSheet};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Subcommand)]
pub enum ImportCommand {
    Preview(PreviewArgs),
    Confirm(ConfirmArgs),
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[arg(long)]
    pub file: PathBuf,
    #[arg(long, default_value_t = ';')]
    pub delimiter: char,
}

#[derive(Debug, Args)]
pub struct ConfirmArgs {
    #[arg(long)]
    pub file: PathBuf,
    #[arg(long, default_value_t = ';')]
    pub delimiter: char,
    #[arg(long)]
    pub chunk_size: Option<usize>,
}

#[derive(Debug, Serialize)]
struct PreviewReportDto {
    rows_total: usize,
    importable: usize,
    new: usize,
    existing: Vec<String>,
    issues: Vec<ImportIssue>,
}

#[derive(Debug, Serialize)]
struct ConfirmReportDto {
    created: usize,
    updated: usize,
    skipped: usize,
    errors: Vec<RowError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    issues: Vec<ImportIssue>,
}

pub fn preview_sheet(ctx: &Context<'_>, args: PreviewArgs) -> Result<()> {
    let sheet = read_sheet_file(&args.file, args.delimiter, &ctx.config.country_code)?;
    let phones: Vec<String> = sheet
        .contacts
        .iter()
        .map(|contact| contact.phone.clone())
        .collect();
    let report = preview::preview(ctx.store, &phones)?;

    let dto = PreviewReportDto {
        rows_total: sheet.rows_total,
        importable: sheet.contacts.len(),
        new: report.new_count(sheet.contacts.len()),
        existing: report.existing,
        issues: sheet.issues,
    };

    if ctx.json {
        return print_json(&dto);
    }

    println!(
        "Sheet rows: {}, importable {}, new {}, already known {}",
        dto.rows_total,
        dto.importable,
        dto.new,
        dto.existing.len()
    );
    print_issues(&dto.issues);
    Ok(())
}

pub fn confirm_sheet(ctx: &Context<'_>, args: ConfirmArgs) -> Result<()> {
    let sheet = read_sheet_file(&args.file, args.delimiter, &ctx.config.country_code)?;
    let chunk_size = args.chunk_size.unwrap_or(ctx.config.import.chunk_size);
    if chunk_size == 0 {
        return Err(invalid_input("chunk size must be at least 1"));
    }

    let now = now_utc();
    let mut tables = LookupTables::load(ctx.store)?;
    let mut report = ConfirmReportDto {
        created: 0,
        updated: 0,
        skipped: 0,
        errors: Vec::new(),
        reason: None,
        issues: sheet.issues,
    };

    for chunk in sheet.contacts.chunks(chunk_size) {
        let summary = confirm_with_tables(ctx.store, now, &mut tables, chunk);
        report.created += summary.created;
        report.updated += summary.updated;
        report.skipped += summary.skipped;
        report.errors.extend(summary.errors);
    }
    if report.created + report.updated == 0 {
        report.reason = Some(
            report
                .errors
                .first()
                .map(|err| err.reason.clone())
                .unwrap_or_else(|| "nothing imported".to_string()),
        );
    }

    if ctx.json {
        print_json(&report)?;
    } else {
        println!(
            "Imported sheet contacts: created {}, updated {}, skipped {}",
            report.created, report.updated, report.skipped
        );
        if !report.errors.is_empty() {
            println!("Row errors:");
            for err in &report.errors {
                println!("- row {} ({}): {}", err.row, err.phone, err.reason);
            }
        }
        print_issues(&report.issues);
    }

    if let Some(reason) = report.reason.as_deref() {
        return Err(anyhow!("import failed: {reason}"));
    }
    Ok(())
}

fn read_sheet_file(path: &Path, delimiter: char, country_code: &str) -> Result<MappedSheet> {
    if !delimiter.is_ascii() {
        return Err(invalid_input(format!(
            "delimiter must be a single ASCII character, got {delimiter:?}"
        )));
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("read sheet file {}", path.display()))?;
    let sheet = read_sheet(&text, delimiter as u8, country_code)
        .with_context(|| format!("parse sheet file {}", path.display()))?;
    Ok(sheet)
}

fn print_issues(issues: &[ImportIssue]) {
    if issues.is_empty() {
        return;
    }
    println!("Issues:");
    for issue in issues {
        println!("- row {}: {} ({})", issue.row, issue.message, issue.field);
    }
}
