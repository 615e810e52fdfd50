use anyhow::{Context, Result};
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use hcli_core::{Classification, FileSink, Origin, PlanEntry, Sink, TempFileSink};
use std::io::{self, Write};
use std::path::Path;

use crate::cli_args::SinkOpts;

/// Sends a finished document where the sink flags say: stdout, an explicit
/// file, or the fixed temp-dir file.
pub fn emit(content: &str, sink_opts: &SinkOpts, temp_filename: &str, quiet: bool) -> Result<()> {
    if sink_opts.stdout {
        return write_to_stdout(content);
    }
    let written = match &sink_opts.output {
        Some(path) => FileSink::new(path).write(content),
        None => TempFileSink::new(temp_filename).write(content),
    }
    .context("Failed to save output")?;
    print_saved_location(&written, quiet);
    Ok(())
}

pub fn print_saved_location(path: &Path, quiet: bool) {
    if !quiet {
        println!(
            "{} Saved to: {}",
            "✅".green(),
            path.display().to_string().blue()
        );
    }
}

pub fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

pub fn print_plan_table(entries: &[PlanEntry]) -> Result<()> {
    if entries.is_empty() {
        println!("{}", "(No candidate files found)".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Path").fg(Color::Green),
        Cell::new("Origin").fg(Color::Green),
        Cell::new("Classification").fg(Color::Green),
    ]);
    for entry in entries {
        let origin = match entry.candidate.origin {
            Origin::Tracked => "tracked",
            Origin::Additional => "additional",
        };
        let tag_color = match entry.classification {
            Classification::Include => Color::Cyan,
            _ => Color::DarkGrey,
        };
        table.add_row(vec![
            Cell::new(entry.candidate.display()).fg(Color::Cyan),
            Cell::new(origin),
            Cell::new(entry.classification.as_str()).fg(tag_color),
        ]);
    }
    println!("{table}");

    let included = entries
        .iter()
        .filter(|e| e.classification.is_included())
        .count();
    println!(
        "{} {} of {} files included",
        "Summary:".green().bold(),
        included.to_string().cyan(),
        entries.len()
    );
    Ok(())
}
