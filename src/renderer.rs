// src/renderer.rs

use crate::error::{FameError, Result};
use crate::model::ContributorStats;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

const HEADER: [&str; 4] = ["Name", "Lines", "Commits", "Files"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Tabular,
    Csv,
    Json,
    JsonLines,
}

impl FromStr for OutputFormat {
    type Err = FameError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tabular" => Ok(OutputFormat::Tabular),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "json-lines" => Ok(OutputFormat::JsonLines),
            other => Err(FameError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Tabular => write!(f, "tabular"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::JsonLines => write!(f, "json-lines"),
        }
    }
}

pub fn render<W: Write>(contributors: &[ContributorStats], format: OutputFormat, out: &mut W) -> Result<()> {
    match format {
        OutputFormat::Tabular => render_tabular(contributors, out),
        OutputFormat::Csv => render_csv(contributors, out),
        OutputFormat::Json => render_json(contributors, out),
        OutputFormat::JsonLines => render_json_lines(contributors, out),
    }
}

fn cells(stats: &ContributorStats) -> [String; 4] {
    [
        stats.name.clone(),
        stats.lines.to_string(),
        stats.commits.to_string(),
        stats.files.to_string(),
    ]
}

// Columns padded to their widest cell plus one space; the last one is not.
fn render_tabular<W: Write>(contributors: &[ContributorStats], out: &mut W) -> Result<()> {
    let header = HEADER.map(String::from);
    let rows: Vec<[String; 4]> = std::iter::once(header)
        .chain(contributors.iter().map(cells))
        .collect();

    let mut widths = [0usize; 3];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    for row in &rows {
        for (cell, width) in row.iter().zip(widths) {
            write!(out, "{:<pad$}", cell, pad = width + 1)?;
        }
        writeln!(out, "{}", row[3])?;
    }
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn render_csv<W: Write>(contributors: &[ContributorStats], out: &mut W) -> Result<()> {
    let header = HEADER.map(String::from);
    for row in std::iter::once(header).chain(contributors.iter().map(cells)) {
        let fields: Vec<String> = row.iter().map(|cell| csv_field(cell)).collect();
        writeln!(out, "{}", fields.join(","))?;
    }
    Ok(())
}

fn render_json<W: Write>(contributors: &[ContributorStats], out: &mut W) -> Result<()> {
    serde_json::to_writer(&mut *out, contributors)?;
    writeln!(out)?;
    Ok(())
}

fn render_json_lines<W: Write>(contributors: &[ContributorStats], out: &mut W) -> Result<()> {
    for stats in contributors {
        serde_json::to_writer(&mut *out, stats)?;
        writeln!(out)?;
    }
    Ok(())
}
