use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Result};

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load one telemetry log from disk.
///
/// The path is threaded in explicitly rather than read from ambient state;
/// the file is opened fresh on every call and closed when parsing ends, so
/// two loads of the same path after separate runs of the instrumented
/// program see whatever each run last wrote.
pub fn load_log(path: &Path) -> Result<Dataset> {
    let file =
        File::open(path).with_context(|| format!("opening log file {}", path.display()))?;
    parse_log(BufReader::new(file))
        .with_context(|| format!("parsing log file {}", path.display()))
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse a whitespace-delimited numeric table.
///
/// The first line names the columns. Every following non-blank line carries
/// one numeric field per column; fields are separated by runs of whitespace
/// (the instrumented runtime pads each field to a fixed width, so multiple
/// spaces between tokens are the norm). Blank lines are skipped.
pub fn parse_log<R: BufRead>(reader: R) -> Result<Dataset> {
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line.context("reading header row")?,
        None => bail!("empty log: missing header row"),
    };
    let columns: Vec<String> = header.split_whitespace().map(str::to_string).collect();
    if columns.is_empty() {
        bail!("empty log: header row is blank");
    }

    let mut seen = BTreeSet::new();
    for name in &columns {
        if !seen.insert(name) {
            bail!("duplicate column '{name}' in header");
        }
    }

    // One vector per header position, transposed into the name-keyed map
    // once all rows are in.
    let mut by_position: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];

    for (i, line) in lines.enumerate() {
        let line_no = i + 2; // header is line 1
        let line = line.with_context(|| format!("reading line {line_no}"))?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != columns.len() {
            bail!(
                "line {line_no}: {} fields, header declares {} columns",
                fields.len(),
                columns.len()
            );
        }
        for ((slot, tok), name) in by_position.iter_mut().zip(&fields).zip(&columns) {
            let value: f64 = tok.parse().with_context(|| {
                format!("line {line_no}, column {name}: '{tok}' is not a number")
            })?;
            slot.push(value);
        }
    }

    let series: BTreeMap<String, Vec<f64>> =
        columns.iter().cloned().zip(by_position).collect();
    Ok(Dataset::new(columns, series))
}
