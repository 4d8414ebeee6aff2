use std::collections::BTreeMap;
use std::io;

// ---------------------------------------------------------------------------
// Dataset – one parsed log, column-oriented
// ---------------------------------------------------------------------------

/// The numeric samples of one log file, keyed by variable name.
///
/// Every series has the same length (one entry per log row). The header's
/// column order is kept for iteration and re-serialization; lookups go
/// through the name-keyed map.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Column names in the order they appeared in the header row.
    columns: Vec<String>,
    /// variable name → one value per log row.
    series: BTreeMap<String, Vec<f64>>,
}

impl Dataset {
    /// Assemble a dataset from a parsed header and its column series.
    ///
    /// Callers (the loader, tests) are responsible for the equal-length
    /// invariant; `columns` must match the keys of `series`.
    pub fn new(columns: Vec<String>, series: BTreeMap<String, Vec<f64>>) -> Self {
        debug_assert!(columns.iter().all(|c| series.contains_key(c)));
        Dataset { columns, series }
    }

    /// Variable names in header order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// The sample sequence for one variable, if present.
    pub fn series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(Vec::as_slice)
    }

    /// Variables in header order together with their samples.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns.iter().filter_map(|name| {
            self.series
                .get(name)
                .map(|vals| (name.as_str(), vals.as_slice()))
        })
    }

    /// Number of sampled rows (0 for a header-only log).
    pub fn rows(&self) -> usize {
        self.columns
            .first()
            .and_then(|c| self.series.get(c))
            .map_or(0, Vec::len)
    }

    /// Whether any variable is tracked at all.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The windowed heart-rate series recorded by the heartbeats runtime,
    /// when the log carries one.
    pub fn windowed_heart_rate(&self) -> Option<&[f64]> {
        self.series("HB_RATE")
    }

    /// Write the dataset back out in the log format: a header row followed
    /// by one space-separated row per sample, in the original column order.
    ///
    /// `f64`'s `Display` prints the shortest round-trippable form, so
    /// re-parsing the output reproduces this dataset value for value.
    pub fn write_to<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.columns.join(" "))?;
        for row in 0..self.rows() {
            let mut line = String::new();
            for (i, name) in self.columns.iter().enumerate() {
                if i > 0 {
                    line.push(' ');
                }
                line.push_str(&self.series[name][row].to_string());
            }
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}
