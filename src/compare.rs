use std::fmt;
use std::io;

use anyhow::Result;
use thiserror::Error;

use crate::data::model::Dataset;

/// Decimal precision at which the fixed-point and floating-point builds
/// must agree.
pub const DEFAULT_DECIMAL: i32 = 2;

// ---------------------------------------------------------------------------
// Errors – structural problems that abort the run
// ---------------------------------------------------------------------------

/// A comparison that cannot even be attempted. Unlike a tolerance
/// divergence, these abort the whole run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompareError {
    /// A variable tracked by the first run has no counterpart in the second.
    #[error("variable {0} is missing from the second dataset")]
    MissingVariable(String),

    /// The two runs logged a different number of samples for one variable.
    #[error("variable {name}: {left} samples vs {right}, refusing to truncate")]
    LengthMismatch {
        name: String,
        left: usize,
        right: usize,
    },
}

// ---------------------------------------------------------------------------
// Per-variable report
// ---------------------------------------------------------------------------

/// One sample position where the two series disagree beyond tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Divergence {
    pub index: usize,
    pub left: f64,
    pub right: f64,
}

impl Divergence {
    fn abs_diff(&self) -> f64 {
        (self.left - self.right).abs()
    }
}

/// Outcome of checking one variable across the two runs.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesReport {
    pub name: String,
    pub samples: usize,
    pub decimal: i32,
    pub divergences: Vec<Divergence>,
}

impl SeriesReport {
    /// Whether every sample agreed within tolerance.
    pub fn is_match(&self) -> bool {
        self.divergences.is_empty()
    }
}

impl fmt::Display for SeriesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_match() {
            return write!(
                f,
                "{}: {} samples within {} decimals",
                self.name, self.samples, self.decimal
            );
        }
        let max = self
            .divergences
            .iter()
            .map(Divergence::abs_diff)
            .fold(0.0, f64::max);
        write!(
            f,
            "{}: not almost equal to {} decimals ({} / {} samples differ, max abs diff {})",
            self.name,
            self.decimal,
            self.divergences.len(),
            self.samples,
            max
        )?;
        for d in &self.divergences {
            write!(f, "\n  [{}] {} != {}", d.index, d.left, d.right)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Whether two values agree to `decimal` places: the absolute difference
/// must stay below 1.5 × 10⁻ᵈ, so a difference of exactly 0.005 still
/// counts as equal at two decimals while 0.02 does not.
pub fn almost_equal(left: f64, right: f64, decimal: i32) -> bool {
    // matching NaNs count as agreement
    if left.is_nan() && right.is_nan() {
        return true;
    }
    (left - right).abs() < 1.5 * 10f64.powi(-decimal)
}

/// Element-wise check of one variable's samples from the two runs.
///
/// Divergences are collected into the report rather than returned as
/// errors; only a sample-count mismatch makes the comparison itself fail.
pub fn compare_series(
    name: &str,
    left: &[f64],
    right: &[f64],
    decimal: i32,
) -> Result<SeriesReport, CompareError> {
    if left.len() != right.len() {
        return Err(CompareError::LengthMismatch {
            name: name.to_string(),
            left: left.len(),
            right: right.len(),
        });
    }
    let divergences = left
        .iter()
        .zip(right)
        .enumerate()
        .filter(|&(_, (a, b))| !almost_equal(*a, *b, decimal))
        .map(|(index, (&left, &right))| Divergence { index, left, right })
        .collect();
    Ok(SeriesReport {
        name: name.to_string(),
        samples: left.len(),
        decimal,
        divergences,
    })
}

/// Check every variable of `actual` against `desired`, writing one progress
/// line per variable and a divergence block for each variable that fails.
///
/// Iteration is driven by `actual`'s variables in header order; a variable
/// missing from `desired` or logged with a different sample count aborts
/// the run instead of being skipped.
pub fn diff_datasets<W: io::Write>(
    actual: &Dataset,
    desired: &Dataset,
    decimal: i32,
    out: &mut W,
) -> Result<()> {
    for (name, left) in actual.iter() {
        writeln!(out, "Testing variable {name}...")?;
        let right = desired
            .series(name)
            .ok_or_else(|| CompareError::MissingVariable(name.to_string()))?;
        let report = compare_series(name, left, right, decimal)?;
        if !report.is_match() {
            writeln!(out, "{report}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_log;

    #[test]
    fn half_of_last_decimal_still_agrees() {
        assert!(almost_equal(1.0, 1.005, 2));
        assert!(almost_equal(1.005, 1.0, 2));
        assert!(!almost_equal(1.0, 1.02, 2));
    }

    #[test]
    fn nan_pairs_agree() {
        assert!(almost_equal(f64::NAN, f64::NAN, 2));
        assert!(!almost_equal(f64::NAN, 1.0, 2));
    }

    #[test]
    fn divergence_carries_position_and_both_values() -> Result<(), CompareError> {
        let report = compare_series("SPEEDUP", &[1.0, 1.5, 2.0], &[1.0, 1.52, 2.0], 2)?;
        assert!(!report.is_match());
        assert_eq!(
            report.divergences,
            [Divergence {
                index: 1,
                left: 1.5,
                right: 1.52
            }]
        );
        Ok(())
    }

    #[test]
    fn agreement_within_tolerance_is_a_match() -> Result<(), CompareError> {
        let report = compare_series("ERROR", &[0.1, 0.2], &[0.105, 0.195], 2)?;
        assert!(report.is_match());
        assert_eq!(report.samples, 2);
        Ok(())
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let err = compare_series("X", &[1.0, 2.0, 3.0], &[1.0, 2.0], 2).unwrap_err();
        assert_eq!(
            err,
            CompareError::LengthMismatch {
                name: "X".to_string(),
                left: 3,
                right: 2
            }
        );
    }

    #[test]
    fn report_text_names_the_differing_samples() -> Result<(), CompareError> {
        let report = compare_series("P", &[0.5, 0.7], &[0.5, 0.75], 2)?;
        let text = report.to_string();
        assert!(text.contains("P: not almost equal to 2 decimals"), "{text}");
        assert!(text.contains("[1] 0.7 != 0.75"), "{text}");
        Ok(())
    }

    #[test]
    fn equal_datasets_produce_only_progress_lines() -> anyhow::Result<()> {
        let fixed = parse_log("HB_RATE SPEEDUP\n10.0 1.0\n9.5 1.25\n".as_bytes())?;
        let floating = parse_log("HB_RATE SPEEDUP\n10.004 1.001\n9.496 1.25\n".as_bytes())?;
        let mut out = Vec::new();
        diff_datasets(&fixed, &floating, DEFAULT_DECIMAL, &mut out)?;
        let text = String::from_utf8(out)?;
        assert_eq!(
            text,
            "Testing variable HB_RATE...\nTesting variable SPEEDUP...\n"
        );
        Ok(())
    }

    #[test]
    fn diverging_variable_is_reported_and_the_rest_still_run() -> anyhow::Result<()> {
        let fixed = parse_log("A B\n1.0 5.0\n2.0 6.0\n".as_bytes())?;
        let floating = parse_log("A B\n1.5 5.0\n2.0 6.0\n".as_bytes())?;
        let mut out = Vec::new();
        diff_datasets(&fixed, &floating, DEFAULT_DECIMAL, &mut out)?;
        let text = String::from_utf8(out)?;
        assert!(text.contains("A: not almost equal"), "{text}");
        assert!(text.contains("[0] 1 != 1.5"), "{text}");
        // B is still tested after A diverged.
        assert!(text.contains("Testing variable B..."), "{text}");
        Ok(())
    }

    #[test]
    fn missing_variable_aborts_the_run() -> anyhow::Result<()> {
        let fixed = parse_log("A B\n1.0 2.0\n".as_bytes())?;
        let floating = parse_log("A\n1.0\n".as_bytes())?;
        let mut out = Vec::new();
        let err = diff_datasets(&fixed, &floating, DEFAULT_DECIMAL, &mut out).unwrap_err();
        assert_eq!(
            err.downcast::<CompareError>()?,
            CompareError::MissingVariable("B".to_string())
        );
        Ok(())
    }
}
