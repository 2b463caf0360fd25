//! Aggregation and rendering of validation results.
//!
//! A [`Report`] owns the per-module results, ordered with invalid entries
//! first so failures are at the top of the table. Rendering lives here too,
//! at the edge of the program: the text table is coloured with `colored`
//! (which honours `NO_COLOR` and `--no-color`), the JSON form is for
//! automation.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write as _;

use crate::constants::{DEFAULT_REFERENCE, EXIT_INVALID, EXIT_SUCCESS};
use crate::validator::{Resolution, ValidationResult};

const HEADERS: [&str; 4] = ["NAME", "URL", "REF", "STATUS"];

/// The outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    results: Vec<ValidationResult>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    valid: bool,
    total: usize,
    invalid: usize,
    results: &'a [ValidationResult],
}

impl Report {
    /// Build a report; invalid results move to the front, otherwise the
    /// validation order is kept.
    #[must_use]
    pub fn new(mut results: Vec<ValidationResult>) -> Self {
        results.sort_by_key(|result| result.is_valid);
        Self {
            results,
        }
    }

    #[must_use]
    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    #[must_use]
    pub fn all_valid(&self) -> bool {
        self.results.iter().all(|result| result.is_valid)
    }

    #[must_use]
    pub fn invalid_count(&self) -> usize {
        self.results.iter().filter(|result| !result.is_valid).count()
    }

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.all_valid() {
            EXIT_SUCCESS
        } else {
            EXIT_INVALID
        }
    }

    /// One-line overall verdict.
    #[must_use]
    pub fn summary(&self) -> String {
        let total = self.results.len();
        if self.all_valid() {
            format!("All {total} git references are valid").green().bold().to_string()
        } else {
            format!("{} of {} git references are invalid", self.invalid_count(), total)
                .red()
                .bold()
                .to_string()
        }
    }

    /// Table of results followed by advisory notes and the verdict.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        if self.results.is_empty() {
            let _ = writeln!(out, "{}", "No modules with a git source".dimmed());
        } else {
            self.write_table(&mut out);
        }

        let commit_pinned: Vec<&str> = self
            .results
            .iter()
            .filter(|result| result.resolution == Resolution::Commit)
            .map(|result| result.name.as_str())
            .collect();
        if !commit_pinned.is_empty() {
            let _ = writeln!(out);
            for name in commit_pinned {
                let _ = writeln!(
                    out,
                    "{}: {} is pinned to a raw commit; pinning to a tag is preferable",
                    "note".yellow(),
                    name
                );
            }
        }

        let _ = writeln!(out, "\n{}", self.summary());
        out
    }

    fn write_table(&self, out: &mut String) {
        let rows: Vec<[&str; 4]> = self
            .results
            .iter()
            .map(|result| {
                [
                    result.name.as_str(),
                    result.url.as_str(),
                    result.reference.as_deref().unwrap_or(DEFAULT_REFERENCE),
                    result.status(),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header = format!(
            "{:<w0$}  {:<w1$}  {:<w2$}  {}",
            HEADERS[0],
            HEADERS[1],
            HEADERS[2],
            HEADERS[3],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
        );
        let _ = writeln!(out, "{}", header.bold());
        let _ = writeln!(out, "{}", "─".repeat(widths.iter().sum::<usize>() + 6));

        for (row, result) in rows.iter().zip(&self.results) {
            let name = format!("{:<w$}", row[0], w = widths[0]);
            let status = if result.is_valid {
                row[3].green()
            } else {
                row[3].red().bold()
            };
            let _ = writeln!(
                out,
                "{}  {:<w1$}  {:<w2$}  {}",
                if result.is_valid {
                    name.normal()
                } else {
                    name.red()
                },
                row[1],
                row[2],
                status,
                w1 = widths[1],
                w2 = widths[2],
            );
        }
    }

    /// Machine-readable form of the report.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let report = JsonReport {
            valid: self.all_valid(),
            total: self.results.len(),
            invalid: self.invalid_count(),
            results: &self.results,
        };
        serde_json::to_string_pretty(&report).context("Failed to serialize report")
    }
}
