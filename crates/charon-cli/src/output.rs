//! Output formatting and writing utilities
//!
//! Command results go to stdout in the selected format. Status messages only
//! appear in human output, and `--quiet` silences them.

use crate::cli::OutputFormat;
use crate::error::Result;
use charon_schemas::Violation;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use tracing::trace;

/// Formats serializable values for one output format
pub trait OutputFormatter {
    fn format<T: Serialize>(&self, value: &T, pretty: bool) -> Result<String>;

    /// Format definition document violations
    fn format_violations(&self, violations: &[Violation], use_color: bool) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T, pretty: bool) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human if pretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Human => Ok(serde_json::to_string(value)?),
        }
    }

    fn format_violations(&self, violations: &[Violation], use_color: bool) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_violations_human(violations, use_color)),
            _ => self.format(&violations, false),
        }
    }
}

fn format_violations_human(violations: &[Violation], use_color: bool) -> String {
    let mut output = String::new();
    let header = format!("{} violation(s):", violations.len());
    if use_color {
        output.push_str(&header.red().bold().to_string());
    } else {
        output.push_str(&header);
    }

    for violation in violations {
        output.push('\n');
        let rule = format!("[{}]", violation.rule);
        let path = if violation.path.is_empty() { "(document)" } else { violation.path.as_str() };
        if use_color {
            output.push_str(&format!("  {} {} {}", path.cyan(), rule.yellow(), violation.message));
        } else {
            output.push_str(&format!("  {} {} {}", path, rule, violation.message));
        }
    }
    output
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    pretty: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, pretty: bool) -> Self {
        Self::with_writer(format, use_color, quiet, pretty, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        pretty: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            pretty,
            writer,
        }
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    pub fn warning(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write a command result in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value, self.pretty)?;
        trace!(bytes = formatted.len(), "writing command result");

        if self.format == OutputFormat::Yaml {
            // serde_yaml already ends with a newline
            self.write(&formatted)
        } else {
            self.writeln(&formatted)
        }
    }

    pub fn violations(&mut self, violations: &[Violation]) -> Result<()> {
        let formatted = self.format.format_violations(violations, self.use_color)?;
        self.writeln(&formatted)
    }

    /// Write a table (human format only)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ");

        if self.use_color {
            self.writeln(header_row.trim_end().bold().to_string().as_str())?;
        } else {
            self.writeln(header_row.trim_end())?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    if i < widths.len() {
                        format!("{:width$}", cell, width = widths[i])
                    } else {
                        cell.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(row_str.trim_end())?;
        }

        Ok(())
    }
}
