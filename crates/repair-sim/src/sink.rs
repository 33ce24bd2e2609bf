//! Result export
//!
//! A [`ResultSink`] receives one [`ResultRecord`] per cell. Three sinks ship
//! with the crate: CSV with human-readable column headers, JSON lines and an
//! aligned text table for terminals.

use crate::error::{Result, SimError};
use crate::results::{ExperimentReport, ResultRecord};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Destination for per-cell records
pub trait ResultSink {
    /// Write one record
    fn write_record(&mut self, record: &ResultRecord) -> Result<()>;

    /// Flush buffered output; called once after the last record
    fn finish(&mut self) -> Result<()>;
}

/// Write every cell of `report` to `sink` and finish it
pub fn export<S: ResultSink + ?Sized>(report: &ExperimentReport, sink: &mut S) -> Result<()> {
    write_records(report, sink)?;
    sink.finish()
}

/// Write every cell of `report` to `sink`, leaving it open for further reports
pub fn write_records<S: ResultSink + ?Sized>(
    report: &ExperimentReport,
    sink: &mut S,
) -> Result<()> {
    for record in report.records() {
        sink.write_record(&record)?;
    }
    Ok(())
}

/// Comma-separated values with a header row
pub struct CsvSink<W: Write> {
    writer: W,
    header_written: bool,
}

impl<W: Write> CsvSink<W> {
    /// Create a CSV sink
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            header_written: false,
        }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_row<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<()> {
        let line = fields
            .iter()
            .map(|field| escape_csv(field.as_ref()))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(self.writer, "{line}")?;
        Ok(())
    }

    fn ensure_header(&mut self) -> Result<()> {
        if !self.header_written {
            self.write_row(&ResultRecord::COLUMNS)?;
            self.header_written = true;
        }
        Ok(())
    }
}

fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

impl<W: Write> ResultSink for CsvSink<W> {
    fn write_record(&mut self, record: &ResultRecord) -> Result<()> {
        self.ensure_header()?;
        self.write_row(&record.values())
    }

    fn finish(&mut self) -> Result<()> {
        self.ensure_header()?;
        self.writer.flush()?;
        Ok(())
    }
}

/// One JSON object per line
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Create a JSON-lines sink
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for JsonLinesSink<W> {
    fn write_record(&mut self, record: &ResultRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Aligned summary table. Rows are buffered until [`finish`](ResultSink::finish).
pub struct TableSink<W: Write> {
    writer: W,
    rows: Vec<[String; TABLE_COLUMNS.len()]>,
}

const TABLE_COLUMNS: [&str; 9] = [
    "algorithm",
    "fault",
    "p",
    "ok",
    "avg contacts",
    "avg cpu ms",
    "failed",
    "avg contacts",
    "bound hit",
];

impl<W: Write> TableSink<W> {
    /// Create a table sink
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            rows: Vec::new(),
        }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for TableSink<W> {
    fn write_record(&mut self, record: &ResultRecord) -> Result<()> {
        let float =
            |value: Option<f64>| value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
        let millis = record.average_success_process_time.map(|secs| secs * 1_000.0);
        self.rows.push([
            record.algorithm.clone(),
            record.fault_model.clone(),
            format!("{:.1}", record.availability_probability),
            record.successful_repairs.to_string(),
            float(record.success_average_contacted),
            millis.map_or_else(|| "-".to_string(), |ms| format!("{ms:.4}")),
            record.failed_repairs.to_string(),
            float(record.fail_average_contacted),
            record.safety_bound_exceeded.to_string(),
        ]);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let mut widths = TABLE_COLUMNS.map(str::len);
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        writeln!(self.writer, "{}", render_row(TABLE_COLUMNS.iter().copied(), &widths))?;
        let rule: usize = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
        writeln!(self.writer, "{}", "-".repeat(rule))?;
        for row in self.rows.drain(..) {
            writeln!(self.writer, "{}", render_row(row.iter().map(String::as_str), &widths))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Export format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Table,
    /// CSV with human-readable column headers
    Csv,
    /// JSON lines
    Json,
}

impl OutputFormat {
    /// File extension for this format
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Table => "txt",
            Self::Csv => "csv",
            Self::Json => "jsonl",
        }
    }

    /// Build a sink writing to `writer`
    pub fn sink<'w, W: Write + 'w>(self, writer: W) -> Box<dyn ResultSink + 'w> {
        match self {
            Self::Table => Box::new(TableSink::new(writer)),
            Self::Csv => Box::new(CsvSink::new(writer)),
            Self::Json => Box::new(JsonLinesSink::new(writer)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::Csv => "csv",
            Self::Json => "json",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" | "text" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" | "jsonl" => Ok(Self::Json),
            other => Err(SimError::parse(format!("unknown output format '{other}'"))),
        }
    }
}
