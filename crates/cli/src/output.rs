//! Comparison result rendering.

use clap::ValueEnum;
use s3etag_verify::Comparison;
use serde::Serialize;
use std::borrow::Cow;
use std::io::{self, Write};

/// Row format for `compare` output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated rows under a header line
    #[default]
    Tsv,
    /// One JSON object per line
    Json,
}

const TSV_HEADER: [&str; 4] = ["filepath", "local_hash", "remote_hash", "equal"];

/// One output row, as serialized in JSON mode.
#[derive(Debug, Serialize)]
pub struct OutputRow<'a> {
    pub filepath: &'a str,
    pub local_hash: String,
    pub remote_hash: Option<String>,
    pub equal: bool,
}

impl<'a> From<&'a Comparison> for OutputRow<'a> {
    fn from(comparison: &'a Comparison) -> Self {
        Self {
            filepath: &comparison.name,
            local_hash: comparison.local.to_string(),
            remote_hash: comparison.remote.map(|etag| etag.to_string()),
            equal: comparison.is_equal(),
        }
    }
}

/// Writes comparison rows to an output stream.
pub struct RowWriter<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> RowWriter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    /// Write the header line. JSON output has none.
    pub fn write_header(&mut self) -> io::Result<()> {
        match self.format {
            OutputFormat::Tsv => writeln!(self.out, "{}", TSV_HEADER.join("\t")),
            OutputFormat::Json => Ok(()),
        }
    }

    pub fn write_row(&mut self, comparison: &Comparison) -> io::Result<()> {
        let row = OutputRow::from(comparison);
        match self.format {
            OutputFormat::Tsv => {
                let remote = row.remote_hash.as_deref().unwrap_or("");
                writeln!(
                    self.out,
                    "{}\t{}\t{}\t{}",
                    tsv_field(row.filepath),
                    row.local_hash,
                    remote,
                    row.equal
                )?;
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, &row)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()
    }
}

/// Quote a field that would otherwise break the row: tabs, line breaks and
/// double quotes force quoting, with embedded quotes doubled.
fn tsv_field(value: &str) -> Cow<'_, str> {
    if value.contains(['\t', '\n', '\r', '"']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
