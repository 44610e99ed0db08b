//! Results table for a finished run: unit conversion and copy actions.

pub mod clipboard;

use std::time::{Duration, Instant};

use thiserror::Error;

use crate::model::ResultRow;

pub use clipboard::{Clipboard, ClipboardError, ClipboardWriter, SystemClipboard};

pub const NO_RESULTS_NOTICE: &str = "No matching IPs found.";
pub const NOTHING_TO_COPY_NOTICE: &str = "No IPs to copy.";
pub const COPY_LABEL: &str = "Copy";
pub const COPIED_LABEL: &str = "Copied!";

/// How long a copy action shows its confirmation before reverting.
pub const COPY_CONFIRMATION: Duration = Duration::from_millis(1500);

pub const HEADERS: [&str; 6] = [
    "IP address",
    "Latency (ms)",
    "Download (MB/s)",
    "Colo",
    "Region",
    "Action",
];

#[derive(Debug, Error)]
pub enum ResultsError {
    #[error("no result row {0}")]
    NoSuchRow(usize),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

/// Outcome of the bulk copy action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkCopy {
    Copied(usize),
    /// Nothing rendered; the caller shows [`NOTHING_TO_COPY_NOTICE`].
    NothingToCopy,
}

/// A result row with display units applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub address: String,
    pub delay_ms: String,
    pub speed_mb_s: String,
    pub colo: String,
    pub region: String,
}

impl From<&ResultRow> for RenderedRow {
    fn from(row: &ResultRow) -> Self {
        Self {
            address: row.address.clone(),
            delay_ms: delay_ms(row.delay_nanoseconds),
            speed_mb_s: speed_mb_s(row.download_speed_kbps),
            colo: row.colo.clone(),
            region: row.region.clone(),
        }
    }
}

/// Nanoseconds to milliseconds, two decimals.
pub fn delay_ms(nanoseconds: i64) -> String {
    format!("{:.2}", nanoseconds as f64 / 1_000_000.0)
}

/// KB/s to MB/s, two decimals.
pub fn speed_mb_s(kbps: f64) -> String {
    format!("{:.2}", kbps / 1024.0)
}

#[derive(Debug, Clone)]
pub struct ResultsView {
    rows: Vec<RenderedRow>,
    row_copied_at: Vec<Option<Instant>>,
    bulk_copied_at: Option<Instant>,
}

impl ResultsView {
    /// Render rows in arrival order. The source rows are not kept.
    pub fn render(rows: &[ResultRow]) -> Self {
        Self {
            rows: rows.iter().map(RenderedRow::from).collect(),
            row_copied_at: vec![None; rows.len()],
            bulk_copied_at: None,
        }
    }

    pub fn rows(&self) -> &[RenderedRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Copy one row's address.
    pub fn copy_row(
        &mut self,
        index: usize,
        clipboard: &mut dyn Clipboard,
        now: Instant,
    ) -> Result<(), ResultsError> {
        let row = self.rows.get(index).ok_or(ResultsError::NoSuchRow(index))?;
        clipboard.write_text(&row.address)?;
        self.row_copied_at[index] = Some(now);
        Ok(())
    }

    /// All rendered addresses, one per line, in row order.
    pub fn addresses(&self) -> String {
        self.rows
            .iter()
            .map(|r| r.address.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn copy_all(
        &mut self,
        clipboard: &mut dyn Clipboard,
        now: Instant,
    ) -> Result<BulkCopy, ResultsError> {
        if self.rows.is_empty() {
            return Ok(BulkCopy::NothingToCopy);
        }
        clipboard.write_text(&self.addresses())?;
        self.bulk_copied_at = Some(now);
        Ok(BulkCopy::Copied(self.rows.len()))
    }

    /// Label of a row's copy action at `now`.
    pub fn row_action_label(&self, index: usize, now: Instant) -> &'static str {
        label(self.row_copied_at.get(index).copied().flatten(), now)
    }

    pub fn bulk_action_label(&self, now: Instant) -> &'static str {
        label(self.bulk_copied_at, now)
    }

    /// Plain-text table, or the empty notice.
    pub fn to_text(&self, now: Instant) -> String {
        if self.rows.is_empty() {
            return NO_RESULTS_NOTICE.to_string();
        }
        let mut out = format!(
            "{:<40} | {:>12} | {:>15} | {:<6} | {:<16} | {}\n",
            HEADERS[0], HEADERS[1], HEADERS[2], HEADERS[3], HEADERS[4], HEADERS[5]
        );
        out.push_str(&format!(
            "{:-<40}-|-{:->12}-|-{:->15}-|-{:-<6}-|-{:-<16}-|-{:-<7}\n",
            "", "", "", "", "", ""
        ));
        for (i, row) in self.rows.iter().enumerate() {
            out.push_str(&format!(
                "{:<40} | {:>12} | {:>15} | {:<6} | {:<16} | {}\n",
                row.address,
                row.delay_ms,
                row.speed_mb_s,
                row.colo,
                row.region,
                self.row_action_label(i, now)
            ));
        }
        out
    }
}

fn label(copied_at: Option<Instant>, now: Instant) -> &'static str {
    match copied_at {
        Some(at) if now.saturating_duration_since(at) < COPY_CONFIRMATION => COPIED_LABEL,
        _ => COPY_LABEL,
    }
}
