//! finbot-report: ledger summary, chart data sets and PNG rendering

pub mod charts;
pub mod render;
pub mod summary;

pub use charts::{Chart, ChartData, ChartKind, build_charts};
pub use render::{RenderedChart, render_all, render_png};
pub use summary::{Summary, escape_markdown};

use finbot_core::LedgerRow;

/// Everything the statistics command sends back.
#[derive(Debug, Clone)]
pub struct Report {
    pub summary: Summary,
    pub charts: Vec<Chart>,
}

impl Report {
    pub fn from_rows(rows: &[LedgerRow]) -> Self {
        Self {
            summary: Summary::from_rows(rows),
            charts: build_charts(rows),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
    }

    /// Render every chart to PNG. CPU-bound; run it off the async runtime.
    pub fn render(&self) -> anyhow::Result<Vec<RenderedChart>> {
        render_all(&self.charts)
    }
}
