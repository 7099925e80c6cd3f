//! Dashboard view state and text rendering

use std::fmt::Write as _;

use chemvis_common::models::UploadSession;

use crate::api::Snapshot;
use crate::fallback::demo_snapshot;
use crate::poller::FetchOutcome;

/// Widest bar in the distribution chart, in characters
const BAR_WIDTH: usize = 30;

/// Rows shown in the equipment table before it is cut off
const TABLE_ROWS: usize = 20;

/// Where the displayed data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// No fetch has completed yet
    Connecting,
    /// Showing data from the server
    Online,
    /// Last fetch failed; showing previous or demo data
    Demo,
    /// Showing a file processed without the server
    Local,
}

impl Connectivity {
    pub fn label(&self) -> &'static str {
        match self {
            Connectivity::Connecting => "CONNECTING",
            Connectivity::Online => "SYSTEM ONLINE",
            Connectivity::Demo => "DEMO MODE",
            Connectivity::Local => "LOCAL DATA",
        }
    }
}

/// What [`Dashboard::apply`] did with a fetch result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// New server data is displayed
    Updated,
    /// Fetch failed; the indicator switched to demo mode
    Degraded,
    /// A newer request was already applied; result dropped
    Stale,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    snapshot: Snapshot,
    connectivity: Connectivity,
    last_applied: u64,
    has_real_data: bool,
    last_error: Option<String>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    /// Starts on the demo dataset until the first fetch lands
    pub fn new() -> Self {
        Self {
            snapshot: demo_snapshot(),
            connectivity: Connectivity::Connecting,
            last_applied: 0,
            has_real_data: false,
            last_error: None,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Apply a fetch result unless a newer request was already applied
    pub fn apply(&mut self, outcome: FetchOutcome) -> ApplyOutcome {
        if outcome.sequence <= self.last_applied {
            return ApplyOutcome::Stale;
        }
        self.last_applied = outcome.sequence;

        match outcome.result {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                self.connectivity = Connectivity::Online;
                self.has_real_data = true;
                self.last_error = None;
                ApplyOutcome::Updated
            }
            Err(e) => {
                if !self.has_real_data {
                    self.snapshot = demo_snapshot();
                }
                self.connectivity = Connectivity::Demo;
                self.last_error = Some(e.to_string());
                ApplyOutcome::Degraded
            }
        }
    }

    /// Show a locally processed file instead of server data
    ///
    /// Fetches numbered up to `requested` are treated as applied, so a reply
    /// still in flight cannot replace the local view. Later refreshes can.
    pub fn load_local(&mut self, snapshot: Snapshot, requested: u64) {
        self.snapshot = snapshot;
        self.connectivity = Connectivity::Local;
        self.has_real_data = true;
        self.last_applied = self.last_applied.max(requested);
        self.last_error = None;
    }

    /// Render the full dashboard as text
    pub fn render(&self) -> String {
        let mut out = String::new();
        let summary = &self.snapshot.summary;

        let _ = writeln!(out, "=== ChemVis Pro | Industrial Dashboard ===   [{}]", self.connectivity.label());
        if let Some(error) = &self.last_error {
            let _ = writeln!(out, "    last error: {}", error);
        }
        let _ = writeln!(out);

        let _ = writeln!(
            out,
            "TOTAL UNITS {:>6}   AVG FLOWRATE {:>8.2}   AVG PRESSURE {:>6.2}   AVG TEMP {:>7.2}",
            summary.total_equipment, summary.avg_flowrate, summary.avg_pressure, summary.avg_temperature
        );
        let _ = writeln!(out);

        let _ = writeln!(out, "Equipment Distribution");
        out.push_str(&render_distribution(&self.snapshot));
        let _ = writeln!(out);

        out.push_str(&render_table(&self.snapshot));
        out
    }
}

fn render_distribution(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let rows = snapshot.summary.distribution_by_count();
    if rows.is_empty() {
        let _ = writeln!(out, "  (no data)");
        return out;
    }

    let max = rows.iter().map(|(_, count)| *count).max().unwrap_or(1).max(1);
    let label_width = rows.iter().map(|(kind, _)| kind.chars().count()).max().unwrap_or(0);

    for (kind, count) in rows {
        let width = (count as usize * BAR_WIDTH).div_ceil(max as usize);
        let _ = writeln!(
            out,
            "  {:<label_width$} | {} {}",
            kind,
            "#".repeat(width),
            count
        );
    }
    out
}

fn render_table(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<24} {:<22} {:>10} {:>10} {:>12}",
        "Equipment Name", "Type", "Flowrate", "Pressure", "Temperature"
    );
    let _ = writeln!(out, "{}", "-".repeat(82));

    for item in snapshot.equipment.iter().take(TABLE_ROWS) {
        let _ = writeln!(
            out,
            "{:<24} {:<22} {:>10.1} {:>10.1} {:>12.1}",
            truncate(&item.equipment_name, 24),
            truncate(&item.equipment_type, 22),
            item.flowrate,
            item.pressure,
            item.temperature
        );
    }

    if snapshot.equipment.len() > TABLE_ROWS {
        let _ = writeln!(out, "... and {} more", snapshot.equipment.len() - TABLE_ROWS);
    }
    out
}

/// Upload history listing
pub fn render_history(sessions: &[UploadSession]) -> String {
    let mut out = String::new();
    if sessions.is_empty() {
        let _ = writeln!(out, "No uploads yet.");
        return out;
    }

    let _ = writeln!(out, "{:>6}  {:<20}  {:>6}  Filename", "Id", "Uploaded (UTC)", "Items");
    for session in sessions {
        let _ = writeln!(
            out,
            "{:>6}  {:<20}  {:>6}  {}",
            session.id,
            session.upload_date.format("%Y-%m-%d %H:%M:%S"),
            session.item_count,
            session.filename
        );
    }
    out
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}
