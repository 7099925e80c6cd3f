//! Equipment report generation
//!
//! A report is laid out in two steps: [`ReportContent::build`] turns the
//! current summary and equipment listing into plain rows and labels, then
//! [`ReportContent::render_pdf`] draws them. Everything except the generation
//! timestamp is a pure function of the input data.

mod pdf;

use chrono::NaiveDateTime;

use crate::models::{EquipmentItem, SummaryStats};
use crate::{Error, Result};

pub const REPORT_TITLE: &str = "ChemVis Pro Industrial Report";

/// Message used when there is nothing to report on
pub const NO_DATA_MESSAGE: &str = "No data available for report generation.";

/// Label of the first key-metrics row
pub const TOTAL_UNITS_LABEL: &str = "Total Equipment Units";

/// One row of the key-metrics table
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub label: &'static str,
    pub value: String,
}

/// One row of the type-distribution table (and one bar of the chart)
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionRow {
    pub equipment_type: String,
    pub count: i64,
    /// Share of all units, in percent
    pub percentage: f64,
}

/// Fully laid-out report, ready to render
#[derive(Debug, Clone)]
pub struct ReportContent {
    pub title: String,
    pub subtitle: String,
    pub generated_at: NaiveDateTime,
    pub total_units: i64,
    pub metrics: Vec<MetricRow>,
    /// Ordered by count descending, then type name
    pub distribution: Vec<DistributionRow>,
    pub equipment: Vec<EquipmentItem>,
}

impl ReportContent {
    /// Lay out a report for the given data
    ///
    /// Fails with [`Error::NotFound`] when the equipment set is empty.
    pub fn build(
        summary: &SummaryStats,
        equipment: &[EquipmentItem],
        generated_at: NaiveDateTime,
    ) -> Result<Self> {
        if summary.is_empty() {
            return Err(Error::NotFound(NO_DATA_MESSAGE.to_string()));
        }

        let metrics = vec![
            MetricRow {
                label: TOTAL_UNITS_LABEL,
                value: summary.total_equipment.to_string(),
            },
            MetricRow {
                label: "Average Flowrate",
                value: format!("{:.2} m3/h", summary.avg_flowrate),
            },
            MetricRow {
                label: "Average Pressure",
                value: format!("{:.2} Bar", summary.avg_pressure),
            },
            MetricRow {
                label: "Average Temperature",
                value: format!("{:.2} C", summary.avg_temperature),
            },
        ];

        let distribution = summary
            .distribution_by_count()
            .into_iter()
            .map(|(kind, count)| DistributionRow {
                equipment_type: kind.to_string(),
                count,
                percentage: summary.percentage_of_total(count),
            })
            .collect();

        Ok(Self {
            title: REPORT_TITLE.to_string(),
            subtitle: format!(
                "System Analytics Generated on {}",
                generated_at.format("%B %d, %Y at %H:%M")
            ),
            generated_at,
            total_units: summary.total_equipment,
            metrics,
            distribution,
            equipment: equipment.to_vec(),
        })
    }

    /// Upper bound of the chart's value axis (largest count + 1)
    pub fn chart_axis_max(&self) -> i64 {
        self.distribution.iter().map(|row| row.count).max().unwrap_or(0) + 1
    }

    /// Download filename, e.g. `Industrial_Report_20261016.pdf`
    pub fn filename(&self) -> String {
        format!("Industrial_Report_{}.pdf", self.generated_at.format("%Y%m%d"))
    }

    /// Render to PDF bytes
    pub fn render_pdf(&self) -> Result<Vec<u8>> {
        pdf::render(self)
    }
}
