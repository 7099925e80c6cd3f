//! Summary statistics over equipment items
//!
//! The server computes the same numbers with SQL aggregates and feeds them
//! through [`SummaryStats::from_aggregates`]; the desktop viewer uses
//! [`summarize`] on in-memory items. Both paths share the rounding here.

use std::collections::BTreeMap;

use crate::models::{EquipmentItem, SummaryStats};

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl SummaryStats {
    /// Build from raw aggregate values (`None` averages mean "no rows")
    pub fn from_aggregates(
        total_equipment: i64,
        avg_flowrate: Option<f64>,
        avg_pressure: Option<f64>,
        avg_temperature: Option<f64>,
        type_distribution: BTreeMap<String, i64>,
    ) -> Self {
        Self {
            total_equipment,
            avg_flowrate: round2(avg_flowrate.unwrap_or(0.0)),
            avg_pressure: round2(avg_pressure.unwrap_or(0.0)),
            avg_temperature: round2(avg_temperature.unwrap_or(0.0)),
            type_distribution,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_equipment == 0
    }

    /// Distribution ordered by count (descending), then type name
    pub fn distribution_by_count(&self) -> Vec<(&str, i64)> {
        let mut entries: Vec<(&str, i64)> = self
            .type_distribution
            .iter()
            .map(|(kind, count)| (kind.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Share of the total held by `count`, in percent
    pub fn percentage_of_total(&self, count: i64) -> f64 {
        if self.total_equipment > 0 {
            count as f64 / self.total_equipment as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// Compute summary statistics over a full equipment set
pub fn summarize(items: &[EquipmentItem]) -> SummaryStats {
    if items.is_empty() {
        return SummaryStats::default();
    }

    let count = items.len() as f64;
    let mean = |field: fn(&EquipmentItem) -> f64| items.iter().map(field).sum::<f64>() / count;

    let mut distribution = BTreeMap::new();
    for item in items {
        *distribution.entry(item.equipment_type.clone()).or_insert(0) += 1;
    }

    SummaryStats::from_aggregates(
        items.len() as i64,
        Some(mean(|i| i.flowrate)),
        Some(mean(|i| i.pressure)),
        Some(mean(|i| i.temperature)),
        distribution,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str, kind: &str, flowrate: f64, pressure: f64, temperature: f64) -> EquipmentItem {
        EquipmentItem {
            id,
            upload_session: 1,
            equipment_name: name.to_string(),
            equipment_type: kind.to_string(),
            flowrate,
            pressure,
            temperature,
        }
    }

    #[test]
    fn test_empty_set_is_all_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_equipment, 0);
        assert_eq!(summary.avg_flowrate, 0.0);
        assert_eq!(summary.avg_pressure, 0.0);
        assert_eq!(summary.avg_temperature, 0.0);
        assert!(summary.type_distribution.is_empty());
        assert!(summary.is_empty());
    }

    #[test]
    fn test_two_row_example() {
        let items = vec![
            item(1, "P1", "Centrifugal", 10.0, 1.0, 20.0),
            item(2, "P2", "Axial", 20.0, 2.0, 30.0),
        ];
        let summary = summarize(&items);

        assert_eq!(summary.total_equipment, 2);
        assert_eq!(summary.avg_flowrate, 15.0);
        assert_eq!(summary.avg_pressure, 1.5);
        assert_eq!(summary.avg_temperature, 25.0);
        assert_eq!(summary.type_distribution.get("Centrifugal"), Some(&1));
        assert_eq!(summary.type_distribution.get("Axial"), Some(&1));
    }

    #[test]
    fn test_averages_rounded_to_two_decimals() {
        let items = vec![
            item(1, "A", "Pump", 1.0, 1.0, 1.0),
            item(2, "B", "Pump", 1.0, 1.0, 1.0),
            item(3, "C", "Pump", 2.0, 2.0, 2.0),
        ];
        let summary = summarize(&items);
        // 4/3 = 1.3333...
        assert_eq!(summary.avg_flowrate, 1.33);
    }

    #[test]
    fn test_distribution_sums_to_total() {
        let items = vec![
            item(1, "A", "Pump", 1.0, 1.0, 1.0),
            item(2, "B", "Pump", 1.0, 1.0, 1.0),
            item(3, "C", "Valve", 1.0, 1.0, 1.0),
            item(4, "D", "Tank", 1.0, 1.0, 1.0),
        ];
        let summary = summarize(&items);
        let sum: i64 = summary.type_distribution.values().sum();
        assert_eq!(sum, summary.total_equipment);
    }

    #[test]
    fn test_distribution_by_count_orders_desc_then_name() {
        let items = vec![
            item(1, "A", "Valve", 1.0, 1.0, 1.0),
            item(2, "B", "Pump", 1.0, 1.0, 1.0),
            item(3, "C", "Pump", 1.0, 1.0, 1.0),
            item(4, "D", "Axial", 1.0, 1.0, 1.0),
        ];
        let summary = summarize(&items);
        assert_eq!(
            summary.distribution_by_count(),
            vec![("Pump", 2), ("Axial", 1), ("Valve", 1)]
        );
    }

    #[test]
    fn test_from_aggregates_none_means_zero() {
        let summary = SummaryStats::from_aggregates(0, None, None, None, BTreeMap::new());
        assert_eq!(summary, SummaryStats::default());
    }

    #[test]
    fn test_percentage_of_total() {
        let mut distribution = BTreeMap::new();
        distribution.insert("Pump".to_string(), 1);
        distribution.insert("Valve".to_string(), 3);
        let summary = SummaryStats::from_aggregates(4, Some(1.0), Some(1.0), Some(1.0), distribution);
        assert_eq!(summary.percentage_of_total(1), 25.0);
        assert_eq!(SummaryStats::default().percentage_of_total(1), 0.0);
    }
}
