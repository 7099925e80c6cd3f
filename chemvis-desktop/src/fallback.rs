//! Offline datasets: the built-in demo snapshot and local-only file processing

use chemvis_common::models::{EquipmentItem, EquipmentRecord};
use chemvis_common::summary::summarize;

use crate::api::Snapshot;

/// (name, type, flowrate, pressure, temperature)
const DEMO_EQUIPMENT: [(&str, &str, f64, f64, f64); 5] = [
    ("Pump-A01", "Centrifugal", 50.5, 3.2, 72.4),
    ("Pump-B02", "Positive Displacement", 42.3, 2.8, 68.9),
    ("Compressor-C01", "Reciprocating", 45.2, 3.5, 75.1),
    ("Blower-D01", "Centrifugal", 48.9, 3.1, 71.2),
    ("Fan-E01", "Axial", 40.1, 2.5, 65.8),
];

/// Dataset shown before the server has ever answered
pub fn demo_snapshot() -> Snapshot {
    let records = DEMO_EQUIPMENT
        .iter()
        .map(|&(name, kind, flowrate, pressure, temperature)| EquipmentRecord {
            name: name.to_string(),
            equipment_type: kind.to_string(),
            flowrate,
            pressure,
            temperature,
        })
        .collect();
    local_snapshot(records)
}

/// Snapshot built from validated rows without touching the server
///
/// Items get sequential ids and no owning session; the listing is newest
/// first like the server's.
pub fn local_snapshot(records: Vec<EquipmentRecord>) -> Snapshot {
    let mut equipment: Vec<EquipmentItem> = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_item(index as i64 + 1, 0))
        .collect();
    equipment.reverse();

    Snapshot {
        summary: summarize(&equipment),
        equipment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chemvis_common::csv_schema::parse_equipment_csv;

    #[test]
    fn test_demo_snapshot_is_consistent() {
        let snapshot = demo_snapshot();
        assert_eq!(snapshot.summary.total_equipment, 5);
        assert_eq!(snapshot.equipment.len(), 5);
        assert_eq!(snapshot.summary.type_distribution.get("Centrifugal"), Some(&2));
        assert_eq!(
            snapshot.summary.type_distribution.values().sum::<i64>(),
            snapshot.summary.total_equipment
        );
    }

    #[test]
    fn test_local_snapshot_from_file() {
        let csv = "Equipment Name,Type,Flowrate,Pressure,Temperature\n\
                   P1,Centrifugal,10,1,20\n\
                   P2,Axial,20,2,30\n";
        let records = parse_equipment_csv(csv.as_bytes()).unwrap();
        let snapshot = local_snapshot(records);

        assert_eq!(snapshot.summary.total_equipment, 2);
        assert_eq!(snapshot.summary.avg_flowrate, 15.0);
        assert_eq!(snapshot.equipment[0].equipment_name, "P2");
        assert_eq!(snapshot.equipment[0].id, 2);
    }
}
