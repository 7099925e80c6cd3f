//! Equipment listing and SQL-side summary statistics
//!
//! Reads that must agree with each other run inside one transaction, so they
//! see the same WAL snapshot even while uploads commit concurrently.

use std::collections::BTreeMap;

use chemvis_common::models::{EquipmentItem, SummaryStats};
use chemvis_common::Result;
use sqlx::{Row, SqliteConnection, SqlitePool};

/// Summary and listing taken from a single snapshot of the store
#[derive(Debug, Clone)]
pub struct Dataset {
    pub summary: SummaryStats,
    pub equipment: Vec<EquipmentItem>,
}

/// Every stored item, newest first
pub async fn list_equipment(pool: &SqlitePool) -> Result<Vec<EquipmentItem>> {
    let mut conn = pool.acquire().await?;
    fetch_equipment(&mut conn).await
}

/// Summary statistics over the whole store
pub async fn summarize(pool: &SqlitePool) -> Result<SummaryStats> {
    let mut tx = pool.begin().await?;
    let summary = fetch_summary(&mut tx).await?;
    tx.commit().await?;
    Ok(summary)
}

/// Summary plus full listing, consistent with each other
pub async fn load_dataset(pool: &SqlitePool) -> Result<Dataset> {
    let mut tx = pool.begin().await?;
    let summary = fetch_summary(&mut tx).await?;
    let equipment = fetch_equipment(&mut tx).await?;
    tx.commit().await?;

    Ok(Dataset { summary, equipment })
}

async fn fetch_equipment(conn: &mut SqliteConnection) -> Result<Vec<EquipmentItem>> {
    let rows = sqlx::query(
        r#"
        SELECT id, upload_session, equipment_name, equipment_type, flowrate, pressure, temperature
        FROM equipment_items
        ORDER BY id DESC
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        items.push(EquipmentItem {
            id: row.try_get("id")?,
            upload_session: row.try_get("upload_session")?,
            equipment_name: row.try_get("equipment_name")?,
            equipment_type: row.try_get("equipment_type")?,
            flowrate: row.try_get("flowrate")?,
            pressure: row.try_get("pressure")?,
            temperature: row.try_get("temperature")?,
        });
    }

    Ok(items)
}

/// AVG over zero rows is NULL, which becomes 0.
async fn fetch_summary(conn: &mut SqliteConnection) -> Result<SummaryStats> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS total,
               AVG(flowrate) AS avg_flowrate,
               AVG(pressure) AS avg_pressure,
               AVG(temperature) AS avg_temperature
        FROM equipment_items
        "#,
    )
    .fetch_one(&mut *conn)
    .await?;

    let total: i64 = row.try_get("total")?;
    let avg_flowrate: Option<f64> = row.try_get("avg_flowrate")?;
    let avg_pressure: Option<f64> = row.try_get("avg_pressure")?;
    let avg_temperature: Option<f64> = row.try_get("avg_temperature")?;

    let type_rows = sqlx::query(
        r#"
        SELECT equipment_type, COUNT(*) AS count
        FROM equipment_items
        GROUP BY equipment_type
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut distribution = BTreeMap::new();
    for row in type_rows {
        let equipment_type: String = row.try_get("equipment_type")?;
        let count: i64 = row.try_get("count")?;
        distribution.insert(equipment_type, count);
    }

    Ok(SummaryStats::from_aggregates(
        total,
        avg_flowrate,
        avg_pressure,
        avg_temperature,
        distribution,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sessions::{store_upload, RetentionPolicy};
    use crate::db::test_support::memory_pool;
    use chemvis_common::models::EquipmentRecord;
    use tempfile::TempDir;

    fn record(name: &str, kind: &str, flowrate: f64, pressure: f64, temperature: f64) -> EquipmentRecord {
        EquipmentRecord {
            name: name.to_string(),
            equipment_type: kind.to_string(),
            flowrate,
            pressure,
            temperature,
        }
    }

    #[tokio::test]
    async fn test_empty_store_summary_is_zero() {
        let pool = memory_pool().await;
        let summary = summarize(&pool).await.unwrap();
        assert_eq!(summary, SummaryStats::default());
        assert!(list_equipment(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summary_matches_example() {
        let pool = memory_pool().await;
        let records = vec![
            record("P1", "Centrifugal", 10.0, 1.0, 20.0),
            record("P2", "Axial", 20.0, 2.0, 30.0),
        ];
        store_upload(&pool, "example.csv", &records, RetentionPolicy::default())
            .await
            .unwrap();

        let summary = summarize(&pool).await.unwrap();
        assert_eq!(summary.total_equipment, 2);
        assert_eq!(summary.avg_flowrate, 15.0);
        assert_eq!(summary.avg_pressure, 1.5);
        assert_eq!(summary.avg_temperature, 25.0);
        assert_eq!(summary.type_distribution.get("Axial"), Some(&1));
        assert_eq!(summary.type_distribution.get("Centrifugal"), Some(&1));
    }

    #[tokio::test]
    async fn test_sql_and_in_memory_summaries_agree() {
        let pool = memory_pool().await;
        let records = vec![
            record("A", "Pump", 10.111, 1.0, 20.0),
            record("B", "Pump", 20.333, 2.5, 31.7),
            record("C", "Valve", 7.0, 3.3, 18.2),
        ];
        store_upload(&pool, "mix.csv", &records, RetentionPolicy::default())
            .await
            .unwrap();

        let from_sql = summarize(&pool).await.unwrap();
        let items = list_equipment(&pool).await.unwrap();
        let in_memory = chemvis_common::summary::summarize(&items);

        assert_eq!(from_sql, in_memory);
        assert_eq!(from_sql.type_distribution.values().sum::<i64>(), from_sql.total_equipment);
    }

    #[tokio::test]
    async fn test_listing_is_id_descending() {
        let pool = memory_pool().await;
        let records = vec![
            record("First", "Pump", 1.0, 1.0, 1.0),
            record("Second", "Pump", 2.0, 1.0, 1.0),
        ];
        store_upload(&pool, "order.csv", &records, RetentionPolicy::default())
            .await
            .unwrap();

        let items = list_equipment(&pool).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].id > items[1].id);
        assert_eq!(items[0].equipment_name, "Second");
    }

    #[tokio::test]
    async fn test_dataset_summary_matches_listing() {
        let pool = memory_pool().await;
        let records = vec![
            record("P1", "Centrifugal", 10.0, 1.0, 20.0),
            record("P2", "Axial", 20.0, 2.0, 30.0),
        ];
        store_upload(&pool, "example.csv", &records, RetentionPolicy::default())
            .await
            .unwrap();

        let dataset = load_dataset(&pool).await.unwrap();
        assert_eq!(dataset.summary.total_equipment, 2);
        assert_eq!(dataset.equipment.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_reads_stay_consistent_during_concurrent_uploads() {
        let temp_dir = TempDir::new().unwrap();
        let pool = crate::db::init_database(&temp_dir.path().join("chemvis.db"))
            .await
            .unwrap();

        let writer = tokio::spawn({
            let pool = pool.clone();
            async move {
                let kinds = ["Pump", "Valve", "Compressor"];
                for i in 0..150usize {
                    let records: Vec<EquipmentRecord> = (0..=(i % 4))
                        .map(|j| record(&format!("E{i}-{j}"), kinds[(i + j) % kinds.len()], 1.0, 1.0, 1.0))
                        .collect();
                    store_upload(&pool, "load.csv", &records, RetentionPolicy::default())
                        .await
                        .unwrap();
                }
            }
        });

        loop {
            let done = writer.is_finished();
            let summary = summarize(&pool).await.unwrap();
            assert_eq!(
                summary.type_distribution.values().sum::<i64>(),
                summary.total_equipment
            );

            let dataset = load_dataset(&pool).await.unwrap();
            assert_eq!(dataset.summary.total_equipment, dataset.equipment.len() as i64);

            if done {
                break;
            }
        }
        writer.await.unwrap();
    }
}
