//! Client tests against a live chemvis-server
//!
//! Each test starts the real router on an ephemeral localhost port with a
//! temporary database.

use std::sync::Arc;
use std::time::Duration;

use chemvis_common::events::EventBus;
use chemvis_common::models::EquipmentRecord;
use chemvis_desktop::api::{ApiClient, SnapshotSource};
use chemvis_desktop::config::DesktopConfig;
use chemvis_desktop::dashboard::{ApplyOutcome, Connectivity, Dashboard};
use chemvis_desktop::poller::Poller;
use chemvis_desktop::subscriber::{listen, RefreshTrigger};
use chemvis_desktop::upload::{upload_with_fallback, PreparedUpload, UploadOutcome};
use chemvis_desktop::ClientError;
use chemvis_server::db::{self, RetentionPolicy};
use chemvis_server::{build_router, AppState};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const EXAMPLE_CSV: &str = "Equipment Name,Type,Flowrate,Pressure,Temperature\n\
                           P1,Centrifugal,10,1,20\n\
                           P2,Axial,20,2,30\n";

struct TestServer {
    _dir: TempDir,
    state: AppState,
    url: String,
}

impl TestServer {
    async fn start() -> Self {
        let dir = TempDir::new().unwrap();
        let pool = db::init_database(&dir.path().join("chemvis.db")).await.unwrap();
        let state = AppState::new(pool, EventBus::new(16), RetentionPolicy::default());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = build_router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            _dir: dir,
            state,
            url: format!("http://{}", addr),
        }
    }

    fn client(&self) -> ApiClient {
        client_for(&self.url)
    }
}

fn client_for(url: &str) -> ApiClient {
    ApiClient::new(&DesktopConfig {
        server_url: url.to_string(),
        request_timeout: Duration::from_secs(2),
        upload_timeout: Duration::from_secs(8),
        output_dir: ".".into(),
    })
    .unwrap()
}

/// URL of a localhost port nothing listens on
async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn example_upload() -> PreparedUpload {
    PreparedUpload {
        filename: "example.csv".to_string(),
        bytes: EXAMPLE_CSV.as_bytes().to_vec(),
        records: chemvis_common::csv_schema::parse_equipment_csv(EXAMPLE_CSV.as_bytes()).unwrap(),
    }
}

#[tokio::test]
async fn test_snapshot_from_empty_server() {
    let server = TestServer::start().await;

    let snapshot = server.client().fetch_snapshot().await.unwrap();
    assert_eq!(snapshot.summary.total_equipment, 0);
    assert!(snapshot.equipment.is_empty());
}

#[tokio::test]
async fn test_upload_then_fetch() {
    let server = TestServer::start().await;
    let client = server.client();

    match upload_with_fallback(&client, example_upload()).await {
        UploadOutcome::Uploaded(response) => {
            assert!(response.success);
            assert_eq!(response.message, "Processed 2 items");
        }
        UploadOutcome::Local { reason, .. } => panic!("upload fell back: {reason}"),
    }

    let snapshot = client.fetch_snapshot().await.unwrap();
    assert_eq!(snapshot.summary.total_equipment, 2);
    assert_eq!(snapshot.summary.avg_flowrate, 15.0);
    assert_eq!(snapshot.equipment.len(), 2);

    let history = client.fetch_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].filename, "example.csv");

    let report = client.download_report().await.unwrap();
    assert!(report.filename.starts_with("Industrial_Report_"));
    assert!(report.bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_server_rejection_falls_back_to_local() {
    let server = TestServer::start().await;

    let upload = PreparedUpload {
        filename: "renamed.csv".to_string(),
        bytes: b"Name,Kind\nP1,Pump\n".to_vec(),
        records: vec![EquipmentRecord {
            name: "P1".to_string(),
            equipment_type: "Pump".to_string(),
            flowrate: 5.0,
            pressure: 1.0,
            temperature: 10.0,
        }],
    };

    match upload_with_fallback(&server.client(), upload).await {
        UploadOutcome::Local { snapshot, reason } => {
            assert_eq!(snapshot.summary.total_equipment, 1);
            assert!(reason.starts_with("server rejected the file"), "unexpected reason: {reason}");
            assert!(reason.contains("400"), "unexpected reason: {reason}");
        }
        UploadOutcome::Uploaded(_) => panic!("server accepted an invalid file"),
    }

    assert_eq!(db::count_sessions(&server.state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_report_download_on_empty_server_is_rejected() {
    let server = TestServer::start().await;

    match server.client().download_report().await {
        Err(ClientError::Server { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "No data available for report generation.");
        }
        other => panic!("Expected 404, got {:?}", other.map(|r| r.filename)),
    }
}

#[tokio::test]
async fn test_unreachable_server_degrades_to_demo() {
    let client = Arc::new(client_for(&unreachable_url().await));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let poller = Poller::new(Arc::clone(&client), tx);
    let mut dashboard = Dashboard::new();

    poller.request_refresh();
    let outcome = rx.recv().await.unwrap();
    assert!(outcome.result.is_err());

    assert_eq!(dashboard.apply(outcome), ApplyOutcome::Degraded);
    assert_eq!(dashboard.connectivity(), Connectivity::Demo);
    assert_eq!(dashboard.snapshot().summary.total_equipment, 5);

    match upload_with_fallback(&client, example_upload()).await {
        UploadOutcome::Local { snapshot, reason } => {
            assert!(reason.starts_with("server unavailable"), "unexpected reason: {reason}");
            dashboard.load_local(snapshot, poller.last_sequence());
            assert_eq!(dashboard.connectivity(), Connectivity::Local);
            assert_eq!(dashboard.snapshot().summary.total_equipment, 2);
        }
        UploadOutcome::Uploaded(_) => panic!("upload to closed port succeeded"),
    }
}

#[tokio::test]
async fn test_listener_requests_refresh_on_upload() {
    let server = TestServer::start().await;
    let client = server.client();
    let (trigger_tx, mut trigger_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(listen(
        client.http().clone(),
        client.url("/events"),
        trigger_tx,
        cancel.clone(),
    ));

    // Wait until the server side has subscribed
    tokio::time::timeout(Duration::from_secs(5), async {
        while server.state.event_bus.subscriber_count() == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    client.upload_csv("example.csv", EXAMPLE_CSV.as_bytes().to_vec()).await.unwrap();

    let trigger = tokio::time::timeout(Duration::from_secs(5), trigger_rx.recv())
        .await
        .unwrap();
    assert_eq!(trigger, Some(RefreshTrigger));

    cancel.cancel();
    let requested = handle.await.unwrap().unwrap();
    assert_eq!(requested, 1);
}

#[tokio::test]
async fn test_listener_stops_when_server_unreachable() {
    let client = client_for(&unreachable_url().await);
    let (trigger_tx, _trigger_rx) = mpsc::unbounded_channel();

    let result = listen(
        client.http().clone(),
        client.url("/events"),
        trigger_tx,
        CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(ClientError::Http(_))));
}
