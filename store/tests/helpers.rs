//! Test helper utilities for store integration tests

#![allow(dead_code)]

use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use shared::StoreConfig;
use store::{ArtifactStorage, DiskArtifactStorage, Evaluator, SimulatedEvaluator, StoreServer};

/// A store running on an ephemeral port; dropping it stops the server
pub struct RunningStore {
    pub base_url: String,
    pub uploads: TempDir,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for RunningStore {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Config tuned for tests: fast evaluation, deterministic outcome
pub fn test_config(uploads: &TempDir, success_rate: f64) -> StoreConfig {
    StoreConfig {
        uploads_dir: uploads.path().to_path_buf(),
        min_evaluation_delay_ms: 10,
        max_evaluation_delay_ms: 30,
        success_rate,
        ..StoreConfig::default()
    }
}

/// Start a store with disk storage and the simulated evaluator
pub async fn spawn_store(success_rate: f64) -> RunningStore {
    spawn_store_with(|uploads| test_config(uploads, success_rate)).await
}

/// Start a store with disk storage and a config built from the uploads dir
pub async fn spawn_store_with<F>(configure: F) -> RunningStore
where
    F: FnOnce(&TempDir) -> StoreConfig,
{
    let uploads = tempfile::tempdir().unwrap();
    let config = configure(&uploads);
    let storage = DiskArtifactStorage::new(config.uploads_dir.clone());
    let evaluator = SimulatedEvaluator::from_config(&config);
    let (base_url, shutdown) = spawn_server(StoreServer::new(config, storage, evaluator)).await;
    RunningStore {
        base_url,
        uploads,
        shutdown: Some(shutdown),
    }
}

/// Serve any store on 127.0.0.1:0, returning its base URL and a stop handle
pub async fn spawn_server<A, E>(server: StoreServer<A, E>) -> (String, oneshot::Sender<()>)
where
    A: ArtifactStorage + 'static,
    E: Evaluator + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let _ = server
            .serve_until(listener, async {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{}", address), tx)
}

/// Multipart upload form with the fields the store expects
pub fn upload_form(file_name: &str, bytes: Vec<u8>, user_id: &str, user_name: &str) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new()
        .part("file", reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string()))
        .text("userId", user_id.to_string())
        .text("userName", user_name.to_string())
}

/// Poll `condition` until it holds or `timeout_ms` passes
pub async fn wait_for_condition<F, Fut>(mut condition: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);

    loop {
        if condition().await {
            return true;
        }
        if start.elapsed() > timeout {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
