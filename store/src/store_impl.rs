//! Main store implementation
//!
//! `StoreServer` owns the submission registry and the injected storage and
//! evaluation services. Handlers in `web::handlers` call into it; every
//! accepted upload spawns its own evaluation task.

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use shared::logging::{log_error, log_shutdown};
use shared::validation::{base_name, describe_extensions, matched_extension};
use shared::{
    LeaderboardEntry, ProcessId, StoreConfig, Submission, UploadReceipt, new_submission_id, process_info,
    process_warn,
};

use crate::core::SubmissionRegistry;
use crate::error::{StoreError, StoreResult};
use crate::traits::{ArtifactStorage, Evaluator};
use crate::types::{IncomingArtifact, StoredArtifact};
use crate::web::handlers::api;

/// Multipart framing allowance on top of the upload ceiling, so an oversized
/// file still reaches the explicit size check and gets a `{detail}` body
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Submission store with dependency injection
pub struct StoreServer<A, E> {
    config: Arc<StoreConfig>,
    registry: Arc<RwLock<SubmissionRegistry>>,
    storage: Arc<A>,
    evaluator: Arc<E>,
}

impl<A, E> Clone for StoreServer<A, E> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            registry: Arc::clone(&self.registry),
            storage: Arc::clone(&self.storage),
            evaluator: Arc::clone(&self.evaluator),
        }
    }
}

impl<A, E> StoreServer<A, E>
where
    A: ArtifactStorage + 'static,
    E: Evaluator + 'static,
{
    pub fn new(config: StoreConfig, storage: A, evaluator: E) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(RwLock::new(SubmissionRegistry::new())),
            storage: Arc::new(storage),
            evaluator: Arc::new(evaluator),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Build the Axum router with all routes
    pub fn build_router(&self) -> StoreResult<Router> {
        let origin = self
            .config
            .allowed_origin
            .parse::<HeaderValue>()
            .map_err(|e| StoreError::Config(format!("Invalid allowed origin '{}': {}", self.config.allowed_origin, e)))?;

        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]);

        let body_limit = usize::try_from(self.config.max_upload_bytes)
            .unwrap_or(usize::MAX)
            .saturating_add(MULTIPART_OVERHEAD_BYTES);

        Ok(Router::new()
            .route("/", get(api::root))
            .route("/health", get(api::health::<A, E>))
            .route("/submit", post(api::submit::<A, E>))
            .route("/submissions", get(api::list_submissions::<A, E>))
            .route("/submissions/:id", get(api::get_submission::<A, E>))
            .route("/leaderboard", get(api::leaderboard::<A, E>))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors)
                    .layer(DefaultBodyLimit::max(body_limit))
                    .into_inner(),
            )
            .with_state(self.clone()))
    }

    /// Bind the configured address and serve until ctrl-c
    pub async fn run(&self) -> StoreResult<()> {
        let address = self.config.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|e| StoreError::ServerStartup(format!("Failed to bind to {}: {}", address, e)))?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until ctrl-c
    pub async fn serve(&self, listener: TcpListener) -> StoreResult<()> {
        self.serve_until(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log_error(ProcessId::current(), "Installing ctrl-c handler", &e);
            }
        })
        .await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve_until<F>(&self, listener: TcpListener, shutdown: F) -> StoreResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router()?;
        let local = listener
            .local_addr()
            .map_err(|e| StoreError::ServerStartup(e.to_string()))?;

        process_info!(ProcessId::current(), "🌐 Submission store listening on http://{}", local);
        process_info!(
            ProcessId::current(),
            "📁 Uploads written to {}",
            self.config.uploads_dir.display()
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| StoreError::ServerStartup(format!("Server error: {}", e)))?;

        log_shutdown(ProcessId::current(), "server stopped");
        Ok(())
    }

    /// Validate, persist and register an upload, then start its evaluation
    pub async fn accept_upload(&self, incoming: IncomingArtifact) -> StoreResult<UploadReceipt> {
        let file_name = base_name(&incoming.file_name).to_string();
        if file_name.is_empty() {
            return Err(StoreError::MissingField { field: "file" });
        }
        if incoming.user_id.trim().is_empty() {
            return Err(StoreError::MissingField { field: "userId" });
        }

        let extension = matched_extension(&file_name, &self.config.allowed_extensions).ok_or_else(|| {
            StoreError::UnsupportedFileType {
                file_name: file_name.clone(),
                allowed: describe_extensions(&self.config.allowed_extensions),
            }
        })?;

        let size = incoming.bytes.len() as u64;
        if size > self.config.max_upload_bytes {
            return Err(StoreError::PayloadTooLarge {
                size,
                limit: self.config.max_upload_bytes,
            });
        }

        let id = new_submission_id();
        let artifact = self.storage.save(&id, extension, &incoming.bytes).await?;

        let user_name = if incoming.user_name.trim().is_empty() {
            incoming.user_id.clone()
        } else {
            incoming.user_name.clone()
        };
        let submitted_at = Utc::now();
        let submission = self
            .registry
            .write()
            .await
            .accept(&id, &incoming.user_id, &user_name, &file_name, submitted_at)?;

        process_info!(
            ProcessId::current(),
            "📥 Accepted {} from {} as {}",
            file_name,
            incoming.user_id,
            id
        );

        self.spawn_evaluation(submission, artifact);

        Ok(UploadReceipt {
            submission_id: id,
            file_name,
            submitted_at,
            message: Some("File submitted successfully and is pending processing.".to_string()),
        })
    }

    fn spawn_evaluation(&self, submission: Submission, artifact: StoredArtifact) {
        let registry = Arc::clone(&self.registry);
        let evaluator = Arc::clone(&self.evaluator);

        tokio::spawn(async move {
            let outcome = evaluator.evaluate(&submission, &artifact).await;
            let mut registry = registry.write().await;
            match registry.record_outcome(&submission.id, outcome) {
                Ok(updated) => {
                    process_info!(
                        ProcessId::current(),
                        "🏁 Submission {} finished as {}",
                        updated.id,
                        updated.status
                    );
                }
                Err(e) => {
                    process_warn!(
                        ProcessId::current(),
                        "⚠️ Dropped evaluation outcome for {}: {}",
                        submission.id,
                        e
                    );
                }
            }
        });
    }

    pub async fn submission(&self, id: &str) -> StoreResult<Submission> {
        self.registry.read().await.get(id)
    }

    pub async fn submissions_for(&self, user_id: &str) -> Vec<Submission> {
        self.registry.read().await.for_user(user_id)
    }

    pub async fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.registry.read().await.leaderboard()
    }

    pub async fn submission_count(&self) -> usize {
        self.registry.read().await.len()
    }
}
