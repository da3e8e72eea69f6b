//! Submission lifecycle controller
//!
//! Owns the client side of the lifecycle: uploading artifacts, reconciling
//! store observations into the per-user cache, and polling until a
//! submission reaches a terminal state. All cache read-modify-write cycles
//! run under one async lock; concurrent status queries for the same
//! (owner, id) share a single in-flight store request.

use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

use shared::logging::log_error;
use shared::{LeaderboardEntry, PollPolicy, ProcessId, Submission, process_debug, process_info, process_warn};

use crate::core::lifecycle::{Reconciliation, acknowledge, apply_observation, prepend};
use crate::error::{ClientError, ClientResult};
use crate::traits::{SubmissionCache, SubmissionStore};
use crate::types::{Artifact, Session, UploadPolicy};

type InFlight = Shared<BoxFuture<'static, ClientResult<Submission>>>;

struct Inner<S, C> {
    store: S,
    cache: C,
    upload_policy: UploadPolicy,
    cache_lock: tokio::sync::Mutex<()>,
    in_flight: Mutex<HashMap<(String, String), InFlight>>,
}

/// Client-side lifecycle controller with dependency injection
pub struct LifecycleController<S, C> {
    inner: Arc<Inner<S, C>>,
}

impl<S, C> Clone for LifecycleController<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, C> LifecycleController<S, C>
where
    S: SubmissionStore + 'static,
    C: SubmissionCache + 'static,
{
    pub fn new(store: S, cache: C, upload_policy: UploadPolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                cache,
                upload_policy,
                cache_lock: tokio::sync::Mutex::new(()),
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Upload an artifact and record the acknowledged `Processing` record at
    /// the head of the owner's cache
    pub async fn submit(&self, session: &Session, artifact: Artifact) -> ClientResult<Submission> {
        let owner = session.require_identity()?;
        self.inner.upload_policy.validate(&artifact)?;

        let receipt = self.inner.store.upload(&artifact, &owner).await.map_err(|e| {
            log_error(ProcessId::current(), "Upload", &e);
            e
        })?;
        let record = acknowledge(&receipt, &owner);

        process_info!(
            ProcessId::current(),
            "📤 Submitted {} as {}",
            record.file_name,
            record.id
        );

        let inner = &self.inner;
        let _guard = inner.cache_lock.lock().await;
        match inner.cache.load(&owner.uid).await {
            Ok(mut list) => {
                prepend(&mut list, record.clone());
                inner.persist(&owner.uid, &list).await;
            }
            Err(e) => log_error(ProcessId::current(), "Reading submission cache", &e),
        }

        Ok(record)
    }

    /// Cache-only lookup for immediate rendering
    pub async fn cached(&self, session: &Session, id: &str) -> ClientResult<Option<Submission>> {
        let owner = session.require_identity()?;
        let list = self.inner.cache.load(&owner.uid).await?;
        Ok(list.into_iter().find(|s| s.id == id))
    }

    /// Query the store and reconcile the result into the cache. The store
    /// wins, except over a cached terminal record.
    pub async fn get_status(&self, session: &Session, id: &str) -> ClientResult<Submission> {
        let owner = session.require_identity()?;
        self.query(&owner.uid, id).await
    }

    /// Like `get_status`, but a terminal cached record is returned without
    /// contacting the store
    pub async fn refresh(&self, session: &Session, id: &str) -> ClientResult<Submission> {
        let owner = session.require_identity()?;

        match self.inner.cache.load(&owner.uid).await {
            Ok(list) => {
                if let Some(terminal) = list.into_iter().find(|s| s.id == id && s.is_terminal()) {
                    return Ok(terminal);
                }
            }
            Err(e) => log_error(ProcessId::current(), "Reading submission cache", &e),
        }

        self.query(&owner.uid, id).await
    }

    /// Refresh with backoff until the submission is terminal or the retry
    /// horizon is used up; returns the last known record either way
    pub async fn watch(&self, session: &Session, id: &str, policy: &PollPolicy) -> ClientResult<Submission> {
        let mut current = self.refresh(session, id).await?;
        let mut attempt = 0;

        while !current.is_terminal() && attempt < policy.max_attempts {
            let delay = policy.delay_for(attempt);
            process_debug!(
                ProcessId::current(),
                "⏳ {} still {}; next check in {:?}",
                id,
                current.status,
                delay
            );
            tokio::time::sleep(delay).await;
            current = self.refresh(session, id).await?;
            attempt += 1;
        }

        if !current.is_terminal() {
            process_warn!(
                ProcessId::current(),
                "⌛ Stopped watching {} after {} checks; still {}",
                id,
                attempt,
                current.status
            );
        }
        Ok(current)
    }

    /// Apply a store-originated record pushed to the client
    pub async fn observe(&self, session: &Session, record: Submission) -> ClientResult<Submission> {
        let owner = session.require_identity()?;
        record.validate()?;
        if !record.is_owned_by(&owner.uid) {
            return Err(ClientError::not_found(record.id));
        }
        Ok(self.inner.apply(&owner.uid, record).await)
    }

    /// Drain a push channel through `observe` until it closes. Records for
    /// other users are skipped. Returns how many records were applied.
    pub async fn follow(&self, session: &Session, mut updates: mpsc::Receiver<Submission>) -> ClientResult<usize> {
        session.require_identity()?;
        let mut applied = 0;

        while let Some(record) = updates.recv().await {
            match self.observe(session, record).await {
                Ok(_) => applied += 1,
                Err(ClientError::NotFound { id }) => {
                    process_warn!(ProcessId::current(), "🚫 Ignoring pushed record {} for another user", id);
                }
                Err(ClientError::InvalidRecord(reason)) => {
                    process_warn!(ProcessId::current(), "🚫 Ignoring invalid pushed record: {}", reason);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(applied)
    }

    /// The owner's cached submissions, newest first
    pub async fn list(&self, session: &Session) -> ClientResult<Vec<Submission>> {
        let owner = session.require_identity()?;
        self.inner.cache.load(&owner.uid).await
    }

    /// Leaderboard in rank order
    pub async fn list_ranked(&self) -> ClientResult<Vec<LeaderboardEntry>> {
        let mut entries = self.inner.store.list_leaderboard().await?;
        entries.sort_by_key(|e| e.rank);
        Ok(entries)
    }

    /// Single-flight store query for (owner, id)
    async fn query(&self, owner_id: &str, id: &str) -> ClientResult<Submission> {
        let key = (owner_id.to_string(), id.to_string());

        let flight = {
            let mut in_flight = self.inner.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            match in_flight.get(&key) {
                Some(existing) => {
                    process_debug!(ProcessId::current(), "🔁 Joining in-flight query for {}", id);
                    existing.clone()
                }
                None => {
                    let inner = Arc::clone(&self.inner);
                    let flight_key = key.clone();
                    let flight = async move {
                        let result = inner.fetch_and_apply(&flight_key.0, &flight_key.1).await;
                        inner
                            .in_flight
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .remove(&flight_key);
                        result
                    }
                    .boxed()
                    .shared();
                    in_flight.insert(key, flight.clone());
                    flight
                }
            }
        };

        flight.await
    }
}

impl<S, C> Inner<S, C>
where
    S: SubmissionStore,
    C: SubmissionCache,
{
    async fn fetch_and_apply(&self, owner_id: &str, id: &str) -> ClientResult<Submission> {
        let observed = self.store.fetch_submission(id).await?;

        if observed.id != id {
            process_warn!(
                ProcessId::current(),
                "🚫 Store answered {} for {}; ignoring",
                observed.id,
                id
            );
            return self
                .cache
                .load(owner_id)
                .await?
                .into_iter()
                .find(|s| s.id == id)
                .ok_or_else(|| ClientError::not_found(id));
        }
        if !observed.is_owned_by(owner_id) {
            return Err(ClientError::not_found(id));
        }

        Ok(self.apply(owner_id, observed).await)
    }

    /// Reconcile one observation into the owner's cache and return the
    /// record now considered current
    async fn apply(&self, owner_id: &str, observed: Submission) -> Submission {
        let _guard = self.cache_lock.lock().await;

        let mut list = match self.cache.load(owner_id).await {
            Ok(list) => list,
            Err(e) => {
                log_error(ProcessId::current(), "Reading submission cache", &e);
                return observed;
            }
        };

        let outcome = apply_observation(&mut list, observed);
        match &outcome {
            Reconciliation::Stale(kept) => {
                process_debug!(
                    ProcessId::current(),
                    "🧊 Kept terminal {} ({}) over a stale observation",
                    kept.id,
                    kept.status
                );
            }
            Reconciliation::Insert(_) | Reconciliation::Replace(_) => {
                self.persist(owner_id, &list).await;
            }
            Reconciliation::Unchanged(_) => {}
        }
        outcome.into_record()
    }

    /// Cache writes never fail the operation that triggered them
    async fn persist(&self, owner_id: &str, list: &[Submission]) {
        if let Err(e) = self.cache.store(owner_id, list).await {
            log_error(ProcessId::current(), "Writing submission cache", &e);
        }
    }
}
