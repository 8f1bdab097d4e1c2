//! Fixed-interval job status polling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use booth_core::{ApiScope, JobReference, JobSession, JobStatus};
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::client::BoothClient;
use crate::error::ClientError;
use crate::handle::SessionHandle;

/// Callback receiving every accepted status snapshot.
pub type StatusCallback = Arc<dyn Fn(JobStatus) + Send + Sync>;
/// Callback receiving every failed poll.
pub type ErrorCallback = Arc<dyn Fn(ClientError) + Send + Sync>;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

impl BoothClient {
    /// Poll a job every `interval` until the returned handle is cancelled.
    ///
    /// The first poll is issued immediately. At most one request is in flight;
    /// a tick that finds the previous request still outstanding is skipped.
    /// Responses are applied in issue order only, so a late reply never
    /// overwrites a newer snapshot. Errors are reported and polling continues.
    pub fn start_polling<U, E>(
        &self,
        scope: impl Into<ApiScope>,
        job_ref: JobReference,
        interval: Duration,
        on_update: U,
        on_error: E,
    ) -> SessionHandle
    where
        U: Fn(JobStatus) + Send + Sync + 'static,
        E: Fn(ClientError) + Send + Sync + 'static,
    {
        let scope = scope.into();
        let client = self.clone();
        let on_update: StatusCallback = Arc::new(on_update);
        let on_error: ErrorCallback = Arc::new(on_error);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let session = Arc::new(Mutex::new(JobSession::new()));
            let in_flight = Arc::new(AtomicBool::new(false));
            let mut requests = JoinSet::new();
            let mut ticker = tokio::time::interval(interval.max(MIN_INTERVAL));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!(room = %scope, job = %job_ref, ?interval, "Job polling started");

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        info!(job = %job_ref, "Job polling received shutdown signal");
                        break;
                    }

                    Some(joined) = requests.join_next(), if !requests.is_empty() => {
                        if let Err(e) = joined {
                            if e.is_panic() {
                                warn!(
                                    job = %job_ref,
                                    error = %e,
                                    "Job status callback panicked, polling continues"
                                );
                            }
                        }
                    }

                    _ = ticker.tick() => {
                        if in_flight.swap(true, Ordering::AcqRel) {
                            debug!(job = %job_ref, "Previous poll still in flight, skipping tick");
                            continue;
                        }

                        let seq = lock(&session).issue();
                        let client = client.clone();
                        let scope = scope.clone();
                        let job_ref = job_ref.clone();
                        let session = Arc::clone(&session);
                        let in_flight = Arc::clone(&in_flight);
                        let on_update = Arc::clone(&on_update);
                        let on_error = Arc::clone(&on_error);

                        requests.spawn(async move {
                            let _in_flight = InFlightGuard(in_flight);
                            let result = client.poll_once(scope, &job_ref).await;
                            match result {
                                Ok(status) => {
                                    let accepted = lock(&session).accept(seq, status.clone());
                                    if let Some(view) = accepted {
                                        debug!(job = %job_ref, seq, ?view, "Job status updated");
                                        on_update(status);
                                    }
                                }
                                Err(e) => {
                                    if lock(&session).latest_issued() == seq {
                                        warn!(job = %job_ref, seq, error = %e, "Job status poll failed");
                                        on_error(e);
                                    }
                                }
                            }
                        });
                    }
                }
            }

            requests.abort_all();
            while requests.join_next().await.is_some() {}
        });

        SessionHandle::new("job-poll", handle, shutdown_tx)
    }
}

/// Clears the in-flight flag when a request task ends, even by panic or abort.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock(session: &Mutex<JobSession>) -> MutexGuard<'_, JobSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}
