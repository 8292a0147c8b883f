use std::{sync::Arc, time::Duration};

use chrono::SubsecRound;
use log::{debug, info, warn};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{self, Instant},
};
use tokio_util::sync::CancellationToken;

use crate::{
    error::{TrackerError, TrackerResult},
    models::Session,
    repository::{new_session_id, SessionRepository},
    store::KeyValueStore,
};

use super::{Clock, TimerSnapshot, TimerState, TimerStatus};

struct Ticker {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

/// Start/stop controller that turns a finished run into a stored session.
///
/// While running, a background task bumps `elapsed_seconds` once per tick
/// and publishes a [`TimerSnapshot`]; it never writes to the repository.
/// Clones share the same timer.
pub struct TimerController<S> {
    state: Arc<Mutex<TimerState>>,
    repository: Arc<SessionRepository<S>>,
    clock: Arc<dyn Clock>,
    ticker: Arc<Mutex<Option<Ticker>>>,
    tick_interval: Duration,
    updates: Arc<watch::Sender<TimerSnapshot>>,
}

impl<S> Clone for TimerController<S> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            repository: self.repository.clone(),
            clock: self.clock.clone(),
            ticker: self.ticker.clone(),
            tick_interval: self.tick_interval,
            updates: self.updates.clone(),
        }
    }
}

impl<S: KeyValueStore> TimerController<S> {
    pub fn new(
        repository: Arc<SessionRepository<S>>,
        clock: Arc<dyn Clock>,
        tick_interval: Duration,
    ) -> Self {
        let (updates, _) = watch::channel(TimerSnapshot::from(TimerState::new()));
        Self {
            state: Arc::new(Mutex::new(TimerState::new())),
            repository,
            clock,
            ticker: Arc::new(Mutex::new(None)),
            tick_interval,
            updates: Arc::new(updates),
        }
    }

    pub fn repository(&self) -> &Arc<SessionRepository<S>> {
        &self.repository
    }

    pub async fn state(&self) -> TimerState {
        self.state.lock().await.clone()
    }

    pub async fn status(&self) -> TimerStatus {
        self.state.lock().await.status
    }

    pub async fn elapsed_seconds(&self) -> u64 {
        self.state.lock().await.elapsed_seconds
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::from(self.state().await)
    }

    /// Receiver that sees every transition and tick.
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.updates.subscribe()
    }

    /// `Idle -> Running`. Rejected with `TimerAlreadyRunning` otherwise.
    pub async fn start(&self) -> TrackerResult<TimerState> {
        let mut state = self.state.lock().await;
        if state.is_running() {
            return Err(TrackerError::TimerAlreadyRunning);
        }

        let started_at = self.clock.now().trunc_subsecs(0);
        state.begin(new_session_id(), started_at);
        self.spawn_ticker().await;

        let snapshot = state.clone();
        drop(state);

        info!("Timer started at {}", started_at.to_rfc3339());
        self.publish(snapshot.clone());
        Ok(snapshot)
    }

    /// `Running -> Idle`, recording the run as a session.
    ///
    /// If recording fails the timer keeps running with its start and elapsed
    /// time intact, so the run can be stopped again later.
    pub async fn stop(&self) -> TrackerResult<Session> {
        let mut state = self.state.lock().await;
        let (session_id, new_session) = state.finish().ok_or(TrackerError::TimerNotRunning)?;

        match self.repository.record_session(&session_id, new_session).await {
            Ok(session) => {
                self.cancel_ticker().await;
                state.reset();
                let snapshot = state.clone();
                drop(state);

                info!(
                    "Timer stopped; recorded session {} ({}s)",
                    session.id, session.duration
                );
                self.publish(snapshot);
                Ok(session)
            }
            Err(err) => {
                if err.is_storage_write() {
                    state.unsaved = true;
                }
                warn!("Timer stop failed, run kept alive: {err}");
                Err(err)
            }
        }
    }

    /// Drop the current run without recording it.
    pub async fn discard(&self) -> TrackerResult<()> {
        let mut state = self.state.lock().await;
        if !state.is_running() {
            return Ok(());
        }

        if state.unsaved {
            if let Some(session_id) = state.session_id.as_deref() {
                self.repository.delete_session(session_id).await?;
            }
        }

        self.cancel_ticker().await;
        state.reset();
        let snapshot = state.clone();
        drop(state);

        info!("Timer discarded");
        self.publish(snapshot);
        Ok(())
    }

    /// Stop the tick task, e.g. when the owning UI goes away.
    pub async fn shutdown(&self) {
        self.cancel_ticker().await;
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        drop(ticker_guard.take());

        let state = self.state.clone();
        let updates = self.updates.clone();
        let period = self.tick_interval;
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let snapshot = {
                            let mut guard = state.lock().await;
                            // A stop may have won the lock while this tick waited.
                            if token.is_cancelled() || !guard.is_running() {
                                break;
                            }
                            guard.tick();
                            guard.clone()
                        };
                        updates.send_replace(TimerSnapshot::from(snapshot));
                    }
                }
            }
            debug!("Timer tick task finished");
        });

        *ticker_guard = Some(Ticker { handle, cancel });
    }

    async fn cancel_ticker(&self) {
        // Dropping the ticker cancels and aborts its task.
        self.ticker.lock().await.take();
    }

    fn publish(&self, state: TimerState) {
        self.updates.send_replace(TimerSnapshot::from(state));
    }
}
