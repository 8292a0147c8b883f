use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use chrono::Utc;
use log::{debug, error, info, warn};
use serde::Deserialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::{TrackerError, TrackerResult},
    models::{NewSession, Session, SessionUpdate},
    store::KeyValueStore,
};

/// Key the whole session collection is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "@app_data";

/// Fresh session identifier.
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Accepted on-disk shapes: the plain array written by this crate, and the
/// older `{ "sessions": [...] }` envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSessions {
    List(Vec<Session>),
    Envelope {
        #[serde(default)]
        sessions: Vec<Session>,
    },
}

impl From<StoredSessions> for Vec<Session> {
    fn from(stored: StoredSessions) -> Self {
        match stored {
            StoredSessions::List(sessions) => sessions,
            StoredSessions::Envelope { sessions } => sessions,
        }
    }
}

fn parse_sessions(raw: &str) -> serde_json::Result<Vec<Session>> {
    serde_json::from_str::<StoredSessions>(raw).map(Vec::from)
}

/// Owns the session collection and writes all of it back on every change.
///
/// The in-memory `Vec` is the source of truth while the process runs. Each
/// mutation holds the collection lock until its write has finished, so two
/// overlapping calls are applied one after the other and neither append is
/// lost to a stale read-modify-write.
pub struct SessionRepository<S> {
    store: Arc<S>,
    key: String,
    sessions: Mutex<Vec<Session>>,
    /// The last write failed, so storage is behind memory. Only touched
    /// while `sessions` is locked.
    unsynced: AtomicBool,
}

impl<S: KeyValueStore> SessionRepository<S> {
    /// Build a repository and hydrate it from `store`.
    pub async fn load(store: Arc<S>, key: impl Into<String>) -> Self {
        let repository = Self {
            store,
            key: key.into(),
            sessions: Mutex::new(Vec::new()),
            unsynced: AtomicBool::new(false),
        };
        let loaded = repository.load_all().await;
        info!("Loaded {} sessions from {}", loaded.len(), repository.key);
        repository
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Re-read the collection from storage and make it the in-memory state.
    ///
    /// Never fails. A read error or unparseable data keeps the current
    /// collection, which is empty on a cold start. If the last write never
    /// reached storage, memory is written out instead of being replaced.
    pub async fn load_all(&self) -> Vec<Session> {
        let mut sessions = self.sessions.lock().await;

        if self.unsynced.load(Ordering::Acquire) {
            match self.persist(&sessions).await {
                Ok(()) => info!("Wrote pending sessions back to {}", self.key),
                Err(err) => warn!("{err}; keeping {} sessions in memory", sessions.len()),
            }
            return sessions.clone();
        }

        if let Some(stored) = self.read_stored().await {
            *sessions = stored;
        }
        sessions.clone()
    }

    /// `None` when storage could not be read or parsed.
    async fn read_stored(&self) -> Option<Vec<Session>> {
        match self.store.get(&self.key).await {
            Ok(Some(raw)) => match parse_sessions(&raw) {
                Ok(sessions) => Some(sessions),
                Err(err) => {
                    warn!("Stored sessions under {} are corrupt, ignoring them: {err}", self.key);
                    None
                }
            },
            Ok(None) => {
                debug!("No sessions stored under {}", self.key);
                Some(Vec::new())
            }
            Err(err) => {
                let err = TrackerError::StorageRead(err);
                warn!("{err}; keeping the sessions already in memory");
                None
            }
        }
    }

    /// Snapshot of the in-memory collection.
    pub async fn sessions(&self) -> Vec<Session> {
        self.sessions.lock().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Session> {
        self.sessions
            .lock()
            .await
            .iter()
            .find(|session| session.id == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Validate, assign `id`/`createdAt`, append and persist.
    ///
    /// On `StorageWrite` the session stays in memory; a later successful
    /// write (any mutation or [`flush`](Self::flush)) makes it durable.
    pub async fn add_session(&self, new_session: NewSession) -> TrackerResult<Session> {
        new_session.validate()?;

        let mut sessions = self.sessions.lock().await;
        let id = loop {
            let candidate = new_session_id();
            if !sessions.iter().any(|session| session.id == candidate) {
                break candidate;
            }
        };
        let session = new_session.into_session(id, Utc::now());
        sessions.push(session.clone());
        debug!(
            "Added session {} ({}s on {})",
            session.id, session.duration, session.date
        );

        self.persist(&sessions).await?;
        Ok(session)
    }

    /// Insert under a caller-chosen `id`, or overwrite the interval of the
    /// session already stored under it.
    ///
    /// The timer uses this so that retrying a stop after a failed write
    /// updates the optimistic record instead of appending a second one.
    pub async fn record_session(&self, id: &str, new_session: NewSession) -> TrackerResult<Session> {
        new_session.validate()?;

        let mut sessions = self.sessions.lock().await;
        let session = match sessions.iter_mut().find(|session| session.id == id) {
            Some(existing) => {
                existing.apply(SessionUpdate {
                    start_time: Some(new_session.start_time),
                    end_time: Some(new_session.end_time),
                    duration: Some(new_session.duration),
                    date: Some(new_session.bucket_date()),
                });
                debug!("Re-recorded session {id} ({}s)", existing.duration);
                existing.clone()
            }
            None => {
                let session = new_session.into_session(id.to_string(), Utc::now());
                sessions.push(session.clone());
                debug!(
                    "Recorded session {} ({}s on {})",
                    session.id, session.duration, session.date
                );
                session
            }
        };

        self.persist(&sessions).await?;
        Ok(session)
    }

    /// Merge `update` into the session with `id` and persist.
    ///
    /// Unknown ids and merges that would break the interval invariants are
    /// rejected before anything changes. An empty update writes nothing.
    pub async fn update_session(&self, id: &str, update: SessionUpdate) -> TrackerResult<Session> {
        let mut sessions = self.sessions.lock().await;
        let index = sessions
            .iter()
            .position(|session| session.id == id)
            .ok_or_else(|| TrackerError::NotFound { id: id.to_string() })?;
        if update.is_empty() {
            return Ok(sessions[index].clone());
        }

        let mut merged = sessions[index].clone();
        merged.apply(update);
        merged.validate()?;
        sessions[index] = merged.clone();
        debug!("Updated session {id}");

        self.persist(&sessions).await?;
        Ok(merged)
    }

    /// Remove the session with `id`. Unknown ids are not an error.
    pub async fn delete_session(&self, id: &str) -> TrackerResult<()> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|session| session.id != id);
        if sessions.len() == before {
            debug!("Delete of unknown session {id} ignored");
        }

        self.persist(&sessions).await
    }

    /// Write the current in-memory collection again, e.g. after a failed save.
    pub async fn flush(&self) -> TrackerResult<()> {
        let sessions = self.sessions.lock().await;
        self.persist(&sessions).await
    }

    async fn persist(&self, sessions: &[Session]) -> TrackerResult<()> {
        let payload = serde_json::to_string(sessions)?;
        let result = self.store.set(&self.key, payload).await.map_err(|err| {
            error!("Failed to persist {} sessions: {err:#}", sessions.len());
            TrackerError::StorageWrite(err)
        });
        self.unsynced.store(result.is_err(), Ordering::Release);
        result
    }
}
