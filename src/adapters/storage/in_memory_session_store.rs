//! In-Memory Session Store Adapter
//!
//! Holds every session in a process-local map. Each entry carries its own
//! async mutex, which is the per-session critical section handed out by
//! `lock`. Nothing survives a restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

use crate::domain::foundation::SessionId;
use crate::domain::session::{Session, SessionSnapshot};
use crate::ports::{Clock, SessionGuard, SessionStore, SessionStoreError};

#[derive(Debug)]
struct Entry {
    /// `None` while a lock exists for an id whose session is not created yet.
    session: Option<Session>,
    gate: Arc<Mutex<()>>,
}

impl Entry {
    fn vacant() -> Self {
        Self {
            session: None,
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// True when nobody holds or waits on the gate.
    ///
    /// Gates are only cloned under the map's write lock, so with that lock
    /// held a count of one means the map's own handle is the only one.
    fn is_idle(&self) -> bool {
        Arc::strong_count(&self.gate) == 1
    }
}

/// In-memory session store.
#[derive(Clone)]
pub struct InMemorySessionStore {
    entries: Arc<RwLock<HashMap<SessionId, Entry>>>,
    clock: Arc<dyn Clock>,
}

impl InMemorySessionStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Drops every session (useful for tests).
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

impl std::fmt::Debug for InMemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySessionStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn lock(&self, id: &SessionId) -> SessionGuard {
        let gate = {
            let mut entries = self.entries.write().await;
            entries
                .entry(id.clone())
                .or_insert_with(Entry::vacant)
                .gate
                .clone()
        };
        SessionGuard::new(gate.lock_owned().await)
    }

    async fn get_or_create(&self, id: &SessionId) -> (Session, bool) {
        let mut entries = self.entries.write().await;
        let entry = entries.entry(id.clone()).or_insert_with(Entry::vacant);

        match &entry.session {
            Some(session) => (session.clone(), false),
            None => {
                let session = Session::new(id.clone(), self.clock.now());
                entry.session = Some(session.clone());
                tracing::info!(session_id = %id, "Session created");
                (session, true)
            }
        }
    }

    async fn get(&self, id: &SessionId) -> Option<Session> {
        self.entries
            .read()
            .await
            .get(id)
            .and_then(|entry| entry.session.clone())
    }

    async fn save(&self, mut session: Session) {
        let mut entries = self.entries.write().await;
        match entries.get_mut(session.id()).filter(|e| e.session.is_some()) {
            Some(entry) => {
                session.touch(self.clock.now());
                entry.session = Some(session);
            }
            None => {
                debug_assert!(false, "save called for unknown session {}", session.id());
                tracing::error!(session_id = %session.id(), "Save for unknown session ignored");
            }
        }
    }

    async fn try_mark_completed(&self, id: &SessionId) -> Result<bool, SessionStoreError> {
        let mut entries = self.entries.write().await;
        let session = entries
            .get_mut(id)
            .and_then(|entry| entry.session.as_mut())
            .ok_or_else(|| SessionStoreError::NotFound(id.clone()))?;
        Ok(session.mark_completed())
    }

    async fn sweep_expired(&self, ttl: Duration) -> usize {
        let cutoff = self.clock.now().minus(ttl);
        let mut entries = self.entries.write().await;
        let before = entries.values().filter(|e| e.session.is_some()).count();

        entries.retain(|_, entry| {
            if !entry.is_idle() {
                return true;
            }
            match &entry.session {
                Some(session) => !session.last_activity_at().is_before(&cutoff),
                None => false,
            }
        });

        let after = entries.values().filter(|e| e.session.is_some()).count();
        before - after
    }

    async fn active_count(&self) -> usize {
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.session.is_some())
            .count()
    }

    async fn export(&self, id: &SessionId) -> Result<SessionSnapshot, SessionStoreError> {
        self.get(id)
            .await
            .map(|session| SessionSnapshot::from(&session))
            .ok_or_else(|| SessionStoreError::NotFound(id.clone()))
    }

    async fn import(&self, snapshot: SessionSnapshot) -> Result<SessionId, SessionStoreError> {
        let session = Session::try_from(snapshot)?;
        let id = session.id().clone();

        let mut entries = self.entries.write().await;
        entries
            .entry(id.clone())
            .or_insert_with(Entry::vacant)
            .session = Some(session);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use crate::domain::foundation::Timestamp;
    use crate::domain::session::Message;

    fn store() -> (InMemorySessionStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        (InMemorySessionStore::new(clock.clone()), clock)
    }

    fn id(s: &str) -> SessionId {
        SessionId::new(s).unwrap()
    }

    mod creation {
        use super::*;

        #[tokio::test]
        async fn get_or_create_creates_once() {
            let (store, _) = store();
            let (_, created) = store.get_or_create(&id("a")).await;
            assert!(created);
            let (_, created) = store.get_or_create(&id("a")).await;
            assert!(!created);
            assert_eq!(store.active_count().await, 1);
        }

        #[tokio::test]
        async fn concurrent_first_contact_creates_one_session() {
            let (store, _) = store();
            let mut handles = Vec::new();
            for _ in 0..50 {
                let store = store.clone();
                handles.push(tokio::spawn(async move {
                    store.get_or_create(&id("race")).await.1
                }));
            }
            let mut creations = 0;
            for handle in handles {
                if handle.await.unwrap() {
                    creations += 1;
                }
            }
            assert_eq!(creations, 1);
            assert_eq!(store.active_count().await, 1);
        }

        #[tokio::test]
        async fn lock_alone_does_not_create_a_session() {
            let (store, _) = store();
            let _guard = store.lock(&id("locked")).await;
            assert!(store.get(&id("locked")).await.is_none());
            assert_eq!(store.active_count().await, 0);
        }
    }

    mod saving {
        use super::*;

        #[tokio::test]
        async fn save_replaces_record_and_touches() {
            let (store, clock) = store();
            let (mut session, _) = store.get_or_create(&id("s")).await;
            session.receive(Message::counterparty("hello", clock.now()).unwrap());
            clock.advance(Duration::from_secs(5));
            store.save(session).await;

            let stored = store.get(&id("s")).await.unwrap();
            assert_eq!(stored.message_count(), 1);
            assert_eq!(stored.last_activity_at(), clock.now());
        }

        #[tokio::test]
        #[should_panic(expected = "unknown session")]
        #[cfg(debug_assertions)]
        async fn save_of_unknown_session_panics_in_debug() {
            let (store, clock) = store();
            store.save(Session::new(id("ghost"), clock.now())).await;
        }
    }

    mod completion {
        use super::*;
        use crate::domain::detection::FraudCategory;

        #[tokio::test]
        async fn mark_completed_succeeds_once() {
            let (store, _) = store();
            let (mut session, _) = store.get_or_create(&id("c")).await;
            session.engage(0.9, FraudCategory::Phishing);
            store.save(session).await;

            assert!(store.try_mark_completed(&id("c")).await.unwrap());
            assert!(!store.try_mark_completed(&id("c")).await.unwrap());
        }

        #[tokio::test]
        async fn mark_completed_on_missing_session_is_not_found() {
            let (store, _) = store();
            assert!(matches!(
                store.try_mark_completed(&id("none")).await,
                Err(SessionStoreError::NotFound(_))
            ));
        }
    }

    mod expiry {
        use super::*;

        #[tokio::test]
        async fn sweeps_only_idle_expired_sessions() {
            let (store, clock) = store();
            store.get_or_create(&id("old")).await;
            clock.advance(Duration::from_secs(20 * 60));
            store.get_or_create(&id("fresh")).await;
            clock.advance(Duration::from_secs(15 * 60));

            let removed = store.sweep_expired(Duration::from_secs(30 * 60)).await;
            assert_eq!(removed, 1);
            assert!(store.get(&id("old")).await.is_none());
            assert!(store.get(&id("fresh")).await.is_some());
        }

        #[tokio::test]
        async fn skips_sessions_with_turn_in_flight() {
            let (store, clock) = store();
            let guard = store.lock(&id("busy")).await;
            store.get_or_create(&id("busy")).await;
            clock.advance(Duration::from_secs(3600));

            assert_eq!(store.sweep_expired(Duration::from_secs(60)).await, 0);
            drop(guard);
            assert_eq!(store.sweep_expired(Duration::from_secs(60)).await, 1);
        }
    }

    mod snapshots {
        use super::*;

        #[tokio::test]
        async fn export_then_import_restores_session() {
            let (store, clock) = store();
            let (mut session, _) = store.get_or_create(&id("snap")).await;
            session.receive(Message::counterparty("hello there", clock.now()).unwrap());
            store.save(session).await;

            let snapshot = store.export(&id("snap")).await.unwrap();
            store.clear().await;
            let restored_id = store.import(snapshot).await.unwrap();

            assert_eq!(restored_id, id("snap"));
            assert_eq!(store.get(&id("snap")).await.unwrap().message_count(), 1);
        }

        #[tokio::test]
        async fn import_rejects_invalid_snapshot() {
            let (store, _) = store();
            let mut snapshot = SessionSnapshot::from(&Session::new(id("bad"), Timestamp::now()));
            snapshot.confidence = -0.5;
            assert!(matches!(
                store.import(snapshot).await,
                Err(SessionStoreError::InvalidSnapshot(_))
            ));
            assert_eq!(store.active_count().await, 0);
        }
    }
}
