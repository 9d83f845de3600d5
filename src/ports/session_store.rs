//! Session Store Port - ownership of session records.
//!
//! The store is the only owner of sessions. Callers work on a copy for the
//! duration of one turn, inside the per-session critical section obtained
//! from [`SessionStore::lock`], and hand it back with [`SessionStore::save`].

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode, SessionId, ValidationError};
use crate::domain::session::{Session, SessionSnapshot};

/// Errors from store operations that can legitimately fail.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionStoreError {
    /// No session is held under this id.
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    /// A snapshot failed validation on import.
    #[error("Invalid session snapshot: {0}")]
    InvalidSnapshot(#[from] ValidationError),
}

impl From<SessionStoreError> for DomainError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(id) => {
                DomainError::new(ErrorCode::SessionNotFound, "Session not found")
                    .with_detail("session_id", id.to_string())
            }
            SessionStoreError::InvalidSnapshot(e) => {
                DomainError::new(ErrorCode::InvalidSnapshot, e.to_string())
            }
        }
    }
}

/// Held for the duration of one turn. Dropping it releases the session.
pub struct SessionGuard {
    _held: Box<dyn Send + Sync>,
}

impl SessionGuard {
    pub fn new(held: impl Send + Sync + 'static) -> Self {
        Self {
            _held: Box::new(held),
        }
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard").finish_non_exhaustive()
    }
}

/// Port for session ownership and expiry.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Enters the critical section for `id`, waiting for any turn in flight.
    async fn lock(&self, id: &SessionId) -> SessionGuard;

    /// Returns the session, creating an empty one if absent.
    ///
    /// Atomic per id. The flag is true when this call created the session.
    async fn get_or_create(&self, id: &SessionId) -> (Session, bool);

    /// Returns a copy of the session, if present.
    async fn get(&self, id: &SessionId) -> Option<Session>;

    /// Replaces the stored record and stamps `last_activity_at` with now.
    ///
    /// Saving a session the store does not hold is a programming error.
    async fn save(&self, session: Session);

    /// Flips `completed` on the stored record.
    ///
    /// Returns true only for the single call that performed the transition.
    async fn try_mark_completed(&self, id: &SessionId) -> Result<bool, SessionStoreError>;

    /// Removes sessions idle for longer than `ttl`, skipping any with a turn
    /// in flight. Returns the number removed.
    async fn sweep_expired(&self, ttl: Duration) -> usize;

    /// Number of sessions currently held.
    async fn active_count(&self) -> usize;

    /// Serializable copy of a session.
    async fn export(&self, id: &SessionId) -> Result<SessionSnapshot, SessionStoreError>;

    /// Validates and installs a snapshot, replacing any existing session.
    async fn import(&self, snapshot: SessionSnapshot) -> Result<SessionId, SessionStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_session_maps_to_not_found_code() {
        let err: DomainError = SessionStoreError::NotFound(SessionId::new("gone").unwrap()).into();
        assert_eq!(err.code, ErrorCode::SessionNotFound);
        assert_eq!(err.details.get("session_id"), Some(&"gone".to_string()));
    }

    #[test]
    fn bad_snapshot_maps_to_invalid_snapshot_code() {
        let err: DomainError =
            SessionStoreError::InvalidSnapshot(ValidationError::empty_field("messages")).into();
        assert_eq!(err.code, ErrorCode::InvalidSnapshot);
    }
}
