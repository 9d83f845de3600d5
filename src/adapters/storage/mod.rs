//! Storage Adapters
//!
//! Implementations of the SessionStore port.
//!
//! ## Available Adapters
//!
//! - **InMemorySessionStore** - process-local map with per-session locks
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::InMemorySessionStore;
//!
//! let store = InMemorySessionStore::new(Arc::new(SystemClock::new()));
//! let _turn = store.lock(&session_id).await;
//! let (session, created) = store.get_or_create(&session_id).await;
//! ```

mod in_memory_session_store;

pub use in_memory_session_store::InMemorySessionStore;
