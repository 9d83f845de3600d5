//! Clock port.
//!
//! Time-dependent components (quota windows, session expiry) read time and
//! sleep through this port so tests can drive time by hand.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::foundation::Timestamp;

#[async_trait]
pub trait Clock: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> Timestamp;

    /// Suspends the calling task for `duration`.
    async fn sleep(&self, duration: Duration);
}
