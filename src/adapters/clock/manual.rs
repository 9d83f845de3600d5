use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::foundation::Timestamp;
use crate::ports::Clock;

/// Clock that only moves when told to.
///
/// `sleep` advances the clock by the requested duration and returns at once,
/// so code that waits on quotas or timeouts runs instantly under test.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Starts at a fixed, arbitrary instant.
    pub fn at_epoch_millis(millis: i64) -> Self {
        Self::new(Timestamp::from_unix_millis(millis))
    }

    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *now = now.plus_millis(duration.as_millis() as i64);
    }

    pub fn set(&self, to: Timestamp) {
        let mut now = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *now = to;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::at_epoch_millis(1_700_000_000_000)
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
        tokio::task::yield_now().await;
    }
}
