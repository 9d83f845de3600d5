//! Clock adapters.
//!
//! - `SystemClock` - wall clock and tokio timers
//! - `ManualClock` - hand-driven time for tests; sleeping advances it

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;
