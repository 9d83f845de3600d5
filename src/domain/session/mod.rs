//! Session module - one conversation with one counterparty.
//!
//! - `Message` / `Sender` - append-only transcript entries
//! - `Session` - the aggregate the store owns
//! - `SessionSnapshot` - the serialized record, validated on the way in

mod aggregate;
mod message;
mod snapshot;

pub use aggregate::Session;
pub use message::{Message, Sender};
pub use snapshot::SessionSnapshot;
