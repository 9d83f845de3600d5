//! Domain layer: the engagement engine's vocabulary and rules.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, errors)
//! - `session` - Session aggregate, messages and snapshots
//! - `intelligence` - Artifact extraction, accumulation and scoring
//! - `detection` - Fraud classification and the engagement gate
//! - `persona` - Persona catalog and assignment
//! - `conversation` - Dialogue stages, fallback replies, reply sanitation
//! - `completion` - Completion policy and the evaluator summary

pub mod completion;
pub mod conversation;
pub mod detection;
pub mod foundation;
pub mod intelligence;
pub mod persona;
pub mod session;
