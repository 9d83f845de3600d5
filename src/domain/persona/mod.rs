//! Persona module - the synthetic characters the engine speaks as.
//!
//! - `PersonaId` / `PersonaProfile` - the static catalog
//! - `PersonaAssignor` - category + urgency → persona, once per session

mod assignor;
mod catalog;

pub use assignor::PersonaAssignor;
pub use catalog::{standard_catalog, PersonaId, PersonaProfile, UrgencyAffinity, DEFAULT_PERSONAS};
