//! PersonaAssignor - picks the persona for a newly engaged session.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Mutex;

use super::catalog::{standard_catalog, PersonaId, PersonaProfile, DEFAULT_PERSONAS};
use crate::domain::detection::{FraudCategory, Urgency};

/// Maps a fraud category and urgency to a catalog persona.
///
/// Selection is deterministic for a fixed seed and call sequence.
#[derive(Debug)]
pub struct PersonaAssignor {
    catalog: Vec<PersonaProfile>,
    rng: Mutex<StdRng>,
}

impl PersonaAssignor {
    /// Uses the standard catalog and an entropy-seeded generator.
    pub fn new() -> Self {
        Self::with_rng(standard_catalog().to_vec(), StdRng::from_entropy())
    }

    /// Uses the standard catalog and a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(standard_catalog().to_vec(), StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(catalog: Vec<PersonaProfile>, rng: StdRng) -> Self {
        Self {
            catalog,
            rng: Mutex::new(rng),
        }
    }

    /// Picks a persona.
    ///
    /// Candidates are the catalog entries that list `category`, or the default
    /// pair when none do. Under high or critical urgency the best-ranked
    /// high-vulnerability candidate is chosen; otherwise the draw is uniform.
    pub fn assign(&self, category: &FraudCategory, urgency: Urgency) -> PersonaId {
        let mut candidates: Vec<&PersonaProfile> = self
            .catalog
            .iter()
            .filter(|profile| profile.applies_to(category))
            .collect();

        if candidates.is_empty() {
            candidates = self
                .catalog
                .iter()
                .filter(|profile| DEFAULT_PERSONAS.contains(&profile.id))
                .collect();
        }

        if urgency.is_pressing() {
            let preferred = candidates
                .iter()
                .filter_map(|profile| profile.vulnerability_rank().map(|rank| (rank, profile.id)))
                .min();
            if let Some((_, id)) = preferred {
                return id;
            }
        }

        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        candidates
            .choose(&mut *rng)
            .map(|profile| profile.id)
            .unwrap_or(DEFAULT_PERSONAS[0])
    }

    /// Looks up the profile for an assigned persona.
    pub fn profile(&self, id: PersonaId) -> Option<&PersonaProfile> {
        self.catalog.iter().find(|profile| profile.id == id)
    }
}

impl Default for PersonaAssignor {
    fn default() -> Self {
        Self::new()
    }
}
