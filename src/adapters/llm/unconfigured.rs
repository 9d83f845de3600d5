use async_trait::async_trait;

use crate::ports::{GenerationFailure, GenerationOutcome, GenerationRequest, TextGenerator};

/// Generator used when no service credentials are configured.
///
/// Every call fails immediately, so the engine runs on its local fallbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredGenerator;

#[async_trait]
impl TextGenerator for UnconfiguredGenerator {
    async fn generate(&self, _request: GenerationRequest) -> GenerationOutcome {
        GenerationOutcome::Failure(GenerationFailure::Unconfigured)
    }
}
