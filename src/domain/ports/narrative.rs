use crate::domain::entities::pattern::Pattern;
use crate::domain::error::DomainError;

/// External text-generation collaborator. Takes a pattern, returns free
/// prose. Consumed opaquely; the engine never inspects the output.
#[async_trait::async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn narrate(&self, pattern: &Pattern) -> Result<String, DomainError>;
    fn name(&self) -> &'static str;
}
