use crate::domain::entities::pattern::Pattern;
use crate::domain::error::DomainError;
use crate::domain::ports::narrative::NarrativeGenerator;

pub struct NoopNarrative;

#[async_trait::async_trait]
impl NarrativeGenerator for NoopNarrative {
    async fn narrate(&self, _pattern: &Pattern) -> Result<String, DomainError> {
        Ok(String::new())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
