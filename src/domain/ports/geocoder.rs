use crate::domain::error::DomainError;
use crate::domain::values::geo::Coordinates;

/// Forward geocoding collaborator. Implementations are expected to
/// rate-limit and cache internally; the core treats every call as pure
/// lookup.
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, DomainError>;
    fn name(&self) -> &'static str;
}
