use crate::domain::error::DomainError;
use crate::domain::ports::geocoder::Geocoder;
use crate::domain::values::geo::Coordinates;

pub struct NoopGeocoder;

#[async_trait::async_trait]
impl Geocoder for NoopGeocoder {
    async fn geocode(&self, _query: &str) -> Result<Option<Coordinates>, DomainError> {
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
