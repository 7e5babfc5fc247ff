use crate::domain::error::DomainError;
use crate::domain::ports::geocoder::Geocoder;
use crate::domain::values::geo::Coordinates;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Nominatim (OpenStreetMap) forward geocoder.
///
/// Calls are serialized and spaced at least one second apart to respect the
/// upstream usage policy, and results are cached by normalized query key so
/// repeated location strings cost one request total.
pub struct NominatimGeocoder {
    base_url: String,
    client: reqwest::Client,
    min_interval: Duration,
    state: tokio::sync::Mutex<GeocoderState>,
}

#[derive(Default)]
struct GeocoderState {
    last_call: Option<Instant>,
    cache: HashMap<String, Option<Coordinates>>,
}

#[derive(Debug, serde::Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

impl NominatimGeocoder {
    pub fn new() -> Self {
        Self::with_base_url("https://nominatim.openstreetmap.org".to_string())
    }

    /// Custom endpoint, used by tests against a stub server.
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::builder()
                .user_agent("OpenAnomaly/0.1 (pattern detection engine)")
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            min_interval: Duration::from_secs(1),
            state: tokio::sync::Mutex::new(GeocoderState::default()),
        }
    }
}

impl Default for NominatimGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, DomainError> {
        let key = normalize_query(query);
        if key.is_empty() {
            return Ok(None);
        }

        // Holding the lock across the request serializes callers, which is
        // what the upstream quota requires.
        let mut state = self.state.lock().await;
        if let Some(cached) = state.cache.get(&key) {
            return Ok(*cached);
        }

        if let Some(last) = state.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        state.last_call = Some(Instant::now());

        let url = format!("{}/search", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("q", key.as_str()), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| DomainError::Geocoding(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(DomainError::Geocoding(format!(
                "Nominatim returned {}",
                resp.status()
            )));
        }

        let places: Vec<Place> = resp
            .json()
            .await
            .map_err(|e| DomainError::Parse(e.to_string()))?;

        let coords = places.first().and_then(|p| {
            let lat = p.lat.parse::<f64>().ok()?;
            let lng = p.lon.parse::<f64>().ok()?;
            Coordinates::new(lat, lng).ok()
        });

        state.cache.insert(key, coords);
        Ok(coords)
    }

    fn name(&self) -> &'static str {
        "nominatim"
    }
}
