use crate::domain::error::DomainError;
use std::time::Duration;

/// Run `op` up to `attempts` times with exponentially growing delays.
/// Returns the last error when every attempt fails; the caller decides
/// whether that is fatal (for batch sweeps it usually means log and skip).
pub fn with_retry<T, F>(attempts: u32, base_delay: Duration, mut op: F) -> Result<T, DomainError>
where
    F: FnMut() -> Result<T, DomainError>,
{
    let mut delay = base_delay;
    let mut last_err = None;
    for attempt in 0..attempts.max(1) {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) => {
                last_err = Some(e);
                if attempt + 1 < attempts {
                    std::thread::sleep(delay);
                    delay *= 2;
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| DomainError::Database("retry exhausted".to_string())))
}
