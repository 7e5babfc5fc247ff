pub mod nominatim;
pub mod noop;
