pub mod geocode;
pub mod narrative;
pub mod sqlite;
