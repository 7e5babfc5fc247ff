pub mod artifact_guard;
pub mod clustering;
pub mod detect;
pub mod geocode_backfill;
pub mod ingest;
pub mod lifecycle;
pub mod linker;
pub mod patterns;
pub mod quality;
pub mod registry;
pub mod retry;
pub mod stats;
