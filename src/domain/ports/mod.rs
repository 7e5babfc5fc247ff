pub mod checkpoint_repository;
pub mod geocoder;
pub mod narrative;
pub mod pattern_repository;
pub mod report_repository;
