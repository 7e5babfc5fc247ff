pub mod checkpoint_repo;
pub mod migrations;
pub mod pattern_repo;
pub mod report_repo;
