pub mod pattern;
pub mod report;
