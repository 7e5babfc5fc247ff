pub mod category;
pub mod cluster;
pub mod credibility;
pub mod geo;
pub mod quality;
pub mod uncertainty;
