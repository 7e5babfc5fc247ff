use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "openanomaly",
    about = "Pattern detection and geographic clustering engine for phenomenon reports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a phenomenon report
    ReportAdd {
        /// Category (ufo, ghost, cryptid, psychic, possession, other)
        category: String,
        /// JSON with title, description, lat, lng, location, event_date,
        /// physical_evidence, photo_video, official_report, credibility,
        /// tags, witness_count, metadata
        json: String,
    },
    /// Score report quality (ten weighted dimensions)
    Score {
        /// Id of a stored report
        #[arg(long, conflicts_with = "json")]
        report_id: Option<String>,
        /// Scoring input JSON for an unsaved draft
        #[arg(long)]
        json: Option<String>,
    },
    /// Run the full detection pipeline (cluster, reconcile, link, lifecycle, guard)
    Detect {
        #[arg(long, default_value = "50.0")]
        radius_km: f64,
        #[arg(long, default_value = "3")]
        min_members: usize,
        #[arg(long, default_value = "500")]
        page_size: usize,
        /// Wall-clock budget in seconds; the scan checkpoints and resumes
        #[arg(long)]
        budget_secs: Option<u64>,
    },
    /// Run the incremental link sweep only
    Link,
    /// Run the lifecycle status pass only
    Lifecycle,
    /// Run the ingestion-artifact guard only
    Guard,
    /// List patterns
    Patterns {
        /// Filter by status (emerging, active, declining, historical, archived)
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Show one pattern with uncertainty bounds and narrative
    Pattern {
        /// Pattern id
        id: String,
    },
    /// Geocode approved reports that have a location string but no coordinates
    GeocodeBackfill {
        #[arg(long, default_value = "25")]
        limit: usize,
    },
    /// Show database statistics
    Stats,
}
