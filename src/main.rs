use clap::Parser;
use openanomaly::application::detect::DetectOptions;
use openanomaly::application::ingest::NewReport;
use openanomaly::cli::commands::{Cli, Commands};
use openanomaly::domain::entities::pattern::PatternStatus;
use openanomaly::domain::values::category::Category;
use openanomaly::domain::values::credibility::Credibility;
use openanomaly::domain::values::geo::Coordinates;
use openanomaly::domain::values::quality::ScoringInput;
use openanomaly::OpenAnomaly;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let db_path = std::env::var("OPENANOMALY_DB").unwrap_or_else(|_| "./openanomaly.db".into());

    let oa = match OpenAnomaly::new(&db_path) {
        Ok(oa) => oa,
        Err(e) => {
            eprintln!("Error initializing OpenAnomaly: {e}");
            std::process::exit(1);
        }
    };

    let result = run_command(oa, cli.command).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(oa: OpenAnomaly, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::ReportAdd { category, json } => {
            let cat: Category = category.parse().map_err(|e: String| e)?;
            let data: serde_json::Value = serde_json::from_str(&json)?;

            let title = data["title"]
                .as_str()
                .ok_or("Missing required field: title")?
                .to_string();
            let description = data["description"]
                .as_str()
                .ok_or("Missing required field: description")?
                .to_string();
            let coordinates = match (data["lat"].as_f64(), data["lng"].as_f64()) {
                (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)?),
                _ => None,
            };
            let location_text = data["location"].as_str().map(|s| s.to_string());
            let event_date = parse_date(&data["event_date"].as_str().map(String::from))?;
            let credibility: Credibility = data["credibility"]
                .as_str()
                .map(|s| s.parse())
                .transpose()
                .map_err(|e: String| e)?
                .unwrap_or_default();
            let tags: Vec<String> = data["tags"]
                .as_array()
                .map(|a| {
                    a.iter()
                        .filter_map(|v| v.as_str().map(String::from))
                        .collect()
                })
                .unwrap_or_default();
            let witness_count = data["witness_count"].as_u64().map(|n| n as u32);
            let metadata = data.get("metadata").cloned();

            let (report, quality) = oa.add_report(NewReport {
                category: cat,
                title,
                description,
                coordinates,
                location_text,
                event_date,
                physical_evidence: data["physical_evidence"].as_bool().unwrap_or(false),
                photo_video: data["photo_video"].as_bool().unwrap_or(false),
                official_report: data["official_report"].as_bool().unwrap_or(false),
                credibility,
                tags,
                witness_count,
                metadata,
            })?;
            println!("{}", serde_json::to_string_pretty(&report).unwrap());
            println!("{}", serde_json::to_string_pretty(&quality).unwrap());
        }
        Commands::Score { report_id, json } => {
            let quality = match (report_id, json) {
                (Some(id), _) => oa.score_report(&id)?,
                (None, Some(json)) => {
                    let input: ScoringInput = serde_json::from_str(&json)?;
                    oa.score_input(&input)
                }
                (None, None) => return Err("Provide either --report-id or --json".into()),
            };
            println!("{}", serde_json::to_string_pretty(&quality).unwrap());
        }
        Commands::Detect {
            radius_km,
            min_members,
            page_size,
            budget_secs,
        } => {
            let options = DetectOptions {
                radius_km,
                min_members,
                page_size,
                budget: budget_secs.map(Duration::from_secs),
            };
            let summary = oa.detect(&options)?;
            println!("{}", serde_json::to_string_pretty(&summary).unwrap());
        }
        Commands::Link => {
            let sweep = oa.link()?;
            println!("{}", serde_json::to_string_pretty(&sweep).unwrap());
        }
        Commands::Lifecycle => {
            let sweep = oa.lifecycle()?;
            println!("{}", serde_json::to_string_pretty(&sweep).unwrap());
        }
        Commands::Guard => {
            let sweep = oa.guard()?;
            println!("{}", serde_json::to_string_pretty(&sweep).unwrap());
        }
        Commands::Patterns { status, limit } => {
            let status: Option<PatternStatus> = status
                .map(|s| s.parse())
                .transpose()
                .map_err(|e: String| e)?;
            let patterns = oa.patterns(status, Some(limit))?;
            println!("{}", serde_json::to_string_pretty(&patterns).unwrap());
        }
        Commands::Pattern { id } => {
            let view = oa.pattern_view(&id).await?;
            println!("{}", serde_json::to_string_pretty(&view).unwrap());
        }
        Commands::GeocodeBackfill { limit } => {
            let report = oa.geocode_backfill(limit).await?;
            println!("{}", serde_json::to_string_pretty(&report).unwrap());
        }
        Commands::Stats => {
            let stats = oa.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats).unwrap());
        }
    }
    Ok(())
}

fn parse_date(s: &Option<String>) -> Result<Option<chrono::DateTime<chrono::Utc>>, String> {
    match s {
        None => Ok(None),
        Some(s) => {
            if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
                return Ok(Some(dt.with_timezone(&chrono::Utc)));
            }
            if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                let dt = date.and_hms_opt(0, 0, 0).unwrap();
                return Ok(Some(chrono::DateTime::from_naive_utc_and_offset(
                    dt,
                    chrono::Utc,
                )));
            }
            Err(format!(
                "Invalid date format: {s}. Use YYYY-MM-DD or RFC3339"
            ))
        }
    }
}
