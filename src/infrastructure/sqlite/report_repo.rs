use crate::domain::entities::report::{Report, ReportStatus};
use crate::domain::error::DomainError;
use crate::domain::ports::report_repository::*;
use crate::domain::values::category::Category;
use crate::domain::values::credibility::Credibility;
use crate::domain::values::geo::Coordinates;
use chrono::DateTime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// Column list used in all SELECT queries.
const SELECT_COLS: &str = "id, title, description, category, latitude, longitude, location_text, \
    event_date, physical_evidence, photo_video, official_report, credibility, tags, \
    witness_count, status, metadata, created_at, updated_at";

pub struct SqliteReportRepo {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteReportRepo {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn row_to_report(row: &rusqlite::Row) -> Result<Report, rusqlite::Error> {
        let cat_str: String = row.get(3)?;
        let lat: Option<f64> = row.get(4)?;
        let lng: Option<f64> = row.get(5)?;
        let event_str: Option<String> = row.get(7)?;
        let cred_str: String = row.get(11)?;
        let tags_str: String = row.get(12)?;
        let status_str: String = row.get(14)?;
        let metadata_str: Option<String> = row.get(15)?;
        let created_str: String = row.get(16)?;
        let updated_str: String = row.get(17)?;

        let coordinates = match (lat, lng) {
            (Some(lat), Some(lng)) => Coordinates::new(lat, lng).ok(),
            _ => None,
        };

        Ok(Report {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            category: cat_str.parse().unwrap_or_else(|_| {
                eprintln!("Warning: invalid category '{cat_str}' in report, defaulting to Other");
                Category::Other
            }),
            coordinates,
            location_text: row.get(6)?,
            event_date: event_str.and_then(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.with_timezone(&chrono::Utc))
                    .ok()
            }),
            physical_evidence: row.get::<_, i32>(8)? != 0,
            photo_video: row.get::<_, i32>(9)? != 0,
            official_report: row.get::<_, i32>(10)? != 0,
            credibility: cred_str.parse().unwrap_or_else(|_| {
                eprintln!("Warning: invalid credibility '{cred_str}' in report, defaulting");
                Credibility::default()
            }),
            tags: serde_json::from_str(&tags_str).unwrap_or_default(),
            witness_count: row.get(13)?,
            status: status_str.parse().unwrap_or(ReportStatus::PendingReview),
            metadata: metadata_str.and_then(|s| serde_json::from_str(&s).ok()),
            created_at: DateTime::parse_from_rfc3339(&created_str)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
            updated_at: DateTime::parse_from_rfc3339(&updated_str)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
        })
    }
}

impl ReportRepository for SqliteReportRepo {
    fn add(&self, report: &Report) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute(
            "INSERT INTO reports (id, title, description, category, latitude, longitude, location_text, \
             event_date, physical_evidence, photo_video, official_report, credibility, tags, \
             witness_count, status, metadata, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
            params![
                report.id,
                report.title,
                report.description,
                report.category.to_string(),
                report.coordinates.map(|c| c.lat),
                report.coordinates.map(|c| c.lng),
                report.location_text,
                report.event_date.map(|d| d.to_rfc3339()),
                report.physical_evidence as i32,
                report.photo_video as i32,
                report.official_report as i32,
                report.credibility.to_string(),
                serde_json::to_string(&report.tags).unwrap_or_default(),
                report.witness_count,
                report.status.to_string(),
                report.metadata.as_ref().map(|m| serde_json::to_string(m).unwrap_or_default()),
                report.created_at.to_rfc3339(),
                report.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to add report: {e}")))?;
        Ok(())
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Report>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!("SELECT {SELECT_COLS} FROM reports WHERE id = ?1");
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![id], Self::row_to_report)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows.next().and_then(|r| r.ok()))
    }

    fn query(&self, filter: &ReportFilter) -> Result<Vec<Report>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut sql = format!("SELECT {SELECT_COLS} FROM reports WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(status) = &filter.status {
            sql.push_str(&format!(" AND status = ?{}", param_values.len() + 1));
            param_values.push(Box::new(status.to_string()));
        }
        if let Some(categories) = &filter.categories {
            let placeholders: Vec<String> = categories
                .iter()
                .enumerate()
                .map(|(i, _)| format!("?{}", param_values.len() + 1 + i))
                .collect();
            sql.push_str(&format!(" AND category IN ({})", placeholders.join(", ")));
            for cat in categories {
                param_values.push(Box::new(cat.to_string()));
            }
        }
        if filter.with_coordinates {
            sql.push_str(" AND latitude IS NOT NULL AND longitude IS NOT NULL");
        }
        if filter.unassigned_only {
            sql.push_str(" AND id NOT IN (SELECT report_id FROM pattern_report_links)");
        }
        if let Some(since) = &filter.event_since {
            sql.push_str(&format!(" AND event_date >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(since.to_rfc3339()));
        }
        if let Some(until) = &filter.event_until {
            sql.push_str(&format!(" AND event_date <= ?{}", param_values.len() + 1));
            param_values.push(Box::new(until.to_rfc3339()));
        }
        if let Some(after_id) = &filter.after_id {
            sql.push_str(&format!(" AND id > ?{}", param_values.len() + 1));
            param_values.push(Box::new(after_id.clone()));
        }

        // Stable id order: the clustering sweep depends on a fixed iteration
        // order, and the cursor pagination depends on it being monotonic.
        sql.push_str(" ORDER BY id ASC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT ?{}", param_values.len() + 1));
            param_values.push(Box::new(limit as i64));
        }

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let reports = stmt
            .query_map(params_refs.as_slice(), Self::row_to_report)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(reports)
    }

    fn missing_coordinates(&self, limit: usize) -> Result<Vec<Report>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!(
            "SELECT {SELECT_COLS} FROM reports \
             WHERE status = 'approved' AND latitude IS NULL \
             AND location_text IS NOT NULL AND location_text != '' \
             ORDER BY id ASC LIMIT ?1"
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let reports = stmt
            .query_map(params![limit as i64], Self::row_to_report)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(reports)
    }

    fn set_coordinates(&self, id: &str, coordinates: &Coordinates) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let changed = conn
            .execute(
                "UPDATE reports SET latitude = ?1, longitude = ?2, updated_at = ?3 WHERE id = ?4",
                params![
                    coordinates.lat,
                    coordinates.lng,
                    chrono::Utc::now().to_rfc3339(),
                    id
                ],
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("report {id}")));
        }
        Ok(())
    }

    fn stats(&self) -> Result<ReportStats, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let total: usize = conn
            .query_row("SELECT COUNT(*) FROM reports", [], |r| r.get(0))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let with_coordinates: usize = conn
            .query_row(
                "SELECT COUNT(*) FROM reports WHERE latitude IS NOT NULL",
                [],
                |r| r.get(0),
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare("SELECT status, COUNT(*) FROM reports GROUP BY status")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let by_status: Vec<(String, usize)> = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
            })
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();

        let mut stmt = conn
            .prepare("SELECT category, COUNT(*) FROM reports GROUP BY category")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let by_category: Vec<(String, usize)> = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
            })
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(ReportStats {
            total_reports: total,
            with_coordinates,
            by_status,
            by_category,
        })
    }
}
