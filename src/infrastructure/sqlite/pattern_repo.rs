use crate::domain::entities::pattern::{Pattern, PatternReportLink, PatternStatus, PatternType};
use crate::domain::error::DomainError;
use crate::domain::ports::pattern_repository::*;
use crate::domain::values::geo::Coordinates;
use chrono::DateTime;
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

const SELECT_COLS: &str = "id, pattern_type, status, title, significance_score, confidence_score, \
    report_count, centroid_lat, centroid_lng, radius_km, categories, first_report_date, \
    last_report_date, detection_method, metadata, first_detected_at, last_updated_at";

pub struct SqlitePatternRepo {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePatternRepo {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn row_to_pattern(row: &rusqlite::Row) -> Result<Pattern, rusqlite::Error> {
        let type_str: String = row.get(1)?;
        let status_str: String = row.get(2)?;
        let categories_str: String = row.get(10)?;
        let first_str: Option<String> = row.get(11)?;
        let last_str: Option<String> = row.get(12)?;
        let metadata_str: Option<String> = row.get(14)?;
        let detected_str: String = row.get(15)?;
        let updated_str: String = row.get(16)?;

        let parse_dt = |s: String| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .ok()
        };

        Ok(Pattern {
            id: row.get(0)?,
            pattern_type: type_str.parse().unwrap_or_else(|_| {
                eprintln!("Warning: invalid pattern_type '{type_str}', defaulting");
                PatternType::GeographicCluster
            }),
            status: status_str.parse().unwrap_or_else(|_| {
                eprintln!("Warning: invalid pattern status '{status_str}', defaulting");
                PatternStatus::Emerging
            }),
            title: row.get(3)?,
            significance_score: row.get(4)?,
            confidence_score: row.get(5)?,
            report_count: row.get::<_, i64>(6)? as usize,
            centroid: Coordinates {
                lat: row.get(7)?,
                lng: row.get(8)?,
            },
            radius_km: row.get(9)?,
            categories: serde_json::from_str(&categories_str).unwrap_or_default(),
            first_report_date: first_str.and_then(parse_dt),
            last_report_date: last_str.and_then(parse_dt),
            detection_method: row.get(13)?,
            metadata: metadata_str.and_then(|s| serde_json::from_str(&s).ok()),
            first_detected_at: parse_dt(detected_str).unwrap_or_else(chrono::Utc::now),
            last_updated_at: parse_dt(updated_str).unwrap_or_else(chrono::Utc::now),
        })
    }
}

impl PatternRepository for SqlitePatternRepo {
    fn upsert(&self, pattern: &Pattern) -> Result<String, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        // Natural-key upsert: a duplicate invocation that produced the same
        // centroid cell updates the existing row instead of inserting a twin.
        conn.execute(
            "INSERT INTO patterns (id, pattern_type, status, title, significance_score, \
             confidence_score, report_count, centroid_lat, centroid_lng, centroid_cell, \
             radius_km, categories, first_report_date, last_report_date, detection_method, \
             metadata, first_detected_at, last_updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
             ON CONFLICT(pattern_type, centroid_cell) DO UPDATE SET
                 status = excluded.status,
                 title = excluded.title,
                 significance_score = excluded.significance_score,
                 confidence_score = excluded.confidence_score,
                 report_count = excluded.report_count,
                 centroid_lat = excluded.centroid_lat,
                 centroid_lng = excluded.centroid_lng,
                 radius_km = excluded.radius_km,
                 categories = excluded.categories,
                 first_report_date = excluded.first_report_date,
                 last_report_date = excluded.last_report_date,
                 metadata = excluded.metadata,
                 last_updated_at = excluded.last_updated_at",
            params![
                pattern.id,
                pattern.pattern_type.to_string(),
                pattern.status.to_string(),
                pattern.title,
                pattern.significance_score,
                pattern.confidence_score,
                pattern.report_count as i64,
                pattern.centroid.lat,
                pattern.centroid.lng,
                pattern.centroid_cell(),
                pattern.radius_km,
                serde_json::to_string(&pattern.categories).unwrap_or_default(),
                pattern.first_report_date.map(|d| d.to_rfc3339()),
                pattern.last_report_date.map(|d| d.to_rfc3339()),
                pattern.detection_method,
                pattern.metadata.as_ref().map(|m| serde_json::to_string(m).unwrap_or_default()),
                pattern.first_detected_at.to_rfc3339(),
                pattern.last_updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to upsert pattern: {e}")))?;

        // The stored id may differ from pattern.id when the conflict path ran.
        let id: String = conn
            .query_row(
                "SELECT id FROM patterns WHERE pattern_type = ?1 AND centroid_cell = ?2",
                params![pattern.pattern_type.to_string(), pattern.centroid_cell()],
                |r| r.get(0),
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(id)
    }

    fn update(&self, pattern: &Pattern) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let changed = conn
            .execute(
                "UPDATE patterns SET status = ?1, title = ?2, significance_score = ?3, \
                 confidence_score = ?4, report_count = ?5, centroid_lat = ?6, centroid_lng = ?7, \
                 centroid_cell = ?8, radius_km = ?9, categories = ?10, first_report_date = ?11, \
                 last_report_date = ?12, metadata = ?13, last_updated_at = ?14
                 WHERE id = ?15",
                params![
                    pattern.status.to_string(),
                    pattern.title,
                    pattern.significance_score,
                    pattern.confidence_score,
                    pattern.report_count as i64,
                    pattern.centroid.lat,
                    pattern.centroid.lng,
                    pattern.centroid_cell(),
                    pattern.radius_km,
                    serde_json::to_string(&pattern.categories).unwrap_or_default(),
                    pattern.first_report_date.map(|d| d.to_rfc3339()),
                    pattern.last_report_date.map(|d| d.to_rfc3339()),
                    pattern.metadata.as_ref().map(|m| serde_json::to_string(m).unwrap_or_default()),
                    pattern.last_updated_at.to_rfc3339(),
                    pattern.id,
                ],
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("pattern {}", pattern.id)));
        }
        Ok(())
    }

    fn set_status(&self, id: &str, status: PatternStatus) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let changed = conn
            .execute(
                "UPDATE patterns SET status = ?1 WHERE id = ?2",
                params![status.to_string(), id],
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("pattern {id}")));
        }
        Ok(())
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Pattern>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!("SELECT {SELECT_COLS} FROM patterns WHERE id = ?1");
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![id], Self::row_to_pattern)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows.next().and_then(|r| r.ok()))
    }

    fn list(
        &self,
        status: Option<PatternStatus>,
        limit: Option<usize>,
    ) -> Result<Vec<Pattern>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut sql = format!("SELECT {SELECT_COLS} FROM patterns WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(status) = status {
            sql.push_str(&format!(" AND status = ?{}", param_values.len() + 1));
            param_values.push(Box::new(status.to_string()));
        }
        sql.push_str(" ORDER BY id ASC");
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT ?{}", param_values.len() + 1));
            param_values.push(Box::new(limit as i64));
        }

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let patterns = stmt
            .query_map(params_refs.as_slice(), Self::row_to_pattern)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(patterns)
    }

    fn find_near(
        &self,
        centroid: &Coordinates,
        tolerance_deg: f64,
        pattern_type: PatternType,
    ) -> Result<Vec<Pattern>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!(
            "SELECT {SELECT_COLS} FROM patterns \
             WHERE pattern_type = ?1 \
             AND centroid_lat BETWEEN ?2 AND ?3 \
             AND centroid_lng BETWEEN ?4 AND ?5 \
             ORDER BY id ASC"
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let patterns = stmt
            .query_map(
                params![
                    pattern_type.to_string(),
                    centroid.lat - tolerance_deg,
                    centroid.lat + tolerance_deg,
                    centroid.lng - tolerance_deg,
                    centroid.lng + tolerance_deg,
                ],
                Self::row_to_pattern,
            )
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(patterns)
    }

    fn link_reports(&self, links: &[PatternReportLink]) -> Result<usize, DomainError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let now = chrono::Utc::now().to_rfc3339();
        let mut inserted = 0;
        for link in links {
            let changed = tx
                .execute(
                    "INSERT INTO pattern_report_links \
                     (pattern_id, report_id, relevance_score, distance_km, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(pattern_id, report_id) DO NOTHING",
                    params![
                        link.pattern_id,
                        link.report_id,
                        link.relevance_score,
                        link.distance_km,
                        now,
                    ],
                )
                .map_err(|e| DomainError::Database(format!("Failed to link report: {e}")))?;
            inserted += changed;
        }
        tx.commit()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(inserted)
    }

    fn linked_report_ids(&self, pattern_id: &str) -> Result<HashSet<String>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare("SELECT report_id FROM pattern_report_links WHERE pattern_id = ?1")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let ids = stmt
            .query_map(params![pattern_id], |row| row.get::<_, String>(0))
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(ids)
    }

    fn link_count(&self, pattern_id: &str) -> Result<usize, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.query_row(
            "SELECT COUNT(*) FROM pattern_report_links WHERE pattern_id = ?1",
            params![pattern_id],
            |r| r.get(0),
        )
        .map_err(|e| DomainError::Database(e.to_string()))
    }

    fn stats(&self) -> Result<PatternStats, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let total: usize = conn
            .query_row("SELECT COUNT(*) FROM patterns", [], |r| r.get(0))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let total_links: usize = conn
            .query_row("SELECT COUNT(*) FROM pattern_report_links", [], |r| r.get(0))
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare("SELECT status, COUNT(*) FROM patterns GROUP BY status")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let by_status: Vec<(String, usize)> = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
            })
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();

        let mut stmt = conn
            .prepare("SELECT pattern_type, COUNT(*) FROM patterns GROUP BY pattern_type")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let by_type: Vec<(String, usize)> = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
            })
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(PatternStats {
            total_patterns: total,
            by_status,
            by_type,
            total_links,
        })
    }
}
