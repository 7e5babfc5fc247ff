use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS reports (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            latitude REAL,
            longitude REAL,
            location_text TEXT,
            event_date TEXT,
            physical_evidence INTEGER NOT NULL DEFAULT 0,
            photo_video INTEGER NOT NULL DEFAULT 0,
            official_report INTEGER NOT NULL DEFAULT 0,
            credibility TEXT NOT NULL DEFAULT 'unverified',
            tags TEXT NOT NULL DEFAULT '[]',
            witness_count INTEGER,
            status TEXT NOT NULL DEFAULT 'approved',
            metadata TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS patterns (
            id TEXT PRIMARY KEY,
            pattern_type TEXT NOT NULL,
            status TEXT NOT NULL,
            title TEXT NOT NULL,
            significance_score REAL NOT NULL DEFAULT 0,
            confidence_score REAL NOT NULL DEFAULT 0,
            report_count INTEGER NOT NULL DEFAULT 0,
            centroid_lat REAL NOT NULL,
            centroid_lng REAL NOT NULL,
            centroid_cell TEXT NOT NULL,
            radius_km REAL NOT NULL,
            categories TEXT NOT NULL DEFAULT '[]',
            first_report_date TEXT,
            last_report_date TEXT,
            detection_method TEXT NOT NULL,
            metadata TEXT,
            first_detected_at TEXT NOT NULL,
            last_updated_at TEXT NOT NULL,
            UNIQUE(pattern_type, centroid_cell)
        );

        CREATE TABLE IF NOT EXISTS pattern_report_links (
            pattern_id TEXT NOT NULL,
            report_id TEXT NOT NULL,
            relevance_score REAL NOT NULL DEFAULT 0.8,
            distance_km REAL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (pattern_id, report_id)
        );

        CREATE TABLE IF NOT EXISTS checkpoints (
            job TEXT PRIMARY KEY,
            cursor TEXT NOT NULL,
            processed INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_reports_status ON reports(status);
        CREATE INDEX IF NOT EXISTS idx_reports_category ON reports(category);
        CREATE INDEX IF NOT EXISTS idx_reports_event_date ON reports(event_date);
        CREATE INDEX IF NOT EXISTS idx_patterns_status ON patterns(status);
        CREATE INDEX IF NOT EXISTS idx_patterns_centroid ON patterns(centroid_lat, centroid_lng);
        CREATE INDEX IF NOT EXISTS idx_links_report ON pattern_report_links(report_id);
        ",
    )
    .map_err(|e| format!("Migration failed: {e}"))
}
