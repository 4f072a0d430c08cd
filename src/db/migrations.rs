use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS areas (
            id     TEXT PRIMARY KEY,
            name   TEXT NOT NULL,
            color  TEXT
        );

        CREATE TABLE IF NOT EXISTS halqas (
            id           TEXT PRIMARY KEY,
            area_id      TEXT NOT NULL REFERENCES areas(id),
            name         TEXT NOT NULL,
            meeting_day  TEXT,
            members      TEXT NOT NULL DEFAULT '[]'
        );

        CREATE TABLE IF NOT EXISTS meetings (
            id               TEXT PRIMARY KEY,
            halqa_id         TEXT NOT NULL REFERENCES halqas(id) ON DELETE CASCADE,
            week_start_date  TEXT NOT NULL,
            status           TEXT NOT NULL DEFAULT 'pending'
                             CHECK(status IN ('pending','completed','missed','cancelled')),
            attendance       TEXT NOT NULL DEFAULT '{}',
            agenda_status    TEXT NOT NULL DEFAULT '{}',
            missed_reason    TEXT,
            cancelled_reason TEXT,
            notes            TEXT,
            created_at       TEXT DEFAULT (datetime('now')),
            UNIQUE(halqa_id, week_start_date)
        );

        CREATE INDEX IF NOT EXISTS idx_halqas_area ON halqas(area_id);
        CREATE INDEX IF NOT EXISTS idx_meetings_week ON meetings(week_start_date);
    ")?;
    Ok(())
}
