use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY,
            full_name   TEXT NOT NULL,
            nickname    TEXT NOT NULL DEFAULT '',
            phone       TEXT NOT NULL UNIQUE
        );

        -- No foreign key on user_id: rows are graded out of band and may
        -- reference users that were never provisioned here.
        CREATE TABLE IF NOT EXISTS leaderboard (
            id                  INTEGER PRIMARY KEY,
            user_id             INTEGER NOT NULL UNIQUE,
            issue_1             INTEGER NOT NULL DEFAULT 0,
            issue_2             INTEGER NOT NULL DEFAULT 0,
            issue_3             INTEGER NOT NULL DEFAULT 0,
            issue_4             INTEGER NOT NULL DEFAULT 0,
            issue_5             INTEGER NOT NULL DEFAULT 0,
            issue_6             INTEGER NOT NULL DEFAULT 0,
            issue_7             INTEGER NOT NULL DEFAULT 0,
            issue_8             INTEGER NOT NULL DEFAULT 0,
            total_score         INTEGER NOT NULL DEFAULT 0,
            participation_count INTEGER NOT NULL DEFAULT 0,
            excellent_issues    TEXT NOT NULL DEFAULT 'لا يوجد'
        );

        CREATE INDEX IF NOT EXISTS idx_leaderboard_total
            ON leaderboard(total_score DESC, user_id);

        CREATE TABLE IF NOT EXISTS login_codes (
            phone       TEXT PRIMARY KEY,
            code_hash   TEXT NOT NULL
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
