use crate::models::ScoreRow;
use crate::{Database, excellent};
use almasrif_types::models::{ISSUE_COUNT, ScoreRecord, User, UserId};
use anyhow::Result;
use rusqlite::{Connection, Row};

const SCORE_COLUMNS: &str = "id, user_id, issue_1, issue_2, issue_3, issue_4, issue_5, issue_6, \
     issue_7, issue_8, total_score, participation_count, excellent_issues";

// Ties on total_score are broken by ascending user id everywhere.
const RANK_ORDER: &str = "ORDER BY total_score DESC, user_id ASC";

impl Database {
    // -- Users --

    pub fn get_user_by_phone(&self, phone: &str) -> Result<Option<User>> {
        self.with_conn(|conn| query_user_by_phone(conn, phone))
    }

    /// Batch-fetch users for a set of ids. Unknown ids are simply absent.
    pub fn get_users_by_ids(&self, user_ids: &[UserId]) -> Result<Vec<User>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> = (1..=user_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT id, full_name, nickname, phone FROM users WHERE id IN ({})",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(user_ids), user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Scores --

    pub fn get_score_by_user(&self, user_id: UserId) -> Result<Option<ScoreRecord>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM leaderboard WHERE user_id = ?1", SCORE_COLUMNS);
            let row = conn
                .query_row(&sql, [user_id], score_from_row)
                .optional()?;
            Ok(row.map(ScoreRow::into_record))
        })
    }

    /// Every participant's `(user_id, total_score)`, best first.
    pub fn get_all_totals(&self) -> Result<Vec<(UserId, i64)>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT user_id, total_score FROM leaderboard {}", RANK_ORDER);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_top_scores(&self, limit: u32) -> Result<Vec<ScoreRecord>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM leaderboard {} LIMIT ?1", SCORE_COLUMNS, RANK_ORDER);
            query_scores(conn, &sql, [limit])
        })
    }

    /// Records whose excellence list is not the "none" sentinel, by user id.
    pub fn get_scores_with_excellence(&self) -> Result<Vec<ScoreRecord>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM leaderboard WHERE excellent_issues != ?1 ORDER BY user_id ASC",
                SCORE_COLUMNS
            );
            query_scores(conn, &sql, [excellent::NONE_SENTINEL])
        })
    }

    // -- Login codes --

    pub fn get_login_code_hash(&self, phone: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let hash = conn
                .query_row(
                    "SELECT code_hash FROM login_codes WHERE phone = ?1",
                    [phone],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(hash)
        })
    }

    // -- Provisioning --
    //
    // Users, codes and scores are written by administrative tooling, never
    // through the HTTP surface.

    pub fn insert_user(&self, full_name: &str, nickname: &str, phone: &str) -> Result<UserId> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (full_name, nickname, phone) VALUES (?1, ?2, ?3)",
                (full_name, nickname, phone),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn set_login_code_hash(&self, phone: &str, code_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO login_codes (phone, code_hash) VALUES (?1, ?2)
                 ON CONFLICT(phone) DO UPDATE SET code_hash = excluded.code_hash",
                (phone, code_hash),
            )?;
            Ok(())
        })
    }

    /// Insert or replace the score record for `record.user_id`. `record.id`
    /// is ignored.
    pub fn upsert_score(&self, record: &ScoreRecord) -> Result<()> {
        let [i1, i2, i3, i4, i5, i6, i7, i8] = record.issues;
        let excellent_issues = excellent::encode(&record.excellent_issues);

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO leaderboard (user_id, issue_1, issue_2, issue_3, issue_4, issue_5,
                     issue_6, issue_7, issue_8, total_score, participation_count, excellent_issues)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                 ON CONFLICT(user_id) DO UPDATE SET
                     issue_1 = excluded.issue_1, issue_2 = excluded.issue_2,
                     issue_3 = excluded.issue_3, issue_4 = excluded.issue_4,
                     issue_5 = excluded.issue_5, issue_6 = excluded.issue_6,
                     issue_7 = excluded.issue_7, issue_8 = excluded.issue_8,
                     total_score = excluded.total_score,
                     participation_count = excluded.participation_count,
                     excellent_issues = excluded.excellent_issues",
                rusqlite::params![
                    record.user_id,
                    i1,
                    i2,
                    i3,
                    i4,
                    i5,
                    i6,
                    i7,
                    i8,
                    record.total_score,
                    record.participation_count,
                    excellent_issues
                ],
            )?;
            Ok(())
        })
    }
}

fn query_user_by_phone(conn: &Connection, phone: &str) -> Result<Option<User>> {
    let mut stmt = conn.prepare("SELECT id, full_name, nickname, phone FROM users WHERE phone = ?1")?;
    let user = stmt.query_row([phone], user_from_row).optional()?;
    Ok(user)
}

fn query_scores<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<ScoreRecord>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, score_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows.into_iter().map(ScoreRow::into_record).collect())
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        full_name: row.get(1)?,
        nickname: row.get(2)?,
        phone: row.get(3)?,
    })
}

fn score_from_row(row: &Row<'_>) -> rusqlite::Result<ScoreRow> {
    let mut issues = [0i64; ISSUE_COUNT];
    for (i, slot) in issues.iter_mut().enumerate() {
        *slot = row.get(2 + i)?;
    }

    Ok(ScoreRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        issues,
        total_score: row.get(10)?,
        participation_count: row.get(11)?,
        excellent_issues: row.get(12)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
