//! Database row types. These map directly to SQLite rows; queries convert
//! them to almasrif-types models before returning.

use almasrif_types::models::{ISSUE_COUNT, ScoreRecord, UserId};

use crate::excellent;

pub struct ScoreRow {
    pub id: i64,
    pub user_id: UserId,
    pub issues: [i64; ISSUE_COUNT],
    pub total_score: i64,
    pub participation_count: i64,
    pub excellent_issues: String,
}

impl ScoreRow {
    pub fn into_record(self) -> ScoreRecord {
        ScoreRecord {
            id: self.id,
            user_id: self.user_id,
            issues: self.issues,
            total_score: self.total_score,
            participation_count: self.participation_count,
            excellent_issues: excellent::decode(&self.excellent_issues),
        }
    }
}
