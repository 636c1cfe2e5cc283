//! Score aggregation behind the three views: a user's own scorecard, the
//! top-N leaderboard and the per-issue excellence board.
//!
//! Everything here is pure; handlers fetch from the store and pass the rows
//! in. Ordering is total score descending, ties broken by ascending user id.

use std::cmp::Ordering;
use std::collections::HashMap;

use almasrif_types::api::{
    DashboardResponse, ExcellentUser, IssueHonorRoll, IssueScore, LeaderboardEntry, UserProfile,
};
use almasrif_types::models::{IssueNumber, ScoreRecord, User, UserId};

/// Size of the public leaderboard.
pub const LEADERBOARD_SIZE: u32 = 10;

fn rank_order(a: (UserId, i64), b: (UserId, i64)) -> Ordering {
    b.1.cmp(&a.1).then(a.0.cmp(&b.0))
}

pub fn index_users(users: Vec<User>) -> HashMap<UserId, User> {
    users.into_iter().map(|u| (u.id, u)).collect()
}

/// 1-based rank of `user_id` among `totals`, or `None` if the user has no
/// score record.
pub fn rank_of(totals: &[(UserId, i64)], user_id: UserId) -> Option<u32> {
    let mut sorted = totals.to_vec();
    sorted.sort_by(|a, b| rank_order(*a, *b));

    sorted
        .iter()
        .position(|(id, _)| *id == user_id)
        .map(|pos| pos as u32 + 1)
}

/// The signed-in user's scorecard. A missing record renders as zeros.
pub fn scorecard(user: &User, record: Option<&ScoreRecord>, rank: Option<u32>) -> DashboardResponse {
    let empty = ScoreRecord::empty(user.id);
    let record = record.unwrap_or(&empty);

    let issues = IssueNumber::all()
        .map(|issue| {
            let score = record.issue_score(issue);
            IssueScore {
                issue,
                score,
                excellent: issue.is_excellent(score),
            }
        })
        .collect();

    DashboardResponse {
        user: UserProfile {
            id: user.id,
            full_name: user.full_name.clone(),
            nickname: user.nickname.clone(),
        },
        total_score: record.total_score,
        participation_count: record.participation_count,
        excellent_count: record.excellent_count(),
        excellent_labels: record.excellent_issues.iter().map(|m| m.label.clone()).collect(),
        rank,
        issues,
    }
}

/// Top `limit` records joined to their owners. Owners that cannot be found
/// get empty names rather than dropping the entry.
pub fn leaderboard(
    mut records: Vec<ScoreRecord>,
    users: &HashMap<UserId, User>,
    limit: u32,
) -> Vec<LeaderboardEntry> {
    records.sort_by(|a, b| rank_order((a.user_id, a.total_score), (b.user_id, b.total_score)));
    records.truncate(limit as usize);

    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            let (full_name, nickname) = users
                .get(&record.user_id)
                .map(|u| (u.full_name.clone(), u.nickname.clone()))
                .unwrap_or_default();

            LeaderboardEntry {
                rank: idx as u32 + 1,
                user_id: record.user_id,
                full_name,
                nickname,
                total_score: record.total_score,
                participation_count: record.participation_count,
                excellent_count: record.excellent_count(),
            }
        })
        .collect()
}

/// Per-issue honor roll for issues 1..=8, in that order. Records with no
/// resolvable owner or no mentions are skipped; a user listed twice for the
/// same issue appears once.
pub fn excellence_board(records: &[ScoreRecord], users: &HashMap<UserId, User>) -> Vec<IssueHonorRoll> {
    let mut by_issue: HashMap<IssueNumber, Vec<ExcellentUser>> = HashMap::new();

    for record in records {
        let Some(user) = users.get(&record.user_id) else {
            continue;
        };
        if record.excellent_issues.is_empty() {
            continue;
        }

        let labels: Vec<String> = record.excellent_issues.iter().map(|m| m.label.clone()).collect();

        let mut issues: Vec<IssueNumber> = record.excellent_issues.iter().filter_map(|m| m.issue).collect();
        issues.sort_unstable();
        issues.dedup();

        for issue in issues {
            by_issue.entry(issue).or_default().push(ExcellentUser {
                user_id: user.id,
                full_name: user.full_name.clone(),
                nickname: user.nickname.clone(),
                issues: labels.clone(),
            });
        }
    }

    IssueNumber::all()
        .map(|issue| {
            let users = by_issue.remove(&issue).unwrap_or_default();
            IssueHonorRoll {
                issue,
                count: users.len(),
                users,
            }
        })
        .collect()
}
