use serde::{Deserialize, Serialize};

use crate::models::{IssueNumber, UserId};

// -- JWT Claims --

/// Session token claims. `sub` is the phone number the session is bound to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub phone: String,
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: UserId,
    pub full_name: String,
    pub nickname: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// -- Dashboard --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub full_name: String,
    pub nickname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueScore {
    pub issue: IssueNumber,
    pub score: i64,
    pub excellent: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub user: UserProfile,
    pub total_score: i64,
    pub participation_count: i64,
    pub excellent_count: usize,
    /// Labels for the congratulations banner; empty when nothing to show.
    pub excellent_labels: Vec<String>,
    /// `None` when the user has no score record.
    pub rank: Option<u32>,
    pub issues: Vec<IssueScore>,
}

// -- Leaderboard --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: UserId,
    pub full_name: String,
    pub nickname: String,
    pub total_score: i64,
    pub participation_count: i64,
    pub excellent_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntry>,
}

// -- Excellence board --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcellentUser {
    pub user_id: UserId,
    pub full_name: String,
    pub nickname: String,
    /// Every excellence label the user holds, not just this issue's.
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueHonorRoll {
    pub issue: IssueNumber,
    pub count: usize,
    pub users: Vec<ExcellentUser>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcellentResponse {
    pub issues: Vec<IssueHonorRoll>,
}
