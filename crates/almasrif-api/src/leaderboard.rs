use axum::{Json, extract::State};
use tracing::error;

use almasrif_types::api::LeaderboardResponse;

use crate::auth::AppState;
use crate::ranking::{self, LEADERBOARD_SIZE};

pub async fn get_leaderboard(State(state): State<AppState>) -> Json<LeaderboardResponse> {
    let db = state.clone();

    let fetched = tokio::task::spawn_blocking(move || {
        let records = db.db.get_top_scores(LEADERBOARD_SIZE)?;
        let user_ids: Vec<_> = records.iter().map(|r| r.user_id).collect();
        let users = db.db.get_users_by_ids(&user_ids)?;
        Ok::<_, anyhow::Error>((records, users))
    })
    .await;

    match fetched {
        Ok(Ok((records, users))) => {
            let users = ranking::index_users(users);
            Json(LeaderboardResponse {
                entries: ranking::leaderboard(records, &users, LEADERBOARD_SIZE),
            })
        }
        Ok(Err(e)) => {
            error!("Leaderboard query failed: {:#}", e);
            Json(LeaderboardResponse::default())
        }
        Err(e) => {
            error!("spawn_blocking join error: {}", e);
            Json(LeaderboardResponse::default())
        }
    }
}
