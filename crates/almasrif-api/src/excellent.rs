use axum::{Json, extract::State};
use tracing::error;

use almasrif_types::api::ExcellentResponse;

use crate::auth::AppState;
use crate::ranking;

/// Per-issue honor roll. On store failure every issue is listed empty.
pub async fn get_excellent(State(state): State<AppState>) -> Json<ExcellentResponse> {
    let db = state.clone();

    let fetched = tokio::task::spawn_blocking(move || {
        let records = db.db.get_scores_with_excellence()?;
        let user_ids: Vec<_> = records.iter().map(|r| r.user_id).collect();
        let users = db.db.get_users_by_ids(&user_ids)?;
        Ok::<_, anyhow::Error>((records, users))
    })
    .await;

    let (records, users) = match fetched {
        Ok(Ok(rows)) => rows,
        Ok(Err(e)) => {
            error!("Excellence query failed: {:#}", e);
            Default::default()
        }
        Err(e) => {
            error!("spawn_blocking join error: {}", e);
            Default::default()
        }
    };

    let users = ranking::index_users(users);
    Json(ExcellentResponse {
        issues: ranking::excellence_board(&records, &users),
    })
}
