use axum::{Extension, Json, extract::State};
use tracing::error;

use almasrif_types::api::DashboardResponse;
use almasrif_types::models::User;

use crate::auth::AppState;
use crate::ranking;

/// The signed-in user's own scorecard and overall rank.
///
/// Store failures render the same as "not graded yet": zeros and no rank.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Json<DashboardResponse> {
    let db = state.clone();
    let user_id = user.id;

    let fetched = tokio::task::spawn_blocking(move || {
        let record = db.db.get_score_by_user(user_id)?;
        let totals = db.db.get_all_totals()?;
        Ok::<_, anyhow::Error>((record, totals))
    })
    .await;

    let (record, rank) = match fetched {
        Ok(Ok((record, totals))) => {
            let rank = ranking::rank_of(&totals, user_id);
            (record, rank)
        }
        Ok(Err(e)) => {
            error!(user_id, "Dashboard query failed: {:#}", e);
            (None, None)
        }
        Err(e) => {
            error!("spawn_blocking join error: {}", e);
            (None, None)
        }
    };

    Json(ranking::scorecard(&user, record.as_ref(), rank))
}
