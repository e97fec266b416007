//! Dashboard endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, services::stats::DashboardStats, AppState};

/// Counters for the admin dashboard
#[utoipa::path(
    get,
    path = "/dashboard/stats",
    tag = "dashboard",
    responses(
        (status = 200, description = "Dashboard counters", body = DashboardStats)
    )
)]
pub async fn dashboard_stats(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    let stats = state.services.stats.dashboard().await?;
    Ok(Json(stats))
}
