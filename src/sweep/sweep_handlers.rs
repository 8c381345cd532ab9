use axum::{extract::State, Json};
use chrono::Utc;

use crate::{error::Result, state::AppState};

use super::sweep_models::SweepResponse;

/// Run one expiration sweep over consultation and assistance requests
///
/// Any method other than `OPTIONS` triggers a sweep; preflight requests are
/// answered by the CORS layer.
#[utoipa::path(
    post,
    path = "/functions/v1/auto-expire-requests",
    responses(
        (status = 200, description = "Sweep completed", body = SweepResponse),
        (status = 401, description = "Missing or invalid trigger token"),
        (status = 500, description = "A conditional update failed")
    ),
    tag = "sweep",
    security(("bearer_auth" = []))
)]
pub async fn run_expiration_sweep(State(state): State<AppState>) -> Result<Json<SweepResponse>> {
    let summary = state.sweeper.run(Utc::now()).await?;

    Ok(Json(summary.into()))
}
