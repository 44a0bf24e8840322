use axum::extract::State;
use axum::Json;
use panomax_forge::Bearer;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /gettoken -- return a fresh viewer-scoped bearer token as JSON.
///
/// The browser viewer uses this to talk to the viewing services
/// directly; no task correlation is involved.
pub async fn get_token(State(state): State<AppState>) -> AppResult<Json<Bearer>> {
    let bearer = state.auth.authenticate("viewables:read").await?;
    tracing::info!(
        expires_in = bearer.expires_in,
        "Returning a viewer token",
    );
    Ok(Json(bearer))
}
