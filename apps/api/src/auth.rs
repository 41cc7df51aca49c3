use axum::extract::State;
use axum::http::StatusCode;
use fieldward_core::AppError;
use tower_sessions::Session;

use crate::error::ApiResult;
use crate::state::AppState;

/// Session key under which the authentication service stores the caller identity.
pub const SESSION_USER_KEY: &str = "user_identity";

/// Ends the caller's session and drops cached permission snapshots.
pub async fn logout_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<StatusCode> {
    session
        .flush()
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear session: {error}")))?;
    state.field_permission_service.end_session();

    Ok(StatusCode::NO_CONTENT)
}
