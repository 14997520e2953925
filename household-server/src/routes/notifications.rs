//! POST /api/notifications - family notification side-channel.
//!
//! Push delivery is external; the rendered text is logged.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use household_core::notify::{FamilyNotification, RenderedNotification, render};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/notifications", post(send_notification))
}

async fn send_notification(
    State(state): State<AppState>,
    Json(notification): Json<FamilyNotification>,
) -> Result<(StatusCode, Json<RenderedNotification>), AppError> {
    if notification.family_id.trim().is_empty() {
        return Err(AppError::bad_request("Missing familyId"));
    }

    let rendered = render(&notification, &state.language);
    tracing::info!(
        family_id = %notification.family_id,
        exclude_user_id = %notification.exclude_user_id,
        title = %rendered.title,
        body = %rendered.body,
        "notification"
    );

    Ok((StatusCode::ACCEPTED, Json(rendered)))
}
