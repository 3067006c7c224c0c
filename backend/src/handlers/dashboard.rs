use axum::{
    extract::{Extension, State},
    Json,
};

use crate::{
    error::AppError, models::user::DashboardResponse, state::AppState,
    utils::session::SessionPayload,
};

/// Signed-in user plus the courses their contact is enrolled in.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<SessionPayload>,
) -> Result<Json<DashboardResponse>, AppError> {
    let odoo = state.odoo()?;

    let partner_id = odoo
        .read_user_profile(session.uid)
        .await?
        .and_then(|profile| profile.partner_id);

    let courses = match partner_id {
        Some(partner_id) => odoo.list_enrolled_courses(partner_id).await?,
        None => {
            tracing::warn!(uid = session.uid, "No contact linked to user; dashboard is empty");
            Vec::new()
        }
    };

    Ok(Json(DashboardResponse {
        user: session,
        courses,
    }))
}
