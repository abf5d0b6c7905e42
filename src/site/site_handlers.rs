use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use super::site_models::SiteReference;
use crate::{error::Result, middleware::RemoteUser, state::AppState};

/// Get the sites the remote user is a member of
#[utoipa::path(
    get,
    path = "/api/sites/membership",
    tag = "sites",
    responses(
        (status = 200, description = "Site memberships of the remote user", body = Vec<SiteReference>),
        (status = 401, description = "No remote user on the request"),
        (status = 404, description = "Remote user not found in the repository"),
        (status = 500, description = "Repository unavailable")
    ),
    security(
        ("remote_user" = [])
    )
)]
pub async fn get_site_memberships(
    State(state): State<AppState>,
    RemoteUser(user_id): RemoteUser,
) -> Result<impl IntoResponse> {
    let sites = state.site_service.resolve_memberships(&user_id).await?;

    Ok((StatusCode::OK, Json(sites)))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up")
    )
)]
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
