use crate::{error::AppError, state::AppState};
use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};

/// Identity established upstream and forwarded in the configured header.
/// Its presence is trusted; no credentials are checked here.
pub async fn remote_user_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let remote_user = match req.headers().get(&state.config.remote_user_header) {
        Some(value) => value
            .to_str()
            .map_err(|_| AppError::BadRequest("Remote user header is not valid text".to_string()))?
            .trim()
            .to_string(),
        None => String::new(),
    };

    if remote_user.is_empty() {
        return Err(AppError::Unauthorized("No authenticated user".to_string()));
    }

    req.extensions_mut().insert(RemoteUser(remote_user));

    Ok(next.run(req).await)
}

// Extractor for getting the remote user from request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for RemoteUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RemoteUser>()
            .cloned()
            .ok_or(AppError::Unauthorized("No authenticated user".to_string()))
    }
}
