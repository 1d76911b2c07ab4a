use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use skylane_core::identity::AdminSessions;

use crate::error::AppError;
use crate::state::AppState;

/// Injected into request extensions once the bearer token validates.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub admin_id: Uuid,
}

/// Admin gate: requires `Authorization: Bearer <token>` and a token that
/// the session store actually issued and has not expired.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let unauthorized = || {
        AppError::AuthenticationError(
            "Unauthorized access. Missing or invalid admin authentication token.".to_string(),
        )
    };

    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(unauthorized)?;

    let admin_id = state
        .sessions
        .validate(token)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(unauthorized)?;

    req.extensions_mut().insert(AdminIdentity { admin_id });

    Ok(next.run(req).await)
}
