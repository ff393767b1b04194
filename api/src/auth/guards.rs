use axum::{
    Json,
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use db::models::user::UserRole;
use services::ombudsman::Caller;

use crate::auth::claims::AuthUser;
use crate::response::{ApiResponse, Empty};
use crate::state::AppState;

type GuardRejection = (StatusCode, Json<ApiResponse<Empty>>);

/// Verifies the session, loads the user's profile and stores the resulting
/// [`Caller`] in the request extensions.
async fn authenticate(
    state: &AppState,
    req: Request<Body>,
) -> Result<(Request<Body>, Caller), GuardRejection> {
    let (mut parts, body) = req.into_parts();

    let AuthUser(claims) = AuthUser::from_request_parts(&mut parts, state)
        .await
        .map_err(|(status, message)| (status, Json(ApiResponse::error(message))))?;

    let profile = match state.directory().profile(&claims.sub).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::error("Session user no longer exists")),
            ));
        }
        Err(e) => {
            tracing::error!(error = %e, user_id = %claims.sub, "Failed to load session profile");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Internal server error")),
            ));
        }
    };

    let caller = Caller {
        user_id: profile.id,
        role: profile.role,
    };

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(caller.clone());
    Ok((req, caller))
}

/// Any signed-in user. Role checks happen further in.
pub async fn allow_authenticated(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardRejection> {
    let (req, _caller) = authenticate(&state, req).await?;

    Ok(next.run(req).await)
}

/// Admin-only guard.
pub async fn allow_admin(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardRejection> {
    let (req, caller) = authenticate(&state, req).await?;

    if caller.role != UserRole::Admin {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error("Admin access required")),
        ));
    }

    Ok(next.run(req).await)
}
