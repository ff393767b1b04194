use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use axum_extra::extract::{CookieJar, TypedHeader};
use headers::{Authorization, authorization::Bearer};
use jsonwebtoken::{Algorithm, Validation, decode};

use crate::auth::claims::{AuthUser, Claims};
use crate::state::AppState;

/// Extracts and verifies the session token.
///
/// The token is read from the session cookie first and from an
/// `Authorization: Bearer` header otherwise.
///
/// # Errors
/// `401 Unauthorized` when no token is present or it fails verification
/// (bad signature, malformed, expired).
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = match session_cookie(parts, state) {
            Some(token) => token,
            None => {
                let TypedHeader(Authorization(bearer)) =
                    TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                        .await
                        .map_err(|_| (StatusCode::UNAUTHORIZED, "Authentication required"))?;
                bearer.token().to_owned()
            }
        };

        let token_data = decode::<Claims>(
            &token,
            state.decoding_key(),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid or expired session"))?;

        Ok(AuthUser(token_data.claims))
    }
}

fn session_cookie(parts: &Parts, state: &AppState) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(state.session_cookie_name())
        .map(|cookie| cookie.value().trim().to_owned())
        .filter(|value| !value.is_empty())
}
