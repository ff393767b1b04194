pub mod claims;
pub mod extractors;
pub mod guards;
pub mod middleware;

pub use claims::{AuthUser, Claims};

use chrono::{Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Header, encode};

use crate::state::AppState;

/// Signs a session token for `user_id` and returns it with its RFC 3339 expiry.
///
/// Tokens are normally issued by the login service; the API only verifies
/// them. This exists for tooling and tests.
pub fn generate_jwt(user_id: &str, state: &AppState) -> Result<(String, String), JwtError> {
    let expiry = Duration::try_minutes(state.jwt_duration_minutes())
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        .ok_or_else(|| JwtError::from(ErrorKind::InvalidToken))?;

    let claims = Claims {
        sub: user_id.to_owned(),
        exp: expiry.timestamp() as usize,
    };

    let token = encode(&Header::default(), &claims, state.encoding_key())?;
    Ok((token, expiry.to_rfc3339()))
}
