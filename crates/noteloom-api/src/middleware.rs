use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use noteloom_types::api::Claims;

use crate::auth::{AppState, blocking};
use crate::error::ApiError;

/// The authenticated caller, passed explicitly to every handler that
/// touches notes.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub name: String,
}

/// Extract and validate the JWT from the Authorization header. Tokens of
/// users that no longer exist are rejected.
pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(ApiError::Unauthorized)?;
    let claims = decode_token(&state.jwt_secret, bearer.token())?;

    let user_id = claims.sub;
    let user = blocking(&state, move |s| Ok(s.db.get_user_by_id(&user_id.to_string())?))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(Identity {
        user_id,
        name: user.name,
    });
    Ok(next.run(req).await)
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, ApiError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized)?;

    Ok(token_data.claims)
}
