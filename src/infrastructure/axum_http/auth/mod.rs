use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{
    application::usecases::{auth::verify_token, error::UseCaseError},
    config::config_loader,
};

const MISSING_CREDENTIALS: &str = "Authentication credentials were not provided.";
const INVALID_TOKEN: &str = "Token is invalid or expired";

/// Identity carried by a bearer token. Only the user id is trusted from the
/// token itself; role flags are re-read from the database by the usecases.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = UseCaseError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| UseCaseError::Unauthorized(MISSING_CREDENTIALS.to_string()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| UseCaseError::Unauthorized(MISSING_CREDENTIALS.to_string()))?;

        if !auth_str.starts_with("Bearer ") {
            return Err(UseCaseError::Unauthorized(MISSING_CREDENTIALS.to_string()));
        }

        let token = &auth_str[7..];

        let token_secret = config_loader::get_token_secret().map_err(UseCaseError::Internal)?;

        let claims = verify_token(token, &token_secret.secret)
            .map_err(|_| UseCaseError::Unauthorized(INVALID_TOKEN.to_string()))?;

        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| UseCaseError::Unauthorized(INVALID_TOKEN.to_string()))?;

        Ok(AuthUser { user_id })
    }
}

#[cfg(test)]
mod tests;
