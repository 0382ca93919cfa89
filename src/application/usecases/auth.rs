use std::sync::Arc;

use anyhow::{Result, anyhow};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{
    application::{
        password_hasher,
        usecases::error::{UseCaseError, UseCaseResult},
    },
    config::config_model::TokenSecret,
    domain::{
        repositories::users::UserRepository,
        value_objects::iam::{AccessTokenModel, LoginModel, RefreshTokenModel, TokenPairModel},
    },
};

const INVALID_CREDENTIALS: &str = "No active account found with the given credentials";
const INVALID_TOKEN: &str = "Token is invalid or expired";

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

pub fn issue_token(user_id: i64, secret: &str, ttl_seconds: i64) -> Result<String> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: user_id.to_string(),
        exp: (now + Duration::seconds(ttl_seconds)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| anyhow!("Failed to sign token: {}", err))
}

pub fn verify_token(token: &str, secret: &str) -> Result<TokenClaims> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(jsonwebtoken::Algorithm::HS256);

    let token_data = decode::<TokenClaims>(token, &decoding_key, &validation)
        .map_err(|err| anyhow!("JWT validation failed: {}", err))?;

    Ok(token_data.claims)
}

pub struct AuthUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    token_secret: TokenSecret,
}

impl<U> AuthUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, token_secret: TokenSecret) -> Self {
        Self {
            user_repo,
            token_secret,
        }
    }

    pub async fn login(&self, login_model: LoginModel) -> UseCaseResult<TokenPairModel> {
        info!(username = %login_model.username, "auth: login requested");

        let user = self
            .user_repo
            .find_by_username(login_model.username.clone())
            .await
            .map_err(|err| {
                error!(db_error = ?err, "auth: failed to look up account");
                UseCaseError::Internal(err)
            })?;

        let Some(user) = user else {
            warn!(username = %login_model.username, "auth: unknown username");
            return Err(UseCaseError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let password_matches = password_hasher::verify(&login_model.password, &user.password_hash)
            .map_err(|err| {
                error!(user_id = %user.id, error = ?err, "auth: password verification failed");
                UseCaseError::Internal(err)
            })?;

        if !password_matches {
            warn!(user_id = %user.id, "auth: password mismatch");
            return Err(UseCaseError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let access = issue_token(
            user.id,
            &self.token_secret.secret,
            self.token_secret.access_ttl_seconds,
        )?;
        let refresh = issue_token(
            user.id,
            &self.token_secret.refresh_secret,
            self.token_secret.refresh_ttl_seconds,
        )?;

        info!(user_id = %user.id, "auth: login succeeded");
        Ok(TokenPairModel { access, refresh })
    }

    pub async fn refresh(
        &self,
        refresh_token_model: RefreshTokenModel,
    ) -> UseCaseResult<AccessTokenModel> {
        let claims = verify_token(&refresh_token_model.refresh, &self.token_secret.refresh_secret)
            .map_err(|err| {
                warn!(reason = %err, "auth: refresh token rejected");
                UseCaseError::Unauthorized(INVALID_TOKEN.to_string())
            })?;

        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| UseCaseError::Unauthorized(INVALID_TOKEN.to_string()))?;

        let access = issue_token(
            user_id,
            &self.token_secret.secret,
            self.token_secret.access_ttl_seconds,
        )?;

        info!(%user_id, "auth: access token refreshed");
        Ok(AccessTokenModel { access })
    }
}
