use super::*;
use axum::http::{Request, StatusCode};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::env;

use crate::application::usecases::auth::TokenClaims;

const ACCESS_SECRET: &str = "accesssecretforunittesting123";
const REFRESH_SECRET: &str = "refreshsecretforunittesting123";

fn set_env_vars() {
    unsafe {
        env::set_var("JWT_ACCESS_SECRET", ACCESS_SECRET);
        env::set_var("JWT_REFRESH_SECRET", REFRESH_SECRET);
    }
}

fn make_token(sub: &str, exp: usize, secret: &str) -> String {
    let claims = TokenClaims {
        sub: sub.to_string(),
        exp,
        iat: 0,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

async fn extract(authorization: Option<String>) -> Result<AuthUser, UseCaseError> {
    let mut builder = Request::builder().uri("/accounts/me");
    if let Some(authorization) = authorization {
        builder = builder.header("Authorization", authorization);
    }
    let request = builder.body(()).unwrap();

    let (mut parts, _) = request.into_parts();
    AuthUser::from_request_parts(&mut parts, &()).await
}

#[tokio::test]
async fn bearer_token_resolves_to_a_user_id() {
    set_env_vars();
    let token = make_token("42", 9999999999, ACCESS_SECRET);

    let auth = extract(Some(format!("Bearer {}", token)))
        .await
        .expect("valid token should pass");

    assert_eq!(auth.user_id, 42);
}

#[tokio::test]
async fn missing_header_is_unauthorized() {
    set_env_vars();

    let err = extract(None).await.unwrap_err();

    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(err.to_string(), MISSING_CREDENTIALS);
}

#[tokio::test]
async fn non_bearer_scheme_is_unauthorized() {
    set_env_vars();

    let err = extract(Some("Basic dXNlcjpwYXNz".to_string()))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    set_env_vars();
    let token = make_token("42", 1, ACCESS_SECRET);

    let err = extract(Some(format!("Bearer {}", token))).await.unwrap_err();

    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(err.to_string(), INVALID_TOKEN);
}

#[tokio::test]
async fn refresh_token_does_not_pass_as_access_token() {
    set_env_vars();
    let token = make_token("42", 9999999999, REFRESH_SECRET);

    let err = extract(Some(format!("Bearer {}", token))).await.unwrap_err();

    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_numeric_subject_is_rejected() {
    set_env_vars();
    let token = make_token("not-a-number", 9999999999, ACCESS_SECRET);

    let err = extract(Some(format!("Bearer {}", token))).await.unwrap_err();

    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
}
