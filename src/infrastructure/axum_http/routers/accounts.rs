use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    application::usecases::{auth::AuthUseCase, users::UserUseCase},
    config::config_loader,
    domain::{
        repositories::users::UserRepository,
        value_objects::iam::{LoginModel, RefreshTokenModel, RegisterUserModel, UpdateUserModel},
    },
    infrastructure::{
        axum_http::auth::AuthUser,
        postgres::{postgres_connection::PgPoolSquad, repositories::users::UserPostgres},
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let user_repository = Arc::new(UserPostgres::new(Arc::clone(&db_pool)));
    let user_usecase = UserUseCase::new(Arc::clone(&user_repository));

    let token_secret = config_loader::get_token_secret().expect("JWT secrets are not configured");
    let auth_usecase = AuthUseCase::new(user_repository, token_secret);

    let accounts = Router::new()
        .route("/", post(register).get(list))
        .route("/me", get(me).put(update_me).patch(update_me))
        .route(
            "/:id",
            get(retrieve).put(update).patch(update).delete(remove),
        )
        .route("/:id/promote", post(promote))
        .with_state(Arc::new(user_usecase));

    let tokens = Router::new()
        .route("/login", post(login))
        .route("/token/refresh", post(refresh))
        .with_state(Arc::new(auth_usecase));

    accounts.merge(tokens)
}

pub async fn register<U>(
    State(user_usecase): State<Arc<UserUseCase<U>>>,
    Json(register_user_model): Json<RegisterUserModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    match user_usecase.register(register_user_model).await {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn list<U>(
    State(user_usecase): State<Arc<UserUseCase<U>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    match user_usecase.list(auth.user_id).await {
        Ok(users) => (StatusCode::OK, Json(users)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn me<U>(
    State(user_usecase): State<Arc<UserUseCase<U>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    match user_usecase.me(auth.user_id).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn update_me<U>(
    State(user_usecase): State<Arc<UserUseCase<U>>>,
    auth: AuthUser,
    Json(update_user_model): Json<UpdateUserModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    match user_usecase.update_me(auth.user_id, update_user_model).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn retrieve<U>(
    State(user_usecase): State<Arc<UserUseCase<U>>>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    match user_usecase.retrieve(auth.user_id, user_id).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn update<U>(
    State(user_usecase): State<Arc<UserUseCase<U>>>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
    Json(update_user_model): Json<UpdateUserModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    match user_usecase
        .update(auth.user_id, user_id, update_user_model)
        .await
    {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn remove<U>(
    State(user_usecase): State<Arc<UserUseCase<U>>>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    match user_usecase.delete(auth.user_id, user_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn promote<U>(
    State(user_usecase): State<Arc<UserUseCase<U>>>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    match user_usecase.promote(auth.user_id, user_id).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn login<U>(
    State(auth_usecase): State<Arc<AuthUseCase<U>>>,
    Json(login_model): Json<LoginModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    match auth_usecase.login(login_model).await {
        Ok(tokens) => (StatusCode::OK, Json(tokens)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn refresh<U>(
    State(auth_usecase): State<Arc<AuthUseCase<U>>>,
    Json(refresh_token_model): Json<RefreshTokenModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
{
    match auth_usecase.refresh(refresh_token_model).await {
        Ok(token) => (StatusCode::OK, Json(token)).into_response(),
        Err(err) => err.into_response(),
    }
}
