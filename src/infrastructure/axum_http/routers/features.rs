use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::{
    application::usecases::features::FeatureUseCase,
    domain::{
        repositories::{features::FeatureRepository, users::UserRepository},
        value_objects::features::UpsertFeatureModel,
    },
    infrastructure::{
        axum_http::auth::AuthUser,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{features::FeaturePostgres, users::UserPostgres},
        },
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let feature_repository = Arc::new(FeaturePostgres::new(Arc::clone(&db_pool)));
    let user_repository = Arc::new(UserPostgres::new(db_pool));
    let feature_usecase = FeatureUseCase::new(feature_repository, user_repository);

    Router::new()
        .route("/", get(list).post(create))
        .route(
            "/:id",
            get(retrieve).put(update).patch(update).delete(remove),
        )
        .with_state(Arc::new(feature_usecase))
}

pub async fn list<F, U>(
    State(feature_usecase): State<Arc<FeatureUseCase<F, U>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    F: FeatureRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    match feature_usecase.list(auth.user_id).await {
        Ok(features) => (StatusCode::OK, Json(features)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn retrieve<F, U>(
    State(feature_usecase): State<Arc<FeatureUseCase<F, U>>>,
    auth: AuthUser,
    Path(feature_id): Path<i64>,
) -> impl IntoResponse
where
    F: FeatureRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    match feature_usecase.retrieve(auth.user_id, feature_id).await {
        Ok(feature) => (StatusCode::OK, Json(feature)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn create<F, U>(
    State(feature_usecase): State<Arc<FeatureUseCase<F, U>>>,
    auth: AuthUser,
    Json(upsert_feature_model): Json<UpsertFeatureModel>,
) -> impl IntoResponse
where
    F: FeatureRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    match feature_usecase
        .create(auth.user_id, upsert_feature_model)
        .await
    {
        Ok(feature) => (StatusCode::CREATED, Json(feature)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn update<F, U>(
    State(feature_usecase): State<Arc<FeatureUseCase<F, U>>>,
    auth: AuthUser,
    Path(feature_id): Path<i64>,
    Json(upsert_feature_model): Json<UpsertFeatureModel>,
) -> impl IntoResponse
where
    F: FeatureRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    match feature_usecase
        .update(auth.user_id, feature_id, upsert_feature_model)
        .await
    {
        Ok(feature) => (StatusCode::OK, Json(feature)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn remove<F, U>(
    State(feature_usecase): State<Arc<FeatureUseCase<F, U>>>,
    auth: AuthUser,
    Path(feature_id): Path<i64>,
) -> impl IntoResponse
where
    F: FeatureRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    match feature_usecase.delete(auth.user_id, feature_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}
