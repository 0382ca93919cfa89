use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    application::usecases::subscriptions::SubscriptionUseCase,
    domain::{
        repositories::{
            plans::PlanRepository, subscriptions::SubscriptionRepository, users::UserRepository,
        },
        value_objects::subscriptions::{ChangePlanModel, CreateSubscriptionModel},
    },
    infrastructure::{
        axum_http::auth::AuthUser,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                plans::PlanPostgres, subscriptions::SubscriptionPostgres, users::UserPostgres,
            },
        },
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let subscription_repository = Arc::new(SubscriptionPostgres::new(Arc::clone(&db_pool)));
    let plan_repository = Arc::new(PlanPostgres::new(Arc::clone(&db_pool)));
    let user_repository = Arc::new(UserPostgres::new(db_pool));
    let subscription_usecase =
        SubscriptionUseCase::new(subscription_repository, plan_repository, user_repository);

    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(retrieve).delete(remove))
        .route("/:id/change-plan", post(change_plan))
        .route("/:id/deactivate", post(deactivate))
        .with_state(Arc::new(subscription_usecase))
}

pub async fn list<S, P, U>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, P, U>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    match subscription_usecase.list(auth.user_id).await {
        Ok(subscriptions) => (StatusCode::OK, Json(subscriptions)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn retrieve<S, P, U>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, P, U>>>,
    auth: AuthUser,
    Path(subscription_id): Path<i64>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    match subscription_usecase
        .retrieve(auth.user_id, subscription_id)
        .await
    {
        Ok(subscription) => (StatusCode::OK, Json(subscription)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn create<S, P, U>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, P, U>>>,
    auth: AuthUser,
    Json(create_subscription_model): Json<CreateSubscriptionModel>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    match subscription_usecase
        .create(auth.user_id, create_subscription_model)
        .await
    {
        Ok(subscription) => (StatusCode::CREATED, Json(subscription)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn change_plan<S, P, U>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, P, U>>>,
    auth: AuthUser,
    Path(subscription_id): Path<i64>,
    Json(change_plan_model): Json<ChangePlanModel>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    match subscription_usecase
        .change_plan(auth.user_id, subscription_id, change_plan_model)
        .await
    {
        Ok(subscription) => (StatusCode::OK, Json(subscription)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn deactivate<S, P, U>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, P, U>>>,
    auth: AuthUser,
    Path(subscription_id): Path<i64>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    match subscription_usecase
        .deactivate(auth.user_id, subscription_id)
        .await
    {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn remove<S, P, U>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<S, P, U>>>,
    auth: AuthUser,
    Path(subscription_id): Path<i64>,
) -> impl IntoResponse
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    match subscription_usecase
        .delete(auth.user_id, subscription_id)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}
