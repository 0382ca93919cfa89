use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::{
    application::usecases::plans::PlanUseCase,
    domain::{
        repositories::{plans::PlanRepository, users::UserRepository},
        value_objects::plans::{CreatePlanModel, UpdatePlanModel},
    },
    infrastructure::{
        axum_http::auth::AuthUser,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{plans::PlanPostgres, users::UserPostgres},
        },
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let plan_repository = Arc::new(PlanPostgres::new(Arc::clone(&db_pool)));
    let user_repository = Arc::new(UserPostgres::new(db_pool));
    let plan_usecase = PlanUseCase::new(plan_repository, user_repository);

    Router::new()
        .route("/", get(list).post(create))
        .route(
            "/:id",
            get(retrieve).put(update).patch(update).delete(remove),
        )
        .with_state(Arc::new(plan_usecase))
}

pub async fn list<P, U>(
    State(plan_usecase): State<Arc<PlanUseCase<P, U>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    match plan_usecase.list(auth.user_id).await {
        Ok(plans) => (StatusCode::OK, Json(plans)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn retrieve<P, U>(
    State(plan_usecase): State<Arc<PlanUseCase<P, U>>>,
    auth: AuthUser,
    Path(plan_id): Path<i64>,
) -> impl IntoResponse
where
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    match plan_usecase.retrieve(auth.user_id, plan_id).await {
        Ok(plan) => (StatusCode::OK, Json(plan)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn create<P, U>(
    State(plan_usecase): State<Arc<PlanUseCase<P, U>>>,
    auth: AuthUser,
    Json(create_plan_model): Json<CreatePlanModel>,
) -> impl IntoResponse
where
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    match plan_usecase.create(auth.user_id, create_plan_model).await {
        Ok(plan) => (StatusCode::CREATED, Json(plan)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn update<P, U>(
    State(plan_usecase): State<Arc<PlanUseCase<P, U>>>,
    auth: AuthUser,
    Path(plan_id): Path<i64>,
    Json(update_plan_model): Json<UpdatePlanModel>,
) -> impl IntoResponse
where
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    match plan_usecase
        .update(auth.user_id, plan_id, update_plan_model)
        .await
    {
        Ok(plan) => (StatusCode::OK, Json(plan)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn remove<P, U>(
    State(plan_usecase): State<Arc<PlanUseCase<P, U>>>,
    auth: AuthUser,
    Path(plan_id): Path<i64>,
) -> impl IntoResponse
where
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    match plan_usecase.delete(auth.user_id, plan_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}
