use anyhow::Result;
use axum::async_trait;
use mockall::automock;

use crate::domain::entities::{
    features::FeatureEntity,
    plans::{InsertPlanEntity, PlanEntity},
};

#[async_trait]
#[automock]
pub trait PlanRepository {
    async fn create(&self, insert_plan_entity: InsertPlanEntity, feature_ids: Vec<i64>)
    -> Result<i64>;
    async fn find_by_id(&self, plan_id: i64) -> Result<Option<PlanEntity>>;
    async fn find_by_ids(&self, plan_ids: Vec<i64>) -> Result<Vec<PlanEntity>>;
    async fn list(&self) -> Result<Vec<PlanEntity>>;
    /// Features of the given plans as (plan_id, feature) pairs, ordered by
    /// plan and then by the position the plan lists them in.
    async fn list_features(&self, plan_ids: Vec<i64>) -> Result<Vec<(i64, FeatureEntity)>>;
    async fn update(
        &self,
        plan_id: i64,
        name: Option<String>,
        feature_ids: Option<Vec<i64>>,
    ) -> Result<()>;
    async fn delete(&self, plan_id: i64) -> Result<()>;
}
