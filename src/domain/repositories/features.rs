use anyhow::Result;
use axum::async_trait;
use mockall::automock;

use crate::domain::entities::features::{FeatureEntity, InsertFeatureEntity};

#[async_trait]
#[automock]
pub trait FeatureRepository {
    async fn create(&self, insert_feature_entity: InsertFeatureEntity) -> Result<i64>;
    async fn find_by_id(&self, feature_id: i64) -> Result<Option<FeatureEntity>>;
    async fn list(&self) -> Result<Vec<FeatureEntity>>;
    async fn rename(&self, feature_id: i64, name: String) -> Result<()>;
    async fn delete(&self, feature_id: i64) -> Result<()>;
}
