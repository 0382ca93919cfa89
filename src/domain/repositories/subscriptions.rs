use anyhow::Result;
use axum::async_trait;
use mockall::automock;

use crate::domain::entities::subscriptions::{InsertSubscriptionEntity, SubscriptionEntity};

#[async_trait]
#[automock]
pub trait SubscriptionRepository {
    async fn create(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> Result<SubscriptionEntity>;
    async fn find_by_id(&self, subscription_id: i64) -> Result<Option<SubscriptionEntity>>;
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<SubscriptionEntity>>;
    async fn change_plan(&self, subscription_id: i64, plan_id: i64) -> Result<SubscriptionEntity>;
    async fn deactivate(&self, subscription_id: i64) -> Result<()>;
    async fn delete(&self, subscription_id: i64) -> Result<()>;
}
