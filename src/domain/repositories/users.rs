use anyhow::Result;
use axum::async_trait;
use mockall::automock;

use crate::domain::entities::users::{EditUserEntity, RegisterUserEntity, UserEntity};

#[async_trait]
#[automock]
pub trait UserRepository {
    async fn register(&self, register_user_entity: RegisterUserEntity) -> Result<UserEntity>;
    async fn find_by_id(&self, user_id: i64) -> Result<Option<UserEntity>>;
    async fn find_by_username(&self, username: String) -> Result<Option<UserEntity>>;
    async fn list(&self) -> Result<Vec<UserEntity>>;
    async fn update_profile(
        &self,
        user_id: i64,
        edit_user_entity: EditUserEntity,
    ) -> Result<UserEntity>;
    async fn promote_to_superuser(&self, user_id: i64) -> Result<UserEntity>;
    async fn delete(&self, user_id: i64) -> Result<()>;
}
