use std::sync::Arc;

use anyhow::Result;
use axum::async_trait;
use diesel::{OptionalExtension, insert_into, prelude::*, update};

use crate::{
    domain::{
        entities::features::{FeatureEntity, InsertFeatureEntity},
        repositories::features::FeatureRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::features},
};

pub struct FeaturePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl FeaturePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl FeatureRepository for FeaturePostgres {
    async fn create(&self, insert_feature_entity: InsertFeatureEntity) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(features::table)
            .values(&insert_feature_entity)
            .returning(features::id)
            .get_result::<i64>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_id(&self, feature_id: i64) -> Result<Option<FeatureEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = features::table
            .find(feature_id)
            .select(FeatureEntity::as_select())
            .first::<FeatureEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list(&self) -> Result<Vec<FeatureEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = features::table
            .select(FeatureEntity::as_select())
            .order(features::id.asc())
            .load::<FeatureEntity>(&mut conn)?;

        Ok(results)
    }

    async fn rename(&self, feature_id: i64, name: String) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(features::table.find(feature_id))
            .set(features::name.eq(&name))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn delete(&self, feature_id: i64) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        diesel::delete(features::table.find(feature_id)).execute(&mut conn)?;

        Ok(())
    }
}
