use std::sync::Arc;

use anyhow::Result;
use axum::async_trait;
use diesel::{Connection, OptionalExtension, insert_into, prelude::*, update};

use crate::{
    domain::{
        entities::{
            features::FeatureEntity,
            plans::{InsertPlanEntity, InsertPlanFeatureEntity, PlanEntity},
        },
        repositories::plans::PlanRepository,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{features, plan_features, plans},
    },
};

pub struct PlanPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PlanPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn feature_rows(plan_id: i64, feature_ids: &[i64]) -> Vec<InsertPlanFeatureEntity> {
    feature_ids
        .iter()
        .zip(0i32..)
        .map(|(feature_id, position)| InsertPlanFeatureEntity {
            plan_id,
            feature_id: *feature_id,
            position,
        })
        .collect()
}

#[async_trait]
impl PlanRepository for PlanPostgres {
    async fn create(
        &self,
        insert_plan_entity: InsertPlanEntity,
        feature_ids: Vec<i64>,
    ) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<i64, diesel::result::Error, _>(|tx| {
            let plan_id = insert_into(plans::table)
                .values(&insert_plan_entity)
                .returning(plans::id)
                .get_result::<i64>(tx)?;

            insert_into(plan_features::table)
                .values(&feature_rows(plan_id, &feature_ids))
                .execute(tx)?;

            Ok(plan_id)
        })?;

        Ok(result)
    }

    async fn find_by_id(&self, plan_id: i64) -> Result<Option<PlanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = plans::table
            .find(plan_id)
            .select(PlanEntity::as_select())
            .first::<PlanEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_ids(&self, plan_ids: Vec<i64>) -> Result<Vec<PlanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = plans::table
            .filter(plans::id.eq_any(&plan_ids))
            .select(PlanEntity::as_select())
            .order(plans::id.asc())
            .load::<PlanEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list(&self) -> Result<Vec<PlanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = plans::table
            .select(PlanEntity::as_select())
            .order(plans::id.asc())
            .load::<PlanEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_features(&self, plan_ids: Vec<i64>) -> Result<Vec<(i64, FeatureEntity)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = plan_features::table
            .inner_join(features::table.on(plan_features::feature_id.eq(features::id)))
            .filter(plan_features::plan_id.eq_any(&plan_ids))
            .select((plan_features::plan_id, FeatureEntity::as_select()))
            .order((plan_features::plan_id.asc(), plan_features::position.asc()))
            .load::<(i64, FeatureEntity)>(&mut conn)?;

        Ok(results)
    }

    async fn update(
        &self,
        plan_id: i64,
        name: Option<String>,
        feature_ids: Option<Vec<i64>>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        conn.transaction::<(), diesel::result::Error, _>(|tx| {
            if let Some(name) = name {
                update(plans::table.find(plan_id))
                    .set(plans::name.eq(&name))
                    .execute(tx)?;
            }

            // The feature set is replaced wholesale, old rows first so the
            // new positions start from zero.
            if let Some(feature_ids) = feature_ids {
                diesel::delete(plan_features::table.filter(plan_features::plan_id.eq(plan_id)))
                    .execute(tx)?;

                insert_into(plan_features::table)
                    .values(&feature_rows(plan_id, &feature_ids))
                    .execute(tx)?;
            }

            Ok(())
        })?;

        Ok(())
    }

    async fn delete(&self, plan_id: i64) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        diesel::delete(plans::table.find(plan_id)).execute(&mut conn)?;

        Ok(())
    }
}
