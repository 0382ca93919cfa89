use diesel::prelude::*;

use crate::infrastructure::postgres::schema::{plan_features, plans};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = plans)]
pub struct PlanEntity {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = plans)]
pub struct InsertPlanEntity {
    pub name: String,
}

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = plan_features)]
pub struct PlanFeatureEntity {
    pub id: i64,
    pub plan_id: i64,
    pub feature_id: i64,
    pub position: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = plan_features)]
pub struct InsertPlanFeatureEntity {
    pub plan_id: i64,
    pub feature_id: i64,
    pub position: i32,
}
