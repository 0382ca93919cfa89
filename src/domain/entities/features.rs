use diesel::prelude::*;

use crate::infrastructure::postgres::schema::features;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = features)]
pub struct FeatureEntity {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = features)]
pub struct InsertFeatureEntity {
    pub name: String,
}
