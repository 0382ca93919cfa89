use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::subscriptions::{InsertSubscriptionEntity, SubscriptionEntity},
    value_objects::plans::PlanModel,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionModel {
    pub id: i64,
    pub plan: PlanModel,
    pub start_date: DateTime<Utc>,
    pub is_active: bool,
}

impl SubscriptionModel {
    pub fn from_entity(entity: SubscriptionEntity, plan: PlanModel) -> Self {
        Self {
            id: entity.id,
            plan,
            start_date: entity.start_date,
            is_active: entity.is_active,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionModel {
    pub plan_id: i64,
}

impl CreateSubscriptionModel {
    pub fn to_entity(&self, user_id: i64) -> InsertSubscriptionEntity {
        InsertSubscriptionEntity {
            user_id,
            plan_id: self.plan_id,
            start_date: Utc::now(),
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePlanModel {
    pub plan_id: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeactivateSubscriptionModel {
    pub status: String,
}
