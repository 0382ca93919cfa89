use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::{
        features::FeatureEntity,
        plans::{InsertPlanEntity, PlanEntity},
    },
    value_objects::features::FeatureModel,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanModel {
    pub id: i64,
    pub name: String,
    pub features: Vec<FeatureModel>,
}

impl PlanModel {
    /// Joins plans with their (plan_id, feature) rows. The feature rows must
    /// already be ordered by position within each plan; that order is kept.
    pub fn assemble(plans: Vec<PlanEntity>, features: Vec<(i64, FeatureEntity)>) -> Vec<PlanModel> {
        let mut features_by_plan: HashMap<i64, Vec<FeatureModel>> = HashMap::new();
        for (plan_id, feature) in features {
            features_by_plan
                .entry(plan_id)
                .or_default()
                .push(FeatureModel::from(feature));
        }

        plans
            .into_iter()
            .map(|plan| {
                let features = features_by_plan.remove(&plan.id).unwrap_or_default();
                PlanModel {
                    id: plan.id,
                    name: plan.name,
                    features,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanModel {
    pub name: String,
    #[serde(default)]
    pub feature_ids: Vec<i64>,
}

impl CreatePlanModel {
    pub fn to_entity(&self) -> InsertPlanEntity {
        InsertPlanEntity {
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePlanModel {
    pub name: Option<String>,
    pub feature_ids: Option<Vec<i64>>,
}
