use serde::{Deserialize, Serialize};

use crate::domain::entities::features::{FeatureEntity, InsertFeatureEntity};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureModel {
    pub id: i64,
    pub name: String,
}

impl From<FeatureEntity> for FeatureModel {
    fn from(entity: FeatureEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertFeatureModel {
    pub name: String,
}

impl UpsertFeatureModel {
    pub fn to_entity(&self) -> InsertFeatureEntity {
        InsertFeatureEntity {
            name: self.name.clone(),
        }
    }
}
