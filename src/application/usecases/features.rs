use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    application::{
        access_control::{CatalogAction, CatalogPolicy, ensure, resolve_caller},
        usecases::error::{UseCaseError, UseCaseResult, is_unique_violation},
    },
    domain::{
        entities::features::FeatureEntity,
        repositories::{features::FeatureRepository, users::UserRepository},
        value_objects::features::{FeatureModel, UpsertFeatureModel},
    },
};

const NAME_TAKEN: &str = "A feature with that name already exists.";
const NOT_FOUND: &str = "Not found.";

pub struct FeatureUseCase<F, U>
where
    F: FeatureRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    feature_repo: Arc<F>,
    user_repo: Arc<U>,
}

impl<F, U> FeatureUseCase<F, U>
where
    F: FeatureRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(feature_repo: Arc<F>, user_repo: Arc<U>) -> Self {
        Self {
            feature_repo,
            user_repo,
        }
    }

    pub async fn list(&self, auth_user_id: i64) -> UseCaseResult<Vec<FeatureModel>> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;
        ensure::<CatalogPolicy>(&caller, CatalogAction::Read)?;

        let features = self.feature_repo.list().await.map_err(|err| {
            error!(db_error = ?err, "features: failed to list features");
            UseCaseError::Internal(err)
        })?;

        Ok(features.into_iter().map(FeatureModel::from).collect())
    }

    pub async fn retrieve(&self, auth_user_id: i64, feature_id: i64) -> UseCaseResult<FeatureModel> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;
        ensure::<CatalogPolicy>(&caller, CatalogAction::Read)?;

        let feature = self.find_existing(feature_id).await?;
        Ok(FeatureModel::from(feature))
    }

    pub async fn create(
        &self,
        auth_user_id: i64,
        upsert_feature_model: UpsertFeatureModel,
    ) -> UseCaseResult<FeatureModel> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;
        ensure::<CatalogPolicy>(&caller, CatalogAction::Write)?;
        validate_name(&upsert_feature_model.name)?;

        let feature_id = match self
            .feature_repo
            .create(upsert_feature_model.to_entity())
            .await
        {
            Ok(feature_id) => feature_id,
            Err(err) if is_unique_violation(&err) => {
                warn!(name = %upsert_feature_model.name, "features: duplicate feature name");
                return Err(UseCaseError::Validation(NAME_TAKEN.to_string()));
            }
            Err(err) => {
                error!(db_error = ?err, "features: failed to create feature");
                return Err(UseCaseError::Internal(err));
            }
        };

        info!(%feature_id, "features: feature created");
        Ok(FeatureModel {
            id: feature_id,
            name: upsert_feature_model.name,
        })
    }

    pub async fn update(
        &self,
        auth_user_id: i64,
        feature_id: i64,
        upsert_feature_model: UpsertFeatureModel,
    ) -> UseCaseResult<FeatureModel> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;
        ensure::<CatalogPolicy>(&caller, CatalogAction::Write)?;
        self.find_existing(feature_id).await?;
        validate_name(&upsert_feature_model.name)?;

        match self
            .feature_repo
            .rename(feature_id, upsert_feature_model.name.clone())
            .await
        {
            Ok(()) => {}
            Err(err) if is_unique_violation(&err) => {
                warn!(name = %upsert_feature_model.name, "features: duplicate feature name");
                return Err(UseCaseError::Validation(NAME_TAKEN.to_string()));
            }
            Err(err) => {
                error!(%feature_id, db_error = ?err, "features: failed to rename feature");
                return Err(UseCaseError::Internal(err));
            }
        }

        info!(%feature_id, "features: feature renamed");
        Ok(FeatureModel {
            id: feature_id,
            name: upsert_feature_model.name,
        })
    }

    pub async fn delete(&self, auth_user_id: i64, feature_id: i64) -> UseCaseResult<()> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;
        ensure::<CatalogPolicy>(&caller, CatalogAction::Write)?;
        self.find_existing(feature_id).await?;

        self.feature_repo.delete(feature_id).await.map_err(|err| {
            error!(%feature_id, db_error = ?err, "features: failed to delete feature");
            UseCaseError::Internal(err)
        })?;

        info!(%feature_id, "features: feature deleted");
        Ok(())
    }

    async fn find_existing(&self, feature_id: i64) -> UseCaseResult<FeatureEntity> {
        let feature = self
            .feature_repo
            .find_by_id(feature_id)
            .await
            .map_err(|err| {
                error!(%feature_id, db_error = ?err, "features: failed to load feature");
                UseCaseError::Internal(err)
            })?;

        feature.ok_or_else(|| UseCaseError::NotFound(NOT_FOUND.to_string()))
    }
}

fn validate_name(name: &str) -> UseCaseResult<()> {
    if name.trim().is_empty() {
        return Err(UseCaseError::Validation(
            "Name may not be blank.".to_string(),
        ));
    }
    Ok(())
}
