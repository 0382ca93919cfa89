use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    application::{
        access_control::{CatalogAction, CatalogPolicy, ensure, resolve_caller},
        usecases::error::{
            UseCaseError, UseCaseResult, is_foreign_key_violation, is_unique_violation,
        },
    },
    domain::{
        repositories::{plans::PlanRepository, users::UserRepository},
        value_objects::plans::{CreatePlanModel, PlanModel, UpdatePlanModel},
    },
};

const NAME_TAKEN: &str = "A plan with that name already exists.";
const UNKNOWN_FEATURE: &str = "One or more feature ids do not exist.";
const NOT_FOUND: &str = "Not found.";

pub struct PlanUseCase<P, U>
where
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    plan_repo: Arc<P>,
    user_repo: Arc<U>,
}

impl<P, U> PlanUseCase<P, U>
where
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(plan_repo: Arc<P>, user_repo: Arc<U>) -> Self {
        Self {
            plan_repo,
            user_repo,
        }
    }

    pub async fn list(&self, auth_user_id: i64) -> UseCaseResult<Vec<PlanModel>> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;
        ensure::<CatalogPolicy>(&caller, CatalogAction::Read)?;

        let plans = self.plan_repo.list().await.map_err(|err| {
            error!(db_error = ?err, "plans: failed to list plans");
            UseCaseError::Internal(err)
        })?;

        let plan_ids: Vec<i64> = plans.iter().map(|plan| plan.id).collect();
        let features = self
            .plan_repo
            .list_features(plan_ids)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "plans: failed to load plan features");
                UseCaseError::Internal(err)
            })?;

        Ok(PlanModel::assemble(plans, features))
    }

    pub async fn retrieve(&self, auth_user_id: i64, plan_id: i64) -> UseCaseResult<PlanModel> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;
        ensure::<CatalogPolicy>(&caller, CatalogAction::Read)?;

        self.load_plan(plan_id).await
    }

    pub async fn create(
        &self,
        auth_user_id: i64,
        create_plan_model: CreatePlanModel,
    ) -> UseCaseResult<PlanModel> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;
        ensure::<CatalogPolicy>(&caller, CatalogAction::Write)?;
        validate_name(&create_plan_model.name)?;

        let feature_ids = dedupe_ids(create_plan_model.feature_ids.clone());

        let plan_id = match self
            .plan_repo
            .create(create_plan_model.to_entity(), feature_ids)
            .await
        {
            Ok(plan_id) => plan_id,
            Err(err) => return Err(map_write_error(err, &create_plan_model.name)),
        };

        info!(%plan_id, "plans: plan created");
        self.load_plan(plan_id).await
    }

    pub async fn update(
        &self,
        auth_user_id: i64,
        plan_id: i64,
        update_plan_model: UpdatePlanModel,
    ) -> UseCaseResult<PlanModel> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;
        ensure::<CatalogPolicy>(&caller, CatalogAction::Write)?;
        self.find_existing(plan_id).await?;

        if let Some(name) = update_plan_model.name.as_deref() {
            validate_name(name)?;
        }

        let feature_ids = update_plan_model.feature_ids.clone().map(dedupe_ids);

        if let Err(err) = self
            .plan_repo
            .update(plan_id, update_plan_model.name.clone(), feature_ids)
            .await
        {
            let name = update_plan_model.name.as_deref().unwrap_or_default();
            return Err(map_write_error(err, name));
        }

        info!(%plan_id, "plans: plan updated");
        self.load_plan(plan_id).await
    }

    pub async fn delete(&self, auth_user_id: i64, plan_id: i64) -> UseCaseResult<()> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;
        ensure::<CatalogPolicy>(&caller, CatalogAction::Write)?;
        self.find_existing(plan_id).await?;

        self.plan_repo.delete(plan_id).await.map_err(|err| {
            error!(%plan_id, db_error = ?err, "plans: failed to delete plan");
            UseCaseError::Internal(err)
        })?;

        info!(%plan_id, "plans: plan deleted");
        Ok(())
    }

    async fn find_existing(&self, plan_id: i64) -> UseCaseResult<()> {
        let plan = self.plan_repo.find_by_id(plan_id).await.map_err(|err| {
            error!(%plan_id, db_error = ?err, "plans: failed to load plan");
            UseCaseError::Internal(err)
        })?;

        match plan {
            Some(_) => Ok(()),
            None => Err(UseCaseError::NotFound(NOT_FOUND.to_string())),
        }
    }

    async fn load_plan(&self, plan_id: i64) -> UseCaseResult<PlanModel> {
        let plan = self
            .plan_repo
            .find_by_id(plan_id)
            .await
            .map_err(|err| {
                error!(%plan_id, db_error = ?err, "plans: failed to load plan");
                UseCaseError::Internal(err)
            })?
            .ok_or_else(|| UseCaseError::NotFound(NOT_FOUND.to_string()))?;

        let features = self
            .plan_repo
            .list_features(vec![plan_id])
            .await
            .map_err(|err| {
                error!(%plan_id, db_error = ?err, "plans: failed to load plan features");
                UseCaseError::Internal(err)
            })?;

        let mut models = PlanModel::assemble(vec![plan], features);
        models
            .pop()
            .ok_or_else(|| UseCaseError::Internal(anyhow::anyhow!("assembled plan set is empty")))
    }
}

/// Drops repeated ids while keeping the first occurrence's position, so a
/// sloppy request body cannot trip the (plan_id, feature_id) uniqueness rule.
fn dedupe_ids(feature_ids: Vec<i64>) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    feature_ids
        .into_iter()
        .filter(|feature_id| seen.insert(*feature_id))
        .collect()
}

fn validate_name(name: &str) -> UseCaseResult<()> {
    if name.trim().is_empty() {
        return Err(UseCaseError::Validation(
            "Name may not be blank.".to_string(),
        ));
    }
    Ok(())
}

fn map_write_error(err: anyhow::Error, name: &str) -> UseCaseError {
    if is_unique_violation(&err) {
        warn!(%name, "plans: duplicate plan name");
        return UseCaseError::Validation(NAME_TAKEN.to_string());
    }
    if is_foreign_key_violation(&err) {
        warn!("plans: feature list references unknown feature");
        return UseCaseError::Validation(UNKNOWN_FEATURE.to_string());
    }
    error!(db_error = ?err, "plans: failed to write plan");
    UseCaseError::Internal(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::Utc;
    use mockall::predicate::eq;

    use crate::domain::{
        entities::{features::FeatureEntity, plans::PlanEntity, users::UserEntity},
        repositories::{plans::MockPlanRepository, users::MockUserRepository},
    };

    fn sample_user(id: i64, is_staff: bool) -> UserEntity {
        let now = Utc::now();
        UserEntity {
            id,
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            is_staff,
            is_superuser: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn expect_caller(user_repo: &mut MockUserRepository, caller: UserEntity) {
        let id = caller.id;
        user_repo
            .expect_find_by_id()
            .with(eq(id))
            .returning(move |_| {
                let caller = caller.clone();
                Box::pin(async move { Ok(Some(caller)) })
            });
    }

    fn feature(id: i64, name: &str) -> FeatureEntity {
        FeatureEntity {
            id,
            name: name.to_string(),
        }
    }

    fn plan(id: i64, name: &str) -> PlanEntity {
        PlanEntity {
            id,
            name: name.to_string(),
        }
    }

    fn foreign_key_violation() -> anyhow::Error {
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::ForeignKeyViolation,
            Box::new("violates foreign key constraint".to_string()),
        )
        .into()
    }

    fn unique_violation() -> anyhow::Error {
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_string()),
        )
        .into()
    }

    #[tokio::test]
    async fn create_keeps_the_requested_feature_order() {
        let mut plan_repo = MockPlanRepository::new();
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(1, true));
        plan_repo
            .expect_create()
            .withf(|entity, feature_ids| entity.name == "Pro" && *feature_ids == vec![5, 3])
            .returning(|_, _| Box::pin(async { Ok(7) }));
        plan_repo
            .expect_find_by_id()
            .with(eq(7))
            .returning(|_| Box::pin(async { Ok(Some(plan(7, "Pro"))) }));
        plan_repo
            .expect_list_features()
            .with(eq(vec![7i64]))
            .returning(|_| {
                Box::pin(async {
                    Ok(vec![(7, feature(5, "Downloads")), (7, feature(3, "HD"))])
                })
            });

        let usecase = PlanUseCase::new(Arc::new(plan_repo), Arc::new(user_repo));

        let plan = usecase
            .create(
                1,
                CreatePlanModel {
                    name: "Pro".to_string(),
                    feature_ids: vec![5, 3],
                },
            )
            .await
            .unwrap();

        let ids: Vec<i64> = plan.features.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![5, 3]);
    }

    #[tokio::test]
    async fn create_dedupes_repeated_feature_ids() {
        let mut plan_repo = MockPlanRepository::new();
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(1, true));
        plan_repo
            .expect_create()
            .withf(|_, feature_ids| *feature_ids == vec![3, 5])
            .returning(|_, _| Box::pin(async { Ok(7) }));
        plan_repo
            .expect_find_by_id()
            .with(eq(7))
            .returning(|_| Box::pin(async { Ok(Some(plan(7, "Pro"))) }));
        plan_repo
            .expect_list_features()
            .returning(|_| Box::pin(async { Ok(vec![]) }));

        let usecase = PlanUseCase::new(Arc::new(plan_repo), Arc::new(user_repo));

        let result = usecase
            .create(
                1,
                CreatePlanModel {
                    name: "Pro".to_string(),
                    feature_ids: vec![3, 3, 5, 3],
                },
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn create_requires_admin() {
        let plan_repo = MockPlanRepository::new();
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(2, false));

        let usecase = PlanUseCase::new(Arc::new(plan_repo), Arc::new(user_repo));

        let err = usecase
            .create(
                2,
                CreatePlanModel {
                    name: "Pro".to_string(),
                    feature_ids: vec![],
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn create_maps_unknown_feature_to_validation_error() {
        let mut plan_repo = MockPlanRepository::new();
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(1, true));
        plan_repo
            .expect_create()
            .returning(|_, _| Box::pin(async { Err(foreign_key_violation()) }));

        let usecase = PlanUseCase::new(Arc::new(plan_repo), Arc::new(user_repo));

        let err = usecase
            .create(
                1,
                CreatePlanModel {
                    name: "Pro".to_string(),
                    feature_ids: vec![999],
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), UNKNOWN_FEATURE);
    }

    #[tokio::test]
    async fn create_maps_duplicate_name_to_validation_error() {
        let mut plan_repo = MockPlanRepository::new();
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(1, true));
        plan_repo
            .expect_create()
            .returning(|_, _| Box::pin(async { Err(unique_violation()) }));

        let usecase = PlanUseCase::new(Arc::new(plan_repo), Arc::new(user_repo));

        let err = usecase
            .create(
                1,
                CreatePlanModel {
                    name: "Pro".to_string(),
                    feature_ids: vec![],
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), NAME_TAKEN);
    }

    #[tokio::test]
    async fn update_replaces_the_feature_set_wholesale() {
        let mut plan_repo = MockPlanRepository::new();
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(1, true));
        plan_repo
            .expect_find_by_id()
            .with(eq(7))
            .returning(|_| Box::pin(async { Ok(Some(plan(7, "Pro"))) }));
        plan_repo
            .expect_update()
            .withf(|plan_id, name, feature_ids| {
                *plan_id == 7 && name.is_none() && *feature_ids == Some(vec![11])
            })
            .returning(|_, _, _| Box::pin(async { Ok(()) }));
        plan_repo
            .expect_list_features()
            .with(eq(vec![7i64]))
            .returning(|_| Box::pin(async { Ok(vec![(7, feature(11, "Offline"))]) }));

        let usecase = PlanUseCase::new(Arc::new(plan_repo), Arc::new(user_repo));

        let plan = usecase
            .update(
                1,
                7,
                UpdatePlanModel {
                    name: None,
                    feature_ids: Some(vec![11]),
                },
            )
            .await
            .unwrap();

        let ids: Vec<i64> = plan.features.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![11]);
    }

    #[tokio::test]
    async fn update_missing_plan_is_not_found() {
        let mut plan_repo = MockPlanRepository::new();
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(1, true));
        plan_repo
            .expect_find_by_id()
            .with(eq(99))
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = PlanUseCase::new(Arc::new(plan_repo), Arc::new(user_repo));

        let err = usecase
            .update(
                1,
                99,
                UpdatePlanModel {
                    name: Some("Pro".to_string()),
                    feature_ids: None,
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_nests_features_under_each_plan() {
        let mut plan_repo = MockPlanRepository::new();
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(2, false));
        plan_repo
            .expect_list()
            .returning(|| Box::pin(async { Ok(vec![plan(1, "Basic"), plan(2, "Pro")]) }));
        plan_repo
            .expect_list_features()
            .with(eq(vec![1i64, 2]))
            .returning(|_| {
                Box::pin(async {
                    Ok(vec![
                        (1, feature(10, "HD")),
                        (2, feature(10, "HD")),
                        (2, feature(11, "4K")),
                    ])
                })
            });

        let usecase = PlanUseCase::new(Arc::new(plan_repo), Arc::new(user_repo));

        let plans = usecase.list(2).await.unwrap();

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].features.len(), 1);
        assert_eq!(plans[1].features.len(), 2);
    }

    #[tokio::test]
    async fn retrieve_missing_plan_is_not_found() {
        let mut plan_repo = MockPlanRepository::new();
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(2, false));
        plan_repo
            .expect_find_by_id()
            .with(eq(99))
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = PlanUseCase::new(Arc::new(plan_repo), Arc::new(user_repo));

        let err = usecase.retrieve(2, 99).await.unwrap_err();

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_requires_admin() {
        let plan_repo = MockPlanRepository::new();
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(2, false));

        let usecase = PlanUseCase::new(Arc::new(plan_repo), Arc::new(user_repo));

        let err = usecase.delete(2, 7).await.unwrap_err();

        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_deletes_a_plan() {
        let mut plan_repo = MockPlanRepository::new();
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(1, true));
        plan_repo
            .expect_find_by_id()
            .with(eq(7))
            .returning(|_| Box::pin(async { Ok(Some(plan(7, "Pro"))) }));
        plan_repo
            .expect_delete()
            .with(eq(7))
            .returning(|_| Box::pin(async { Ok(()) }));

        let usecase = PlanUseCase::new(Arc::new(plan_repo), Arc::new(user_repo));

        assert!(usecase.delete(1, 7).await.is_ok());
    }
}
