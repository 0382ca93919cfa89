use std::{collections::HashMap, sync::Arc};

use anyhow::anyhow;
use tracing::{error, info, warn};

use crate::{
    application::{
        access_control::{SubscriptionAction, SubscriptionPolicy, ensure, resolve_caller},
        usecases::error::{
            UseCaseError, UseCaseResult, is_foreign_key_violation, is_unique_violation,
        },
    },
    domain::{
        entities::subscriptions::SubscriptionEntity,
        repositories::{
            plans::PlanRepository, subscriptions::SubscriptionRepository, users::UserRepository,
        },
        value_objects::{
            plans::PlanModel,
            subscriptions::{
                ChangePlanModel, CreateSubscriptionModel, DeactivateSubscriptionModel,
                SubscriptionModel,
            },
        },
    },
};

const ACTIVE_EXISTS: &str = "An active subscription already exists for this user.";
const UNKNOWN_PLAN: &str = "Plan does not exist.";
const SAME_PLAN: &str = "Cannot change to the same plan.";
const NOT_FOUND: &str = "Not found.";

pub struct SubscriptionUseCase<S, P, U>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
    plan_repo: Arc<P>,
    user_repo: Arc<U>,
}

impl<S, P, U> SubscriptionUseCase<S, P, U>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>, plan_repo: Arc<P>, user_repo: Arc<U>) -> Self {
        Self {
            subscription_repo,
            plan_repo,
            user_repo,
        }
    }

    pub async fn list(&self, auth_user_id: i64) -> UseCaseResult<Vec<SubscriptionModel>> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;

        let subscriptions = self
            .subscription_repo
            .list_by_user(caller.user_id)
            .await
            .map_err(|err| {
                error!(
                    user_id = %caller.user_id,
                    db_error = ?err,
                    "subscriptions: failed to list subscriptions"
                );
                UseCaseError::Internal(err)
            })?;

        let mut plan_ids: Vec<i64> = subscriptions.iter().map(|sub| sub.plan_id).collect();
        plan_ids.sort_unstable();
        plan_ids.dedup();

        let plans = self.plan_models_by_id(plan_ids).await?;

        subscriptions
            .into_iter()
            .map(|subscription| {
                let plan = plans.get(&subscription.plan_id).cloned().ok_or_else(|| {
                    UseCaseError::Internal(anyhow!(
                        "plan {} missing for subscription {}",
                        subscription.plan_id,
                        subscription.id
                    ))
                })?;
                Ok(SubscriptionModel::from_entity(subscription, plan))
            })
            .collect()
    }

    pub async fn retrieve(
        &self,
        auth_user_id: i64,
        subscription_id: i64,
    ) -> UseCaseResult<SubscriptionModel> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;
        let subscription = self.find_existing(subscription_id).await?;
        ensure::<SubscriptionPolicy>(
            &caller,
            SubscriptionAction::Retrieve {
                owner_id: subscription.user_id,
            },
        )?;

        let plan = self.plan_model(subscription.plan_id).await?;
        Ok(SubscriptionModel::from_entity(subscription, plan))
    }

    pub async fn create(
        &self,
        auth_user_id: i64,
        create_subscription_model: CreateSubscriptionModel,
    ) -> UseCaseResult<SubscriptionModel> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;
        info!(
            user_id = %caller.user_id,
            plan_id = %create_subscription_model.plan_id,
            "subscriptions: subscription requested"
        );

        let insert_subscription_entity = create_subscription_model.to_entity(caller.user_id);

        // The partial unique index on (user_id) WHERE is_active is the only
        // arbiter here; checking first and inserting after would race.
        let subscription = match self
            .subscription_repo
            .create(insert_subscription_entity)
            .await
        {
            Ok(subscription) => subscription,
            Err(err) if is_unique_violation(&err) => {
                warn!(
                    user_id = %caller.user_id,
                    "subscriptions: user already has an active subscription"
                );
                return Err(UseCaseError::Validation(ACTIVE_EXISTS.to_string()));
            }
            Err(err) if is_foreign_key_violation(&err) => {
                warn!(
                    plan_id = %create_subscription_model.plan_id,
                    "subscriptions: unknown plan"
                );
                return Err(UseCaseError::Validation(UNKNOWN_PLAN.to_string()));
            }
            Err(err) => {
                error!(db_error = ?err, "subscriptions: failed to create subscription");
                return Err(UseCaseError::Internal(err));
            }
        };

        info!(
            subscription_id = %subscription.id,
            user_id = %caller.user_id,
            "subscriptions: subscription created"
        );
        let plan = self.plan_model(subscription.plan_id).await?;
        Ok(SubscriptionModel::from_entity(subscription, plan))
    }

    pub async fn change_plan(
        &self,
        auth_user_id: i64,
        subscription_id: i64,
        change_plan_model: ChangePlanModel,
    ) -> UseCaseResult<SubscriptionModel> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;
        let subscription = self.find_existing(subscription_id).await?;
        ensure::<SubscriptionPolicy>(
            &caller,
            SubscriptionAction::ChangePlan {
                owner_id: subscription.user_id,
            },
        )?;

        if subscription.plan_id == change_plan_model.plan_id {
            warn!(
                %subscription_id,
                plan_id = %change_plan_model.plan_id,
                "subscriptions: change to the same plan rejected"
            );
            return Err(UseCaseError::Validation(SAME_PLAN.to_string()));
        }

        let subscription = match self
            .subscription_repo
            .change_plan(subscription_id, change_plan_model.plan_id)
            .await
        {
            Ok(subscription) => subscription,
            Err(err) if is_foreign_key_violation(&err) => {
                warn!(
                    plan_id = %change_plan_model.plan_id,
                    "subscriptions: unknown plan"
                );
                return Err(UseCaseError::Validation(UNKNOWN_PLAN.to_string()));
            }
            Err(err) => {
                error!(
                    %subscription_id,
                    db_error = ?err,
                    "subscriptions: failed to change plan"
                );
                return Err(UseCaseError::Internal(err));
            }
        };

        info!(
            %subscription_id,
            plan_id = %subscription.plan_id,
            "subscriptions: plan changed"
        );
        let plan = self.plan_model(subscription.plan_id).await?;
        Ok(SubscriptionModel::from_entity(subscription, plan))
    }

    pub async fn deactivate(
        &self,
        auth_user_id: i64,
        subscription_id: i64,
    ) -> UseCaseResult<DeactivateSubscriptionModel> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;
        let subscription = self.find_existing(subscription_id).await?;
        ensure::<SubscriptionPolicy>(
            &caller,
            SubscriptionAction::Deactivate {
                owner_id: subscription.user_id,
            },
        )?;

        // Already-inactive subscriptions deactivate to the same state.
        self.subscription_repo
            .deactivate(subscription_id)
            .await
            .map_err(|err| {
                error!(
                    %subscription_id,
                    db_error = ?err,
                    "subscriptions: failed to deactivate subscription"
                );
                UseCaseError::Internal(err)
            })?;

        info!(%subscription_id, "subscriptions: subscription deactivated");
        Ok(DeactivateSubscriptionModel {
            status: "subscription deactivated".to_string(),
        })
    }

    pub async fn delete(&self, auth_user_id: i64, subscription_id: i64) -> UseCaseResult<()> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;
        let subscription = self.find_existing(subscription_id).await?;
        ensure::<SubscriptionPolicy>(
            &caller,
            SubscriptionAction::Delete {
                owner_id: subscription.user_id,
            },
        )?;

        self.subscription_repo
            .delete(subscription_id)
            .await
            .map_err(|err| {
                error!(
                    %subscription_id,
                    db_error = ?err,
                    "subscriptions: failed to delete subscription"
                );
                UseCaseError::Internal(err)
            })?;

        info!(%subscription_id, "subscriptions: subscription deleted");
        Ok(())
    }

    async fn find_existing(&self, subscription_id: i64) -> UseCaseResult<SubscriptionEntity> {
        let subscription = self
            .subscription_repo
            .find_by_id(subscription_id)
            .await
            .map_err(|err| {
                error!(
                    %subscription_id,
                    db_error = ?err,
                    "subscriptions: failed to load subscription"
                );
                UseCaseError::Internal(err)
            })?;

        subscription.ok_or_else(|| UseCaseError::NotFound(NOT_FOUND.to_string()))
    }

    async fn plan_models_by_id(
        &self,
        plan_ids: Vec<i64>,
    ) -> UseCaseResult<HashMap<i64, PlanModel>> {
        let plans = self.plan_repo.find_by_ids(plan_ids).await.map_err(|err| {
            error!(db_error = ?err, "subscriptions: failed to load plans");
            UseCaseError::Internal(err)
        })?;

        let plan_ids: Vec<i64> = plans.iter().map(|plan| plan.id).collect();
        let features = self
            .plan_repo
            .list_features(plan_ids)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "subscriptions: failed to load plan features");
                UseCaseError::Internal(err)
            })?;

        Ok(PlanModel::assemble(plans, features)
            .into_iter()
            .map(|model| (model.id, model))
            .collect())
    }

    async fn plan_model(&self, plan_id: i64) -> UseCaseResult<PlanModel> {
        let mut models = self.plan_models_by_id(vec![plan_id]).await?;
        models
            .remove(&plan_id)
            .ok_or_else(|| UseCaseError::Internal(anyhow!("plan {} row vanished", plan_id)))
    }
}
