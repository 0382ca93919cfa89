use tracing::{error, warn};

use crate::{
    application::usecases::error::{UseCaseError, UseCaseResult},
    domain::{repositories::users::UserRepository, value_objects::iam::Caller},
};

const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";

/// Decides whether a caller may perform an action on a resource. Which rows
/// count as visible is settled before the policy runs, so a denial always
/// means 403 rather than 404.
pub trait AccessPolicy {
    type Action;

    fn allows(caller: &Caller, action: &Self::Action) -> bool;
}

pub fn ensure<P>(caller: &Caller, action: P::Action) -> UseCaseResult<()>
where
    P: AccessPolicy,
{
    if P::allows(caller, &action) {
        Ok(())
    } else {
        Err(UseCaseError::Forbidden(PERMISSION_DENIED.to_string()))
    }
}

/// Loads the caller's account row and turns it into a `Caller`. A token
/// whose account has since been deleted is treated as unauthenticated.
pub async fn resolve_caller<U>(user_repo: &U, user_id: i64) -> UseCaseResult<Caller>
where
    U: UserRepository + Send + Sync,
{
    let user = user_repo.find_by_id(user_id).await.map_err(|err| {
        error!(%user_id, db_error = ?err, "access_control: failed to load caller account");
        UseCaseError::Internal(err)
    })?;

    match user {
        Some(user) => Ok(Caller::from(&user)),
        None => {
            warn!(%user_id, "access_control: caller account no longer exists");
            Err(UseCaseError::Unauthorized(
                "User account no longer exists.".to_string(),
            ))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccountAction {
    List,
    Retrieve { target_user_id: i64 },
    Update { target_user_id: i64 },
    Delete { target_user_id: i64 },
    Promote,
}

/// Account rows are visible to admins and to their owner; listing and
/// promotion are admin-only.
pub struct AccountPolicy;

impl AccessPolicy for AccountPolicy {
    type Action = AccountAction;

    fn allows(caller: &Caller, action: &AccountAction) -> bool {
        match action {
            AccountAction::List | AccountAction::Promote => caller.is_admin(),
            AccountAction::Retrieve { target_user_id }
            | AccountAction::Update { target_user_id }
            | AccountAction::Delete { target_user_id } => {
                caller.is_admin() || caller.user_id == *target_user_id
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogAction {
    Read,
    Write,
}

/// Features and plans are readable by any authenticated caller and writable
/// by admins only.
pub struct CatalogPolicy;

impl AccessPolicy for CatalogPolicy {
    type Action = CatalogAction;

    fn allows(caller: &Caller, action: &CatalogAction) -> bool {
        match action {
            CatalogAction::Read => true,
            CatalogAction::Write => caller.is_admin(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionAction {
    Retrieve { owner_id: i64 },
    ChangePlan { owner_id: i64 },
    Deactivate { owner_id: i64 },
    Delete { owner_id: i64 },
}

/// Subscriptions belong to exactly one user and only that user may touch
/// them. Admins get no bypass here.
pub struct SubscriptionPolicy;

impl AccessPolicy for SubscriptionPolicy {
    type Action = SubscriptionAction;

    fn allows(caller: &Caller, action: &SubscriptionAction) -> bool {
        let (SubscriptionAction::Retrieve { owner_id }
        | SubscriptionAction::ChangePlan { owner_id }
        | SubscriptionAction::Deactivate { owner_id }
        | SubscriptionAction::Delete { owner_id }) = action;

        caller.user_id == *owner_id
    }
}
