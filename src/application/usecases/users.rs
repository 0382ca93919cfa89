use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    application::{
        access_control::{AccountAction, AccountPolicy, ensure, resolve_caller},
        password_hasher,
        usecases::error::{UseCaseError, UseCaseResult, is_unique_violation},
    },
    domain::{
        entities::users::UserEntity,
        repositories::users::UserRepository,
        value_objects::iam::{PromoteUserModel, RegisterUserModel, UpdateUserModel, UserModel},
    },
};

const USERNAME_TAKEN: &str = "A user with that username already exists.";
const NOT_FOUND: &str = "Not found.";

pub struct UserUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
}

impl<U> UserUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn register(&self, register_user_model: RegisterUserModel) -> UseCaseResult<UserModel> {
        info!(username = %register_user_model.username, "accounts: registration requested");

        if register_user_model.username.trim().is_empty() {
            return Err(UseCaseError::Validation(
                "Username may not be blank.".to_string(),
            ));
        }
        if register_user_model.password.is_empty() {
            return Err(UseCaseError::Validation(
                "Password may not be blank.".to_string(),
            ));
        }

        let password_hash = password_hasher::hash(&register_user_model.password).map_err(|err| {
            error!(error = ?err, "accounts: failed to hash password");
            UseCaseError::Internal(err)
        })?;

        let register_user_entity = register_user_model.to_entity(password_hash);

        let user = match self.user_repo.register(register_user_entity).await {
            Ok(user) => user,
            Err(err) if is_unique_violation(&err) => {
                warn!(
                    username = %register_user_model.username,
                    "accounts: username already taken"
                );
                return Err(UseCaseError::Validation(USERNAME_TAKEN.to_string()));
            }
            Err(err) => {
                error!(db_error = ?err, "accounts: failed to register user");
                return Err(UseCaseError::Internal(err));
            }
        };

        info!(user_id = %user.id, "accounts: user registered");
        Ok(UserModel::from(user))
    }

    pub async fn list(&self, auth_user_id: i64) -> UseCaseResult<Vec<UserModel>> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;
        ensure::<AccountPolicy>(&caller, AccountAction::List)?;

        let users = self.user_repo.list().await.map_err(|err| {
            error!(db_error = ?err, "accounts: failed to list users");
            UseCaseError::Internal(err)
        })?;

        info!(user_count = users.len(), "accounts: users listed");
        Ok(users.into_iter().map(UserModel::from).collect())
    }

    pub async fn retrieve(&self, auth_user_id: i64, target_user_id: i64) -> UseCaseResult<UserModel> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;
        let user = self.find_existing(target_user_id).await?;
        ensure::<AccountPolicy>(&caller, AccountAction::Retrieve { target_user_id })?;

        Ok(UserModel::from(user))
    }

    pub async fn update(
        &self,
        auth_user_id: i64,
        target_user_id: i64,
        update_user_model: UpdateUserModel,
    ) -> UseCaseResult<UserModel> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;
        self.find_existing(target_user_id).await?;
        ensure::<AccountPolicy>(&caller, AccountAction::Update { target_user_id })?;

        let user = self
            .user_repo
            .update_profile(target_user_id, update_user_model.to_entity())
            .await
            .map_err(|err| {
                error!(
                    user_id = %target_user_id,
                    db_error = ?err,
                    "accounts: failed to update profile"
                );
                UseCaseError::Internal(err)
            })?;

        info!(user_id = %target_user_id, "accounts: profile updated");
        Ok(UserModel::from(user))
    }

    pub async fn delete(&self, auth_user_id: i64, target_user_id: i64) -> UseCaseResult<()> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;
        self.find_existing(target_user_id).await?;
        ensure::<AccountPolicy>(&caller, AccountAction::Delete { target_user_id })?;

        self.user_repo.delete(target_user_id).await.map_err(|err| {
            error!(
                user_id = %target_user_id,
                db_error = ?err,
                "accounts: failed to delete user"
            );
            UseCaseError::Internal(err)
        })?;

        info!(user_id = %target_user_id, "accounts: user deleted");
        Ok(())
    }

    pub async fn me(&self, auth_user_id: i64) -> UseCaseResult<UserModel> {
        let user = self
            .user_repo
            .find_by_id(auth_user_id)
            .await
            .map_err(|err| {
                error!(user_id = %auth_user_id, db_error = ?err, "accounts: failed to load caller");
                UseCaseError::Internal(err)
            })?
            .ok_or_else(|| {
                UseCaseError::Unauthorized("User account no longer exists.".to_string())
            })?;

        Ok(UserModel::from(user))
    }

    pub async fn update_me(
        &self,
        auth_user_id: i64,
        update_user_model: UpdateUserModel,
    ) -> UseCaseResult<UserModel> {
        self.update(auth_user_id, auth_user_id, update_user_model)
            .await
    }

    pub async fn promote(
        &self,
        auth_user_id: i64,
        target_user_id: i64,
    ) -> UseCaseResult<PromoteUserModel> {
        let caller = resolve_caller(self.user_repo.as_ref(), auth_user_id).await?;
        ensure::<AccountPolicy>(&caller, AccountAction::Promote)?;
        self.find_existing(target_user_id).await?;

        let user = self
            .user_repo
            .promote_to_superuser(target_user_id)
            .await
            .map_err(|err| {
                error!(
                    user_id = %target_user_id,
                    db_error = ?err,
                    "accounts: failed to promote user"
                );
                UseCaseError::Internal(err)
            })?;

        info!(
            user_id = %target_user_id,
            promoted_by = %auth_user_id,
            "accounts: user promoted to superuser"
        );
        Ok(PromoteUserModel {
            status: format!("User {} promoted to superuser.", user.username),
            user: UserModel::from(user),
        })
    }

    async fn find_existing(&self, user_id: i64) -> UseCaseResult<UserEntity> {
        let user = self.user_repo.find_by_id(user_id).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "accounts: failed to load user");
            UseCaseError::Internal(err)
        })?;

        user.ok_or_else(|| UseCaseError::NotFound(NOT_FOUND.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::Utc;
    use mockall::predicate::eq;

    use crate::domain::repositories::users::MockUserRepository;

    fn sample_user(id: i64, username: &str, is_staff: bool, is_superuser: bool) -> UserEntity {
        let now = Utc::now();
        UserEntity {
            id,
            username: username.to_string(),
            email: format!("{}@example.com", username),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            is_staff,
            is_superuser,
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

    fn unique_violation() -> anyhow::Error {
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_string()),
        )
        .into()
    }

    #[tokio::test]
    async fn register_hashes_password_and_defaults_to_regular_role() {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_register()
            .withf(|entity| {
                entity.username == "alice"
                    && entity.password_hash.starts_with("$argon2")
                    && entity.password_hash != "wonderland"
            })
            .returning(|entity| {
                let mut user = sample_user(1, "alice", false, false);
                user.password_hash = entity.password_hash;
                Box::pin(async move { Ok(user) })
            });

        let usecase = UserUseCase::new(Arc::new(user_repo));

        let user = usecase
            .register(RegisterUserModel {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                first_name: String::new(),
                last_name: String::new(),
                password: "wonderland".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.username, "alice");
        assert!(!user.is_staff);
        assert!(!user.is_superuser);
    }

    #[tokio::test]
    async fn register_rejects_blank_username() {
        let user_repo = MockUserRepository::new();
        let usecase = UserUseCase::new(Arc::new(user_repo));

        let err = usecase
            .register(RegisterUserModel {
                username: "   ".to_string(),
                email: String::new(),
                first_name: String::new(),
                last_name: String::new(),
                password: "secret".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_maps_duplicate_username_to_validation_error() {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_register()
            .returning(|_| Box::pin(async { Err(unique_violation()) }));

        let usecase = UserUseCase::new(Arc::new(user_repo));

        let err = usecase
            .register(RegisterUserModel {
                username: "alice".to_string(),
                email: String::new(),
                first_name: String::new(),
                last_name: String::new(),
                password: "secret".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), USERNAME_TAKEN);
    }

    #[tokio::test]
    async fn list_requires_admin() {
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(1, "alice", false, false));

        let usecase = UserUseCase::new(Arc::new(user_repo));

        let err = usecase.list(1).await.unwrap_err();

        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn list_returns_every_account_for_staff() {
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(1, "admin", true, false));
        user_repo.expect_list().returning(|| {
            Box::pin(async {
                Ok(vec![
                    sample_user(1, "admin", true, false),
                    sample_user(2, "bob", false, false),
                ])
            })
        });

        let usecase = UserUseCase::new(Arc::new(user_repo));

        let users = usecase.list(1).await.unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[1].username, "bob");
    }

    #[tokio::test]
    async fn retrieve_own_account_succeeds() {
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(2, "bob", false, false));

        let usecase = UserUseCase::new(Arc::new(user_repo));

        let user = usecase.retrieve(2, 2).await.unwrap();

        assert_eq!(user.id, 2);
    }

    #[tokio::test]
    async fn retrieve_foreign_account_is_forbidden_for_regular_user() {
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(2, "bob", false, false));
        expect_caller(&mut user_repo, sample_user(3, "carol", false, false));

        let usecase = UserUseCase::new(Arc::new(user_repo));

        let err = usecase.retrieve(2, 3).await.unwrap_err();

        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn retrieve_missing_account_is_not_found_for_admin() {
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(1, "admin", true, false));
        user_repo
            .expect_find_by_id()
            .with(eq(99))
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = UserUseCase::new(Arc::new(user_repo));

        let err = usecase.retrieve(1, 99).await.unwrap_err();

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_touches_only_profile_names() {
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(2, "bob", false, false));
        user_repo
            .expect_update_profile()
            .withf(|user_id, entity| {
                *user_id == 2
                    && entity.first_name.as_deref() == Some("Bob")
                    && entity.last_name.is_none()
            })
            .returning(|_, entity| {
                let mut user = sample_user(2, "bob", false, false);
                user.first_name = entity.first_name.unwrap_or_default();
                Box::pin(async move { Ok(user) })
            });

        let usecase = UserUseCase::new(Arc::new(user_repo));

        let user = usecase
            .update_me(
                2,
                UpdateUserModel {
                    first_name: Some("Bob".to_string()),
                    last_name: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(user.first_name, "Bob");
        assert_eq!(user.username, "bob");
    }

    #[tokio::test]
    async fn update_foreign_account_is_forbidden_for_regular_user() {
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(2, "bob", false, false));
        expect_caller(&mut user_repo, sample_user(3, "carol", false, false));

        let usecase = UserUseCase::new(Arc::new(user_repo));

        let err = usecase
            .update(
                2,
                3,
                UpdateUserModel {
                    first_name: Some("Hacked".to_string()),
                    last_name: None,
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_can_delete_other_accounts() {
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(1, "admin", true, false));
        expect_caller(&mut user_repo, sample_user(2, "bob", false, false));
        user_repo
            .expect_delete()
            .with(eq(2))
            .returning(|_| Box::pin(async { Ok(()) }));

        let usecase = UserUseCase::new(Arc::new(user_repo));

        assert!(usecase.delete(1, 2).await.is_ok());
    }

    #[tokio::test]
    async fn delete_foreign_account_is_forbidden_for_regular_user() {
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(2, "bob", false, false));
        expect_caller(&mut user_repo, sample_user(3, "carol", false, false));

        let usecase = UserUseCase::new(Arc::new(user_repo));

        let err = usecase.delete(2, 3).await.unwrap_err();

        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn promote_sets_both_role_flags() {
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(1, "admin", true, false));
        expect_caller(&mut user_repo, sample_user(2, "bob", false, false));
        user_repo
            .expect_promote_to_superuser()
            .with(eq(2))
            .returning(|_| {
                let user = sample_user(2, "bob", true, true);
                Box::pin(async move { Ok(user) })
            });

        let usecase = UserUseCase::new(Arc::new(user_repo));

        let promoted = usecase.promote(1, 2).await.unwrap();

        assert_eq!(promoted.status, "User bob promoted to superuser.");
        assert!(promoted.user.is_staff);
        assert!(promoted.user.is_superuser);
    }

    #[tokio::test]
    async fn promote_is_idempotent_for_already_promoted_users() {
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(1, "admin", true, false));
        expect_caller(&mut user_repo, sample_user(2, "bob", true, true));
        user_repo
            .expect_promote_to_superuser()
            .with(eq(2))
            .returning(|_| {
                let user = sample_user(2, "bob", true, true);
                Box::pin(async move { Ok(user) })
            });

        let usecase = UserUseCase::new(Arc::new(user_repo));

        let promoted = usecase.promote(1, 2).await.unwrap();

        assert!(promoted.user.is_staff);
        assert!(promoted.user.is_superuser);
    }

    #[tokio::test]
    async fn promote_requires_admin() {
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(2, "bob", false, false));

        let usecase = UserUseCase::new(Arc::new(user_repo));

        let err = usecase.promote(2, 3).await.unwrap_err();

        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn promote_missing_user_is_not_found() {
        let mut user_repo = MockUserRepository::new();
        expect_caller(&mut user_repo, sample_user(1, "admin", true, false));
        user_repo
            .expect_find_by_id()
            .with(eq(99))
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = UserUseCase::new(Arc::new(user_repo));

        let err = usecase.promote(1, 99).await.unwrap_err();

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn requests_from_deleted_accounts_are_unauthorized() {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_id()
            .with(eq(42))
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = UserUseCase::new(Arc::new(user_repo));

        let err = usecase.me(42).await.unwrap_err();

        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
