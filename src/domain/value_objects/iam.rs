use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::entities::users::{EditUserEntity, RegisterUserEntity, UserEntity};

/// Identity of the authenticated caller. Role flags are re-read from the
/// database on every request, so a promotion takes effect immediately
/// instead of waiting for the token to be reissued.
#[derive(Debug, Clone, PartialEq)]
pub struct Caller {
    pub user_id: i64,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

impl From<&UserEntity> for Caller {
    fn from(entity: &UserEntity) -> Self {
        Self {
            user_id: entity.id,
            is_staff: entity.is_staff,
            is_superuser: entity.is_superuser,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserModel {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl From<UserEntity> for UserModel {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            username: entity.username,
            email: entity.email,
            first_name: entity.first_name,
            last_name: entity.last_name,
            is_staff: entity.is_staff,
            is_superuser: entity.is_superuser,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserModel {
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub password: String,
}

impl RegisterUserModel {
    pub fn to_entity(&self, password_hash: String) -> RegisterUserEntity {
        RegisterUserEntity {
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            password_hash,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserModel {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UpdateUserModel {
    pub fn to_entity(&self) -> EditUserEntity {
        EditUserEntity {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PromoteUserModel {
    pub status: String,
    pub user: UserModel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginModel {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenPairModel {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenModel {
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenModel {
    pub access: String,
}
