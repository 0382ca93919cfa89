pub mod access_control;
pub mod password_hasher;
pub mod usecases;
