pub mod auth;
pub mod error;
pub mod features;
pub mod plans;
pub mod subscriptions;
pub mod users;
