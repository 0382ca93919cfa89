pub mod features;
pub mod plans;
pub mod subscriptions;
pub mod users;
