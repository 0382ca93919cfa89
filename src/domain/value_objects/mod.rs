pub mod features;
pub mod iam;
pub mod plans;
pub mod subscriptions;
