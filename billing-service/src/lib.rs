pub mod config;
pub mod engine;
pub mod observability;
pub mod store;

pub use engine::{BillingCalculator, BillingError, BillingResult, BillingRun};
