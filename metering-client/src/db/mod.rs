pub mod billing_queries;
