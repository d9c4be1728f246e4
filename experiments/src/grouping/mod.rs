pub mod email_first;
pub mod hashing;
pub mod registry;
pub mod rollout_config;
pub mod rule;
pub mod subject;
pub mod token_code;
