use std::net::SocketAddr;
use std::ops::Deref;
use std::path::PathBuf;
use std::str::FromStr;

use envconfig::Envconfig;
use tracing::Level;

use crate::grouping::rule::DEFAULT_TEST_EMAIL_PATTERN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlexBool(pub bool);

impl FromStr for FlexBool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(FlexBool(true)),
            "false" | "0" | "no" | "off" | "" => Ok(FlexBool(false)),
            _ => Err(format!("Invalid boolean value: {}", s)),
        }
    }
}

impl Deref for FlexBool {
    type Target = bool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    #[envconfig(default = "127.0.0.1:3002")]
    pub address: SocketAddr,

    #[envconfig(from = "DEBUG", default = "false")]
    pub debug: FlexBool,

    #[envconfig(default = "1000")]
    pub max_concurrency: usize,

    #[envconfig(default = "false")]
    pub enable_metrics: bool,

    // JSON object of client id -> rollout parameters, replaces the built-in table
    pub rollout_clients_path: Option<PathBuf>,

    #[envconfig(default = "0.0")]
    pub sync_rollout_rate: f64,

    #[envconfig(default = "0.0")]
    pub email_first_rollout_rate: f64,

    // falls back to DEFAULT_TEST_EMAIL_PATTERN when unset
    pub test_email_pattern: Option<String>,

    pub otel_url: Option<String>,

    #[envconfig(default = "1.0")]
    pub otel_sampling_rate: f64,

    #[envconfig(default = "portal-experiments")]
    pub otel_service_name: String,

    #[envconfig(default = "3")]
    pub otel_export_timeout_secs: u64,

    #[envconfig(default = "info")]
    pub otel_log_level: Level,
}

impl Config {
    pub fn test_email_pattern(&self) -> &str {
        self.test_email_pattern
            .as_deref()
            .unwrap_or(DEFAULT_TEST_EMAIL_PATTERN)
    }

    pub fn default_test_config() -> Self {
        Self {
            address: SocketAddr::from(([127, 0, 0, 1], 0)),
            debug: FlexBool(false),
            max_concurrency: 1000,
            enable_metrics: false,
            rollout_clients_path: None,
            sync_rollout_rate: 0.0,
            email_first_rollout_rate: 0.0,
            test_email_pattern: None,
            otel_url: None,
            otel_sampling_rate: 1.0,
            otel_service_name: "portal-experiments".to_string(),
            otel_export_timeout_secs: 3,
            otel_log_level: Level::INFO,
        }
    }
}
