use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Service name used in log output
    #[serde(default = "default_service_name")]
    pub service_name: String,

    // NATS configuration
    /// NATS server URL
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// Stream carrying document-created events from the caisse app
    #[serde(default = "default_documents_stream")]
    pub documents_stream: String,

    /// Stream carrying notification-created events
    #[serde(default = "default_notifications_stream")]
    pub notifications_stream: String,

    /// Stream the push gateway consumes multicast requests from
    #[serde(default = "default_push_stream")]
    pub push_stream: String,

    /// Batch size for consumers
    #[serde(default = "default_nats_batch_size")]
    pub nats_batch_size: usize,

    /// Max wait time for batches in seconds
    #[serde(default = "default_nats_batch_wait_secs")]
    pub nats_batch_wait_secs: u64,

    /// Startup timeout for initialization operations in seconds
    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,

    // PostgreSQL configuration
    /// PostgreSQL host
    #[serde(default = "default_postgres_host")]
    pub postgres_host: String,

    /// PostgreSQL port
    #[serde(default = "default_postgres_port")]
    pub postgres_port: u16,

    /// PostgreSQL database name
    #[serde(default = "default_postgres_database")]
    pub postgres_database: String,

    /// PostgreSQL username
    #[serde(default = "default_postgres_username")]
    pub postgres_username: String,

    /// PostgreSQL password
    #[serde(default = "default_postgres_password")]
    pub postgres_password: String,

    /// Max pool size
    #[serde(default = "default_postgres_pool_size")]
    pub postgres_pool_size: usize,

    // Overdue credit scan configuration
    /// Six-field cron expression for the daily scan
    #[serde(default = "default_scan_cron")]
    pub scan_cron: String,

    /// IANA timezone the scan cron is evaluated in
    #[serde(default = "default_scan_timezone")]
    pub scan_timezone: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "caisse-notifications".to_string()
}

// NATS defaults
fn default_nats_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_documents_stream() -> String {
    "caisse_documents".to_string()
}

fn default_notifications_stream() -> String {
    "notifications_caisse".to_string()
}

fn default_push_stream() -> String {
    "push_outbox".to_string()
}

fn default_nats_batch_size() -> usize {
    30
}

fn default_nats_batch_wait_secs() -> u64 {
    5
}

fn default_startup_timeout_secs() -> u64 {
    30
}

// PostgreSQL defaults
fn default_postgres_host() -> String {
    "localhost".to_string()
}

fn default_postgres_port() -> u16 {
    5432
}

fn default_postgres_database() -> String {
    "caisse".to_string()
}

fn default_postgres_username() -> String {
    "caisse".to_string()
}

fn default_postgres_password() -> String {
    "caisse".to_string()
}

fn default_postgres_pool_size() -> usize {
    5
}

// Scan defaults: daily at 06:00 in the deployment timezone
fn default_scan_cron() -> String {
    "0 0 6 * * *".to_string()
}

fn default_scan_timezone() -> String {
    "Africa/Abidjan".to_string()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("CAISSE"))
            .build()?
            .try_deserialize()
    }
}
