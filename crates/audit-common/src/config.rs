use serde::Deserialize;

/// Top-level application configuration.
/// Loaded from environment variables; read-only after startup.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Host to bind to (default: 0.0.0.0)
    #[serde(default = "default_host")]
    pub host: String,
    /// HTTP API port (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,
    /// PostgreSQL connection URL
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Max connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Bearer token required by the purge endpoint
    #[serde(default = "default_admin_api_key")]
    pub admin_api_key: String,
    /// Identities allowed to request a manual purge
    #[serde(default = "default_admin_users")]
    pub admin_users: Vec<String>,
    /// Retention period in days for the scheduled purge (default: 1095 = 3 years)
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    /// Daily purge trigger, HH:MM UTC (default: 02:00)
    #[serde(default = "default_purge_time")]
    pub purge_time: String,
}

impl AppConfig {
    /// Load config from environment variables.
    ///
    /// `ADMIN_USERS` is a comma-separated list.
    pub fn load() -> Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("admin_users"),
            )
            .build()?;

        cfg.try_deserialize()
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_database_url() -> String {
    "postgres://localhost:5432/audit_logs".to_string()
}
fn default_max_connections() -> u32 {
    10
}
fn default_admin_api_key() -> String {
    "secret-admin-key".to_string()
}
fn default_admin_users() -> Vec<String> {
    vec![
        "admin@company.com".to_string(),
        "sysadmin@company.com".to_string(),
    ]
}
fn default_retention_days() -> i64 {
    1095
}
fn default_purge_time() -> String {
    "02:00".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: default_database_url(),
            max_connections: default_max_connections(),
            admin_api_key: default_admin_api_key(),
            admin_users: default_admin_users(),
            retention_days: default_retention_days(),
            purge_time: default_purge_time(),
        }
    }
}
