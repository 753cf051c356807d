use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub target_form: String,
    pub survey_url: String,
    pub max_body_size: usize,
    pub store_timeout: Duration,
    pub diagnostic_sink: DiagnosticSinkKind,
    pub jwt_secret: String,
    pub admin: AdminConfig,
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub username: String,
    /// Argon2 PHC string. `None` disables admin login.
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiagnosticSinkKind {
    Tracing,
    Database,
    Off,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let store = match env_or("EFC_STORE", "postgres").as_str() {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => return Err(format!("Invalid EFC_STORE: {other}")),
        };

        let database_url = match store {
            StoreBackend::Postgres => Some(env_required("DATABASE_URL")?),
            StoreBackend::Memory => std::env::var("DATABASE_URL").ok(),
        };

        let jwt_secret = env_required("EFC_JWT_SECRET")?;

        let host: IpAddr = env_or("EFC_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid EFC_HOST: {e}"))?;

        let port: u16 = env_or("EFC_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid EFC_PORT: {e}"))?;

        let base_url = env_or("EFC_BASE_URL", &format!("http://{host}:{port}"));
        let target_form = env_or("EFC_TARGET_FORM", "LandingPageLead");
        let survey_url = env_or(
            "EFC_SURVEY_URL",
            &format!("{}/rg-sales-software-version/", base_url.trim_end_matches('/')),
        );

        let max_body_size: usize = env_or("EFC_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid EFC_MAX_BODY_SIZE: {e}"))?;

        let store_timeout_ms: u64 = env_or("EFC_STORE_TIMEOUT_MS", "5000")
            .parse()
            .map_err(|e| format!("Invalid EFC_STORE_TIMEOUT_MS: {e}"))?;

        let diagnostic_sink = match env_or("EFC_DIAGNOSTIC_SINK", "tracing").as_str() {
            "tracing" => DiagnosticSinkKind::Tracing,
            "database" => DiagnosticSinkKind::Database,
            "off" => DiagnosticSinkKind::Off,
            other => return Err(format!("Invalid EFC_DIAGNOSTIC_SINK: {other}")),
        };
        if diagnostic_sink == DiagnosticSinkKind::Database && store == StoreBackend::Memory {
            return Err("EFC_DIAGNOSTIC_SINK=database requires EFC_STORE=postgres".to_string());
        }

        let admin = AdminConfig {
            username: env_or("EFC_ADMIN_USER", "admin"),
            password_hash: std::env::var("EFC_ADMIN_PASSWORD_HASH")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        };

        let log_level = env_or("EFC_LOG_LEVEL", "info");

        Ok(Config {
            store,
            database_url,
            host,
            port,
            base_url,
            target_form,
            survey_url,
            max_body_size,
            store_timeout: Duration::from_millis(store_timeout_ms),
            diagnostic_sink,
            jwt_secret,
            admin,
            log_level,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
