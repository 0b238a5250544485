use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: FileStorageConfig,
    pub email: EmailConfig,
    pub application: ApplicationConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: String,
    pub request_timeout: Duration,
    pub json_logs: bool,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct FileStorageConfig {
    pub upload_dir: String,
    pub max_file_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpTls {
    StartTls,
    Wrapper,
    None,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub tls: SmtpTls,
    pub from_email: String,
    pub hr_email: String,
    pub company_name: String,
}

#[derive(Debug, Clone)]
pub struct ApplicationConfig {
    pub base_url: String,
    pub frontend_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                address: get_env_or("SERVER_ADDRESS", "0.0.0.0:8081"),
                request_timeout: Duration::from_secs(get_env_parse_or(
                    "REQUEST_TIMEOUT_SECS",
                    30u64,
                )?),
                json_logs: get_env_or("LOG_FORMAT", "text").eq_ignore_ascii_case("json"),
            },
            database: DatabaseConfig {
                url: database_url(),
                max_connections: get_env_parse_or("DB_MAX_CONNECTIONS", 20u32)?,
            },
            storage: FileStorageConfig {
                upload_dir: get_env_or("UPLOAD_DIR", "./uploads/resumes"),
                max_file_size: get_env_parse_or("MAX_FILE_SIZE", 5 * 1024 * 1024usize)?,
            },
            email: EmailConfig {
                smtp_host: get_env_or("SMTP_HOST", "smtp.gmail.com"),
                smtp_port: get_env_parse_or("SMTP_PORT", 587u16)?,
                smtp_username: get_env_or("SMTP_USERNAME", ""),
                smtp_password: get_env_or("SMTP_PASSWORD", ""),
                tls: parse_tls(&get_env_or("SMTP_TLS", "starttls"))?,
                from_email: get_env_or("FROM_EMAIL", "careers@example.com"),
                hr_email: get_env_or("HR_EMAIL", "hr@example.com"),
                company_name: get_env_or("COMPANY_NAME", "Careers"),
            },
            application: ApplicationConfig {
                base_url: get_env_or("API_BASE_URL", "http://localhost:8081")
                    .trim_end_matches('/')
                    .to_string(),
                frontend_url: get_env_or("FRONTEND_URL", "http://localhost:3000"),
            },
        })
    }
}

fn database_url() -> String {
    if let Ok(url) = env::var("DATABASE_URL") {
        if !url.is_empty() {
            return url;
        }
    }
    format!(
        "postgres://{}:{}@{}:{}/{}?sslmode={}",
        get_env_or("DB_USER", "postgres"),
        get_env_or("DB_PASSWORD", "password"),
        get_env_or("DB_HOST", "localhost"),
        get_env_or("DB_PORT", "5432"),
        get_env_or("DB_NAME", "careers"),
        get_env_or("DB_SSL_MODE", "disable"),
    )
}

fn parse_tls(raw: &str) -> Result<SmtpTls> {
    match raw.to_ascii_lowercase().as_str() {
        "starttls" => Ok(SmtpTls::StartTls),
        "tls" | "ssl" => Ok(SmtpTls::Wrapper),
        "none" | "plain" => Ok(SmtpTls::None),
        other => Err(Error::Config(format!(
            "Invalid value for SMTP_TLS: {} (expected starttls, tls or none)",
            other
        ))),
    }
}

pub fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

pub fn get_env_or(name: &str, default: &str) -> String {
    match env::var(name) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

pub fn get_env_parse<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(name)?;
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.is_empty() => get_env_parse(name),
        _ => Ok(default),
    }
}
