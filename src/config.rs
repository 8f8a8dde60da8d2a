use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub cron_secret: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_from_number: Option<String>,
    pub twilio_messaging_service_sid: Option<String>,
    pub default_sender_name: String,
    pub delivery_batch_limit: i64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            cron_secret: get_env("CRON_SECRET")?,
            twilio_account_sid: get_env("TWILIO_ACCOUNT_SID")?,
            twilio_auth_token: get_env("TWILIO_AUTH_TOKEN")?,
            twilio_from_number: env::var("TWILIO_FROM_NUMBER").ok(),
            twilio_messaging_service_sid: env::var("TWILIO_MESSAGING_SERVICE_SID").ok(),
            default_sender_name: env::var("DEFAULT_SENDER_NAME")
                .unwrap_or_else(|_| "Your recruiter".to_string()),
            delivery_batch_limit: get_env_parse_or("DELIVERY_BATCH_LIMIT", 50)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
