use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_bucket: String,
    pub request_timeout_secs: u64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let request_timeout_secs = match env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| Error::Config(format!("Invalid value for REQUEST_TIMEOUT_SECS: {}", e)))?,
            Err(_) => 30,
        };

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            supabase_url: get_env("SUPABASE_URL")?,
            supabase_anon_key: get_env("SUPABASE_ANON_KEY")?,
            supabase_bucket: env::var("SUPABASE_BUCKET")
                .unwrap_or_else(|_| "job-portal-files".to_string()),
            request_timeout_secs,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
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
