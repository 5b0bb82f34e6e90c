use std::env;

use serde::Deserialize;
use tracing::info;

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub env: String, // file / server
    pub host: String,
    pub port: u16,
    pub prefix: Option<String>,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_exp: u16,
    pub jwt_refresh_exp: u16,
    pub redis_url: String,
    pub webhook_secret: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// seconds to wait for a free pool connection
    #[serde(default = "default_db_acquire_timeout")]
    pub db_acquire_timeout: u64,
    /// seconds a single statement may run inside a write transaction
    #[serde(default = "default_db_statement_timeout")]
    pub db_statement_timeout: u64,
    #[serde(default = "default_transaction_max_retries")]
    pub transaction_max_retries: u32,
}

fn default_log_level() -> String {
    "debug".to_string()
}

fn default_db_acquire_timeout() -> u64 {
    5
}

fn default_db_statement_timeout() -> u64 {
    10
}

fn default_transaction_max_retries() -> u32 {
    3
}

pub fn get_config() -> Config {
    let env_var = env::var("env").unwrap_or("file".to_string());
    if env_var == "file" {
        info!("using .env file as environtment variable");
        let _ = dotenvy::dotenv();
    } else {
        info!("using server environtment as environtment variable");
    }
    match envy::from_env::<Config>() {
        Ok(config) => config,
        Err(err) => panic!("invalid environment configuration: {}", err),
    }
}
