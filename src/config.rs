use std::env;
use std::path::Path;

// Default configuration constants
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_API_BASE_URL: &str = "";
pub const DEFAULT_API_TOKEN: &str = "";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "";
pub const DEFAULT_OPERATORS_FILE: &str = "operators.json";
pub const DEFAULT_MAX_DEVICES: u32 = 2;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;

pub fn load_env_file(env_file: Option<&str>) {
    if let Some(path) = env_file {
        dotenvy::from_path(Path::new(path)).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

/// Base URL of the VPN backend that owns the account records.
pub fn get_api_base_url() -> String {
    sanitize_base_url(&env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()))
}

pub fn get_api_token() -> String {
    env::var("API_TOKEN").unwrap_or_else(|_| DEFAULT_API_TOKEN.to_string())
}

pub fn get_public_base_url() -> String {
    sanitize_public_base_url(&env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| DEFAULT_PUBLIC_BASE_URL.to_string()))
}

pub fn get_operators_file() -> String {
    env::var("OPERATORS_FILE").unwrap_or_else(|_| DEFAULT_OPERATORS_FILE.to_string())
}

pub fn sanitize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

pub fn sanitize_public_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        format!("http://{}:{}", DEFAULT_HOST, DEFAULT_PORT)
    } else {
        trimmed.to_string()
    }
}
