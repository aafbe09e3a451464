use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

use crate::config::{self, DEFAULT_PBKDF2_ITERATIONS};
use crate::models::OperatorRecord;

const HASH_SCHEME: &str = "pbkdf2-sha256";

/// Hash an operator password as `pbkdf2-sha256$iterations$salt$hash`,
/// all hex-encoded.
pub fn generate_password_hash(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let mut derived = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, DEFAULT_PBKDF2_ITERATIONS, &mut derived);
    format!(
        "{}${}${}${}",
        HASH_SCHEME,
        DEFAULT_PBKDF2_ITERATIONS,
        hex::encode(salt),
        hex::encode(derived)
    )
}

pub fn verify_password(stored: &str, candidate: &str) -> bool {
    let parts: Vec<&str> = stored.split('$').collect();
    if parts.len() != 4 || parts[0] != HASH_SCHEME {
        return false;
    }
    let iterations: u32 = match parts[1].parse() {
        Ok(n) => n,
        Err(_) => return false,
    };
    let salt = match hex::decode(parts[2]) {
        Ok(s) => s,
        Err(_) => return false,
    };
    let expected = match hex::decode(parts[3]) {
        Ok(h) => h,
        Err(_) => return false,
    };
    let mut derived = vec![0u8; expected.len()];
    pbkdf2_hmac::<Sha256>(candidate.as_bytes(), &salt, iterations, &mut derived);
    // Constant-time comparison.
    if derived.len() != expected.len() {
        return false;
    }
    derived
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

pub fn random_session_id() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Load operators.json; a missing file starts the panel with no
/// operators (use `ovpanel operators add` to create one).
pub async fn load_operators_from_file() -> Arc<Mutex<HashMap<String, OperatorRecord>>> {
    let path = config::get_operators_file();
    let operators = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => match serde_json::from_str::<HashMap<String, OperatorRecord>>(&raw) {
            Ok(map) => map,
            Err(e) => {
                tracing::error!(%e, path, "Failed to parse operators file; starting empty");
                HashMap::new()
            }
        },
        Err(_) => HashMap::new(),
    };
    Arc::new(Mutex::new(operators))
}

pub async fn persist_operators_file(
    operators: &Arc<Mutex<HashMap<String, OperatorRecord>>>,
) -> std::io::Result<()> {
    let path = config::get_operators_file();
    let snapshot = operators.lock().unwrap().clone();
    let raw = serde_json::to_string_pretty(&snapshot)?;
    tokio::fs::write(&path, raw).await
}
