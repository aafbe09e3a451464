use serde::{Deserialize, Serialize};

/// A panel operator as stored in operators.json. The password field
/// holds a PBKDF2 hash, never plaintext.
#[derive(Clone, Serialize, Deserialize)]
pub struct OperatorRecord {
    pub password: String,
}
