pub mod account_service;
pub mod operator_service;

// Re-export commonly used functions
pub use account_service::{build_views, filter_for_tab, validate_approval, ValidationError};
pub use operator_service::{
    generate_password_hash, load_operators_from_file, persist_operators_file, random_session_id,
    verify_password,
};
