use chrono::NaiveDateTime;
use thiserror::Error;

use crate::config::MIN_PASSWORD_LENGTH;
use crate::models::{AccountRecord, AccountStatus, AccountView, Tab};

/// Apply a tab's status filter in memory, preserving backend order.
pub fn filter_for_tab(tab: Tab, accounts: Vec<AccountRecord>) -> Vec<AccountRecord> {
    accounts.into_iter().filter(|a| tab.matches(a)).collect()
}

/// Project records into display-ready cards. Action availability
/// follows status: pending gets Approve, approved gets Download,
/// Delete is always offered.
pub fn build_views(accounts: &[AccountRecord]) -> Vec<AccountView> {
    accounts
        .iter()
        .map(|record| AccountView {
            id: record.id,
            username: record.username.clone(),
            email: record.email.clone(),
            status_class: record.status.as_str().to_string(),
            status_display: record.status.display_label().to_string(),
            created_display: format_timestamp(&record.created_at),
            ovpn_username: record.ovpn_username.clone(),
            max_devices_display: record.max_devices.map(|n| n.to_string()),
            can_approve: record.status == AccountStatus::Pending,
            can_download: record.status == AccountStatus::Approved,
        })
        .collect()
}

/// The backend sends ISO-8601 timestamps without a zone suffix;
/// anything unparsable is shown verbatim rather than dropped.
fn format_timestamp(raw: &str) -> String {
    let trimmed = raw.trim_end_matches('Z');
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return dt.format("%Y-%m-%d %H:%M").to_string();
        }
    }
    raw.to_string()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least 8 characters")]
    PasswordTooShort,
}

/// Client-side validation of the approval form, checked in order and
/// failing fast before any backend call. The backend validates again;
/// this layer just saves the round trip.
pub fn validate_approval(password: &str, password_confirm: &str) -> Result<(), ValidationError> {
    if password != password_confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}
