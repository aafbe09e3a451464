use axum::{
    extract::{Form, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::api::{approve_account, load_accounts, ApiError, ApprovalRequest};
use crate::config::DEFAULT_MAX_DEVICES;
use crate::models::{AccountStatus, AppState, FlashKind};
use crate::services::validate_approval;
use crate::templates::ApproveTemplate;

use super::helpers::{build_template_globals, push_flash, render_template, TemplateGlobals};

/// Open the approval form for a pending account. The OpenVPN login is
/// pre-filled with the candidate's username; the operator may edit it.
pub async fn approve_get(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(account_id): Path<i64>,
) -> Response {
    let records = match load_accounts(&state.client, &state.api_base_url, &state.api_token).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(%e, account_id, "Failed to load accounts for approval form");
            push_flash(&state, &jar, FlashKind::Error, format!("Failed to load account: {}", e));
            return Redirect::to("/accounts/pending").into_response();
        }
    };
    let Some(record) = records.iter().find(|r| r.id == account_id) else {
        push_flash(&state, &jar, FlashKind::Error, "Account not found");
        return Redirect::to("/accounts/pending").into_response();
    };
    if record.status != AccountStatus::Pending {
        push_flash(
            &state,
            &jar,
            FlashKind::Error,
            format!("Account {} is not awaiting review", record.username),
        );
        return Redirect::to("/accounts/pending").into_response();
    }

    let TemplateGlobals {
        current_operator,
        api_hostname,
        base_url,
        flash_messages,
        has_flash_messages,
    } = build_template_globals(&state, &jar);
    render_template(ApproveTemplate {
        current_operator,
        api_hostname,
        base_url,
        flash_messages,
        has_flash_messages,
        account_id,
        username: record.username.clone(),
        ovpn_username: record.username.clone(),
        max_devices: DEFAULT_MAX_DEVICES,
        error: None,
    })
}

#[derive(Deserialize)]
pub struct ApproveForm {
    pub username: String,
    pub ovpn_username: String,
    pub password: String,
    pub password_confirm: String,
    pub max_devices: u32,
}

/// Submit the approval. Validation failures and backend failures both
/// re-render the form (the workflow stays open); only a confirmed
/// success closes it and returns to the pending tab, whose next render
/// re-fetches the moved record.
pub async fn approve_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(account_id): Path<i64>,
    Form(form): Form<ApproveForm>,
) -> Response {
    if let Err(e) = validate_approval(&form.password, &form.password_confirm) {
        return reopen_form(&state, &jar, account_id, &form, e.to_string());
    }

    let request = ApprovalRequest {
        ovpn_username: form.ovpn_username.trim().to_string(),
        password: form.password.clone(),
        max_devices: form.max_devices,
    };
    match approve_account(&state.client, &state.api_base_url, &state.api_token, account_id, &request).await {
        Ok(()) => {
            tracing::info!(account_id, username = %form.username, "Account approved");
            push_flash(
                &state,
                &jar,
                FlashKind::Success,
                format!("Account {} provisioned", form.username),
            );
            Redirect::to("/accounts/pending").into_response()
        }
        Err(ApiError::Backend(msg)) => {
            tracing::error!(account_id, %msg, "Backend rejected approval");
            reopen_form(&state, &jar, account_id, &form, format!("Approval failed: {}", msg))
        }
        Err(e) => {
            tracing::error!(account_id, %e, "Approval request failed");
            reopen_form(&state, &jar, account_id, &form, format!("Network error: {}", e))
        }
    }
}

/// Re-render the form with an error, keeping the operator's non-secret
/// input. Passwords are never echoed back.
fn reopen_form(
    state: &AppState,
    jar: &CookieJar,
    account_id: i64,
    form: &ApproveForm,
    error: String,
) -> Response {
    let TemplateGlobals {
        current_operator,
        api_hostname,
        base_url,
        flash_messages,
        has_flash_messages,
    } = build_template_globals(state, jar);
    render_template(ApproveTemplate {
        current_operator,
        api_hostname,
        base_url,
        flash_messages,
        has_flash_messages,
        account_id,
        username: form.username.clone(),
        ovpn_username: form.ovpn_username.clone(),
        max_devices: form.max_devices,
        error: Some(error),
    })
}
