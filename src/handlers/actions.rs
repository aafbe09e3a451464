use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::api::{delete_account, fetch_config_file, generate_download, load_accounts};
use crate::models::{AppState, FlashKind};
use crate::services::build_views;
use crate::templates::ConfirmDeleteTemplate;

use super::helpers::{build_template_globals, push_flash, render_template, TemplateGlobals};

/// Generate a download link for an approved account and stream the
/// config file back to the operator as an attachment with the
/// backend-provided filename.
pub async fn download_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(username): Path<String>,
) -> Response {
    let link = match generate_download(&state.client, &state.api_base_url, &state.api_token, &username).await
    {
        Ok(link) => link,
        Err(e) => {
            tracing::error!(%e, %username, "Failed to generate download link");
            push_flash(&state, &jar, FlashKind::Error, format!("Failed to generate download link: {}", e));
            return Redirect::to("/accounts/approved").into_response();
        }
    };

    match fetch_config_file(&state.client, &state.api_base_url, &state.api_token, &link.download_url).await
    {
        Ok(resp) => {
            tracing::info!(%username, filename = %link.actual_filename, "Streaming config download");
            let filename = link.actual_filename.replace('"', "");
            let headers = [
                (header::CONTENT_TYPE, "application/x-openvpn-profile".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                ),
            ];
            (headers, Body::from_stream(resp.bytes_stream())).into_response()
        }
        Err(e) => {
            tracing::error!(%e, %username, "Failed to fetch config file");
            push_flash(&state, &jar, FlashKind::Error, format!("Download failed: {}", e));
            Redirect::to("/accounts/approved").into_response()
        }
    }
}

/// Explicit confirmation page before the irreversible delete. Rendering
/// this page issues no mutating call; only the confirmed POST does.
pub async fn delete_confirm_get(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(account_id): Path<i64>,
) -> Response {
    let records = match load_accounts(&state.client, &state.api_base_url, &state.api_token).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(%e, account_id, "Failed to load accounts for delete confirmation");
            push_flash(&state, &jar, FlashKind::Error, format!("Failed to load account: {}", e));
            return Redirect::to("/accounts/all").into_response();
        }
    };
    let Some(record) = records.iter().find(|r| r.id == account_id) else {
        push_flash(&state, &jar, FlashKind::Error, "Account not found");
        return Redirect::to("/accounts/all").into_response();
    };
    let account = build_views(std::slice::from_ref(record)).remove(0);

    let TemplateGlobals {
        current_operator,
        api_hostname,
        base_url,
        flash_messages,
        has_flash_messages,
    } = build_template_globals(&state, &jar);
    render_template(ConfirmDeleteTemplate {
        current_operator,
        api_hostname,
        base_url,
        flash_messages,
        has_flash_messages,
        account,
    })
}

/// The confirmed delete. Success and failure both land on the All tab;
/// every tab re-fetches on render, so a successful removal disappears
/// from all three views at once.
pub async fn delete_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(account_id): Path<i64>,
) -> Response {
    match delete_account(&state.client, &state.api_base_url, &state.api_token, account_id).await {
        Ok(()) => {
            tracing::info!(account_id, "Account deleted");
            push_flash(&state, &jar, FlashKind::Success, "Account deleted");
        }
        Err(e) => {
            tracing::error!(%e, account_id, "Failed to delete account");
            push_flash(&state, &jar, FlashKind::Error, format!("Delete failed: {}", e));
        }
    }
    Redirect::to("/accounts/all").into_response()
}
