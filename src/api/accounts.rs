use serde_json::Value;

use crate::models::{AccountRecord, AccountStatus};
use crate::utils::absolute_url;

use super::client::api_call;
use super::error::ApiError;

/// Payload for `POST /api/users/{id}/approve`. Exactly these three
/// fields cross the wire; the confirmation password never leaves the
/// panel.
#[derive(Clone, Debug)]
pub struct ApprovalRequest {
    pub ovpn_username: String,
    pub password: String,
    pub max_devices: u32,
}

#[derive(Clone, Debug)]
pub struct DownloadLink {
    pub download_url: String,
    pub actual_filename: String,
}

/// Load the full account list from the backend. The backend's ordering
/// is preserved; filtering happens in memory on the caller's side.
pub async fn load_accounts(
    client: &reqwest::Client,
    api_base_url: &str,
    api_token: &str,
) -> Result<Vec<AccountRecord>, ApiError> {
    let payload = api_call(client, api_base_url, api_token, "GET", "/api/users", None).await?;
    let arr = payload
        .as_array()
        .ok_or_else(|| ApiError::InvalidResponse("expected a JSON array of accounts".into()))?;
    Ok(arr.iter().filter_map(parse_account).collect())
}

fn parse_account(item: &Value) -> Option<AccountRecord> {
    let obj = item.as_object()?;
    let id = obj.get("id").and_then(|v| v.as_i64())?;
    let username = obj.get("username").and_then(|v| v.as_str()).unwrap_or("").to_string();
    let email = obj.get("email").and_then(|v| v.as_str()).unwrap_or("").to_string();
    let status = AccountStatus::parse(obj.get("status").and_then(|v| v.as_str()).unwrap_or(""));
    let created_at = obj.get("created_at").and_then(|v| v.as_str()).unwrap_or("").to_string();
    let approved_at = obj.get("approved_at").and_then(|v| v.as_str()).map(|s| s.to_string());
    let ovpn_username = obj.get("ovpn_username").and_then(|v| v.as_str()).map(|s| s.to_string());
    let max_devices = obj.get("max_devices").and_then(|v| v.as_i64());
    Some(AccountRecord {
        id,
        username,
        email,
        status,
        created_at,
        approved_at,
        ovpn_username,
        max_devices,
    })
}

/// Ask the backend to provision the account. The backend owns the
/// status transition; callers re-fetch the list afterwards.
pub async fn approve_account(
    client: &reqwest::Client,
    api_base_url: &str,
    api_token: &str,
    account_id: i64,
    request: &ApprovalRequest,
) -> Result<(), ApiError> {
    let body = serde_json::json!({
        "ovpn_username": request.ovpn_username,
        "password": request.password,
        "max_devices": request.max_devices,
    });
    let endpoint = format!("/api/users/{}/approve", account_id);
    let payload = api_call(client, api_base_url, api_token, "POST", &endpoint, Some(body)).await?;
    expect_success(&payload)
}

/// Request a short-lived download link for an approved account's
/// OpenVPN config file.
pub async fn generate_download(
    client: &reqwest::Client,
    api_base_url: &str,
    api_token: &str,
    username: &str,
) -> Result<DownloadLink, ApiError> {
    let endpoint = format!("/api/users/{}/generate_download", urlencoding::encode(username));
    let payload = api_call(client, api_base_url, api_token, "POST", &endpoint, None).await?;
    expect_success(&payload)?;
    let download_url = payload
        .get("download_url")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ApiError::InvalidResponse("missing download_url".into()))?
        .to_string();
    let actual_filename = payload
        .get("actual_filename")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("{}.ovpn", username));
    Ok(DownloadLink { download_url, actual_filename })
}

pub async fn delete_account(
    client: &reqwest::Client,
    api_base_url: &str,
    api_token: &str,
    account_id: i64,
) -> Result<(), ApiError> {
    let endpoint = format!("/api/users/{}", account_id);
    let payload = api_call(client, api_base_url, api_token, "DELETE", &endpoint, None).await?;
    expect_success(&payload)
}

/// Fetch the config file behind a generated download link. Returns the
/// raw response so callers can stream the body instead of buffering it.
pub async fn fetch_config_file(
    client: &reqwest::Client,
    api_base_url: &str,
    api_token: &str,
    download_url: &str,
) -> Result<reqwest::Response, ApiError> {
    let url = absolute_url(api_base_url, download_url);
    let mut req = client.get(&url);
    if !api_token.is_empty() {
        req = req.header("API-Token", api_token);
    }
    let resp = req
        .send()
        .await
        .map_err(|e| ApiError::Network(format!("request failed: {}", e)))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ApiError::Network(format!("backend returned HTTP {}", status)));
    }
    Ok(resp)
}

fn expect_success(payload: &Value) -> Result<(), ApiError> {
    if payload.get("success").and_then(|v| v.as_bool()).unwrap_or(false) {
        return Ok(());
    }
    let message = payload
        .get("error")
        .and_then(|v| v.as_str())
        .unwrap_or("backend reported failure")
        .to_string();
    Err(ApiError::Backend(message))
}
