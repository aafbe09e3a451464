use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use yansi::Paint;

use super::error::ApiError;

static SILENT: AtomicBool = AtomicBool::new(false);

pub fn set_silent(silent: bool) {
    SILENT.store(silent, Ordering::Relaxed);
}

fn log_output(msg: String) {
    if !SILENT.load(Ordering::Relaxed) {
        println!("{}", msg);
    }
}

/// Core HTTP client function for talking to the VPN backend.
/// Handles authentication headers, request building and the transport
/// error taxonomy; callers interpret the returned JSON payload.
pub async fn api_call(
    client: &reqwest::Client,
    api_base_url: &str,
    api_token: &str,
    method: &str,
    endpoint: &str,
    body: Option<Value>,
) -> Result<Value, ApiError> {
    // --- Curl Logging ---
    let url = format!("{}{}", api_base_url, endpoint);
    let mut parts = Vec::new();
    parts.push(Paint::new("curl").fg(yansi::Color::Green).bold().to_string());
    parts.push(format!("-X {}", Paint::new(method).fg(yansi::Color::Yellow).bold()));
    parts.push(format!("'{}'", Paint::new(&url).fg(yansi::Color::Cyan)));

    if !api_token.is_empty() {
        parts.push(format!(
            "{} {}",
            Paint::new("-H").fg(yansi::Color::Magenta),
            Paint::new(format!("'API-Token: {}'", api_token)).fg(yansi::Color::Magenta)
        ));
    }
    if let Some(ref d) = body {
        let json_str = serde_json::to_string_pretty(d).unwrap_or_default();
        let escaped_json = json_str.replace('\'', "'\\''");
        parts.push(format!(
            "{} {}",
            Paint::new("-H").fg(yansi::Color::Magenta),
            Paint::new("'Content-Type: application/json'").fg(yansi::Color::Magenta)
        ));
        parts.push(format!(
            "{} {}",
            Paint::new("-d").fg(yansi::Color::Blue),
            Paint::new(format!("'{}'", escaped_json)).fg(yansi::Color::White)
        ));
    }
    log_output(format!("Request:\n{}", parts.join(" ")));
    // --------------------

    let mut req = match method {
        "GET" => client.get(&url),
        "POST" => client.post(&url),
        "PUT" => client.put(&url),
        "DELETE" => client.delete(&url),
        _ => client.get(&url),
    };

    if !api_token.is_empty() {
        req = req.header("API-Token", api_token);
    }
    if let Some(ref b) = body {
        req = req.json(b);
    }

    let resp = req
        .send()
        .await
        .map_err(|e| ApiError::Network(format!("request failed: {}", e)))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ApiError::Network(format!("backend returned HTTP {}", status)));
    }
    let result: Value = resp
        .json()
        .await
        .map_err(|e| ApiError::Network(format!("failed to parse response: {}", e)))?;

    let json_str = serde_json::to_string(&result).unwrap_or_else(|_| format!("{:?}", result));
    let response_str = Paint::new(json_str).rgb(100, 100, 100).to_string();
    log_output(format!("Response:\n{}", response_str));

    Ok(result)
}
