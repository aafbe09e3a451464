use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::models::{AppState, CurrentOperator, FlashKind, FlashMessage};

pub fn session_id_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get("session_id").map(|c| c.value().to_string())
}

pub fn current_operator_username(state: &AppState, jar: &CookieJar) -> Option<String> {
    let sid = session_id_from_jar(jar)?;
    state.sessions.lock().unwrap().get(&sid).cloned()
}

pub fn build_current_operator(state: &AppState, jar: &CookieJar) -> Option<CurrentOperator> {
    let username = current_operator_username(state, jar)?;
    let operators = state.operators.lock().unwrap();
    operators.get(&username)?;
    Some(CurrentOperator { username })
}

/// Drain the session's pending notifications; each is rendered exactly
/// once and then gone.
pub fn take_flash_messages(state: &AppState, jar: &CookieJar) -> Vec<FlashMessage> {
    let Some(sid) = session_id_from_jar(jar) else {
        return vec![];
    };
    let mut fs = state.flash_store.lock().unwrap();
    fs.remove(&sid).unwrap_or_default()
}

/// Queue a notification banner for the session's next render. Banners
/// stack; the page script dismisses each on its own 3-second timer.
pub fn push_flash(state: &AppState, jar: &CookieJar, kind: FlashKind, text: impl Into<String>) {
    if let Some(sid) = session_id_from_jar(jar) {
        let mut fs = state.flash_store.lock().unwrap();
        fs.entry(sid).or_default().push(FlashMessage::new(kind, text));
    }
}

#[derive(Default)]
pub struct TemplateGlobals {
    pub current_operator: Option<CurrentOperator>,
    pub api_hostname: String,
    pub base_url: String,
    pub flash_messages: Vec<FlashMessage>,
    pub has_flash_messages: bool,
}

pub fn build_template_globals(state: &AppState, jar: &CookieJar) -> TemplateGlobals {
    let current_operator = build_current_operator(state, jar);
    let flash_messages = take_flash_messages(state, jar);
    let has_flash_messages = !flash_messages.is_empty();
    TemplateGlobals {
        current_operator,
        api_hostname: crate::utils::hostname_from_url(&state.api_base_url),
        base_url: state.public_base_url.clone(),
        flash_messages,
        has_flash_messages,
    }
}

pub fn render_template<T: askama::Template>(t: T) -> Response {
    match t.render() {
        Ok(body) => axum::response::Html(body).into_response(),
        Err(e) => {
            tracing::error!(%e, "Template render error");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}
