use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;

use crate::models::AppState;
use crate::services::{random_session_id, verify_password};
use crate::templates::LoginTemplate;

use super::helpers::{build_template_globals, current_operator_username, render_template, TemplateGlobals};

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn login_get(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if current_operator_username(&state, &jar).is_some() {
        return Redirect::to("/accounts").into_response();
    }
    let TemplateGlobals {
        current_operator,
        api_hostname,
        base_url,
        flash_messages,
        has_flash_messages,
    } = build_template_globals(&state, &jar);
    render_template(LoginTemplate {
        current_operator,
        api_hostname,
        base_url,
        flash_messages,
        has_flash_messages,
        error: None,
    })
}

pub async fn login_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> impl IntoResponse {
    let uname = form.username.trim().to_lowercase();
    let operators = state.operators.lock().unwrap();
    if let Some(record) = operators.get(&uname) {
        if verify_password(&record.password, &form.password) {
            drop(operators);
            let sid = random_session_id();
            state.sessions.lock().unwrap().insert(sid.clone(), uname);
            let mut cookie = Cookie::new("session_id", sid);
            cookie.set_path("/");
            cookie.set_http_only(true);
            return (jar.add(cookie), Redirect::to("/accounts")).into_response();
        }
    }
    drop(operators);
    let TemplateGlobals {
        current_operator,
        api_hostname,
        base_url,
        flash_messages,
        has_flash_messages,
    } = build_template_globals(&state, &jar);
    render_template(LoginTemplate {
        current_operator,
        api_hostname,
        base_url,
        flash_messages,
        has_flash_messages,
        error: Some("Invalid credentials".into()),
    })
}

pub async fn logout_post(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(sid) = jar.get("session_id").map(|c| c.value().to_string()) {
        state.sessions.lock().unwrap().remove(&sid);
    }
    let cleared = jar.remove(Cookie::new("session_id", ""));
    (cleared, Redirect::to("/login")).into_response()
}

pub async fn root_get(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if current_operator_username(&state, &jar).is_some() {
        return Redirect::to("/accounts").into_response();
    }
    Redirect::to("/login").into_response()
}
