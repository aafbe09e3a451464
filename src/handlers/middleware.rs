use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::handlers::helpers::current_operator_username;
use crate::models::AppState;

pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    if current_operator_username(&state, &jar).is_some() {
        next.run(request).await
    } else {
        Redirect::to("/login").into_response()
    }
}
