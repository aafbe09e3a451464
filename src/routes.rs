use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::models::AppState;

// Embedded assets so the binary runs without a deploy directory.
const DEFAULT_STYLESHEET: &str = include_str!("../static/styles.css");
const PANEL_SCRIPT: &str = include_str!("../static/panel.js");

pub fn build_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/accounts", get(handlers::accounts::accounts_root))
        .route("/accounts/:tab", get(handlers::accounts::accounts_tab))
        .route(
            "/account/:id/approve",
            get(handlers::approval::approve_get).post(handlers::approval::approve_post),
        )
        .route(
            "/account/:id/delete",
            get(handlers::actions::delete_confirm_get).post(handlers::actions::delete_post),
        )
        // The path parameter here is the account's username; downloads
        // are addressed by name in the backend contract.
        .route("/account/:id/download", post(handlers::actions::download_post))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            handlers::middleware::auth_middleware,
        ));

    // Serve the embedded stylesheet unless a custom one was provided.
    let stylesheet_content = state
        .custom_css
        .clone()
        .unwrap_or_else(|| DEFAULT_STYLESHEET.to_string());

    Router::new()
        .route("/", get(handlers::auth::root_get))
        .route(
            "/login",
            get(handlers::auth::login_get).post(handlers::auth::login_post),
        )
        .route("/logout", post(handlers::auth::logout_post))
        .route(
            "/static/styles.css",
            get(move || {
                let css = stylesheet_content.clone();
                async move { ([(axum::http::header::CONTENT_TYPE, "text/css")], css) }
            }),
        )
        .route(
            "/static/panel.js",
            get(|| async {
                (
                    [(axum::http::header::CONTENT_TYPE, "text/javascript")],
                    PANEL_SCRIPT,
                )
            }),
        )
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
