use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::api::load_accounts;
use crate::models::{AppState, Tab};
use crate::services::{build_views, filter_for_tab};
use crate::templates::AccountsPageTemplate;

use super::helpers::{build_template_globals, render_template, TemplateGlobals};

/// The landing tab is pending review, same as the original panel.
pub async fn accounts_root() -> Redirect {
    Redirect::to("/accounts/pending")
}

/// One tab view. The tab is an explicit path parameter, never ambient
/// state, so programmatic navigation behaves the same as a click. Each
/// request re-fetches the complete list from the backend and filters in
/// memory; nothing is cached across tab switches.
pub async fn accounts_tab(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(tab): Path<String>,
) -> Response {
    let Some(tab) = Tab::from_slug(&tab) else {
        return Redirect::to("/accounts/pending").into_response();
    };

    let loaded = load_accounts(&state.client, &state.api_base_url, &state.api_token).await;

    let TemplateGlobals {
        current_operator,
        api_hostname,
        base_url,
        flash_messages,
        has_flash_messages,
    } = build_template_globals(&state, &jar);

    match loaded {
        Ok(records) => {
            let filtered = filter_for_tab(tab, records);
            render_template(AccountsPageTemplate {
                current_operator,
                api_hostname,
                base_url,
                flash_messages,
                has_flash_messages,
                tabs: Tab::links(tab),
                accounts: build_views(&filtered),
                load_error: None,
            })
        }
        Err(e) => {
            tracing::error!(%e, tab = tab.slug(), "Failed to load accounts from backend");
            render_template(AccountsPageTemplate {
                current_operator,
                api_hostname,
                base_url,
                flash_messages,
                has_flash_messages,
                tabs: Tab::links(tab),
                accounts: vec![],
                load_error: Some(format!("Failed to load accounts: {}", e)),
            })
        }
    }
}
