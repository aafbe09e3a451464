use askama::Template;

use crate::models::{AccountView, CurrentOperator, FlashMessage, TabLink};

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub current_operator: Option<CurrentOperator>,
    pub api_hostname: String,
    pub base_url: String,
    pub flash_messages: Vec<FlashMessage>,
    pub has_flash_messages: bool,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "accounts.html")]
pub struct AccountsPageTemplate {
    pub current_operator: Option<CurrentOperator>,
    pub api_hostname: String,
    pub base_url: String,
    pub flash_messages: Vec<FlashMessage>,
    pub has_flash_messages: bool,
    pub tabs: Vec<TabLink>,
    pub accounts: Vec<AccountView>,
    pub load_error: Option<String>,
}

#[derive(Template)]
#[template(path = "approve.html")]
pub struct ApproveTemplate {
    pub current_operator: Option<CurrentOperator>,
    pub api_hostname: String,
    pub base_url: String,
    pub flash_messages: Vec<FlashMessage>,
    pub has_flash_messages: bool,
    pub account_id: i64,
    pub username: String,
    pub ovpn_username: String,
    pub max_devices: u32,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub current_operator: Option<CurrentOperator>,
    pub api_hostname: String,
    pub base_url: String,
    pub flash_messages: Vec<FlashMessage>,
    pub has_flash_messages: bool,
    pub account: AccountView,
}
