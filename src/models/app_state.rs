use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::flash_message::FlashMessage;
use crate::models::operator_record::OperatorRecord;

#[derive(Clone)]
pub struct AppState {
    pub operators: Arc<Mutex<HashMap<String, OperatorRecord>>>,
    pub sessions: Arc<Mutex<HashMap<String, String>>>,
    pub flash_store: Arc<Mutex<HashMap<String, Vec<FlashMessage>>>>,
    pub api_base_url: String,
    pub api_token: String,
    pub public_base_url: String,
    pub client: reqwest::Client,
    pub custom_css: Option<String>,
}
