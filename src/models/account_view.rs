/// Display-ready projection of an account record for the card templates.
#[derive(Clone, Debug)]
pub struct AccountView {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub status_class: String,
    pub status_display: String,
    pub created_display: String,
    pub ovpn_username: Option<String>,
    pub max_devices_display: Option<String>,
    pub can_approve: bool,
    pub can_download: bool,
}
