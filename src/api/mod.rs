pub mod accounts;
pub mod client;
pub mod error;

pub use accounts::{
    approve_account, delete_account, fetch_config_file, generate_download, load_accounts,
    ApprovalRequest, DownloadLink,
};
pub use client::api_call;
pub use error::ApiError;
