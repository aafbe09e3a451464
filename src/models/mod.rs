pub mod account_record;
pub mod account_view;
pub mod app_state;
pub mod current_operator;
pub mod flash_message;
pub mod operator_record;
pub mod tab;

pub use account_record::{AccountRecord, AccountStatus};
pub use account_view::AccountView;
pub use app_state::AppState;
pub use current_operator::CurrentOperator;
pub use flash_message::{FlashKind, FlashMessage};
pub use operator_record::OperatorRecord;
pub use tab::{Tab, TabLink};
