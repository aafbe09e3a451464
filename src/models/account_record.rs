/// One VPN account entry as returned by the backend. The panel never
/// mutates these locally; status transitions happen backend-side and the
/// list is re-fetched after every mutating action.
#[derive(Clone, Debug)]
pub struct AccountRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub status: AccountStatus,
    pub created_at: String,
    pub approved_at: Option<String>,
    pub ovpn_username: Option<String>,
    pub max_devices: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountStatus {
    Pending,
    Approved,
    Rejected,
    Suspended,
    /// Statuses this panel does not know about are carried through
    /// verbatim rather than dropped.
    Other(String),
}

impl AccountStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "pending" => Self::Pending,
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            "suspended" => Self::Suspended,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Suspended => "suspended",
            Self::Other(raw) => raw,
        }
    }

    /// Fixed status-to-label table for the card display.
    pub fn display_label(&self) -> &str {
        match self {
            Self::Pending => "pending review",
            Self::Approved => "provisioned",
            Self::Rejected => "rejected",
            Self::Suspended => "suspended",
            Self::Other(raw) => raw,
        }
    }
}
