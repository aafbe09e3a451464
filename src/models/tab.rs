use crate::models::account_record::{AccountRecord, AccountStatus};

/// A named view over the account list, filtering by status. Tabs are
/// registered here once; routes, templates and the CLI all iterate this
/// registry instead of hard-coding tab names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Pending,
    Approved,
    All,
}

impl Tab {
    pub const REGISTRY: [Tab; 3] = [Tab::Pending, Tab::Approved, Tab::All];

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::REGISTRY.iter().copied().find(|t| t.slug() == slug)
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Tab::Pending => "pending",
            Tab::Approved => "approved",
            Tab::All => "all",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Pending => "Pending review",
            Tab::Approved => "Provisioned",
            Tab::All => "All accounts",
        }
    }

    pub fn matches(&self, record: &AccountRecord) -> bool {
        match self {
            Tab::Pending => record.status == AccountStatus::Pending,
            Tab::Approved => record.status == AccountStatus::Approved,
            Tab::All => true,
        }
    }

    /// Tab buttons for a page render; exactly one entry is active.
    pub fn links(active: Tab) -> Vec<TabLink> {
        Self::REGISTRY
            .iter()
            .map(|t| TabLink {
                slug: t.slug(),
                title: t.title(),
                active: *t == active,
            })
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct TabLink {
    pub slug: &'static str,
    pub title: &'static str,
    pub active: bool,
}
