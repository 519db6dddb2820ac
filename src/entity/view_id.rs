use std::fmt;
use std::str::FromStr;

/// Logical screen identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewId {
    #[default]
    Dashboard,
    NewTransaction,
    Profile,
    Statement,
    Support,
    Docs,
    AdminStatement,
    Customers,
    AllTransactions,
    Settings,
    SupportInbox,
}

impl ViewId {
    pub const ALL: [ViewId; 11] = [
        ViewId::Dashboard,
        ViewId::NewTransaction,
        ViewId::Profile,
        ViewId::Statement,
        ViewId::Support,
        ViewId::Docs,
        ViewId::AdminStatement,
        ViewId::Customers,
        ViewId::AllTransactions,
        ViewId::Settings,
        ViewId::SupportInbox,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewId::Dashboard => "dashboard",
            ViewId::NewTransaction => "new-transaction",
            ViewId::Profile => "profile",
            ViewId::Statement => "statement",
            ViewId::Support => "support",
            ViewId::Docs => "docs",
            ViewId::AdminStatement => "admin-statement",
            ViewId::Customers => "customers",
            ViewId::AllTransactions => "all-transactions",
            ViewId::Settings => "settings",
            ViewId::SupportInbox => "support-inbox",
        }
    }

    pub fn is_admin_only(self) -> bool {
        matches!(
            self,
            ViewId::AdminStatement
                | ViewId::Customers
                | ViewId::AllTransactions
                | ViewId::Settings
                | ViewId::SupportInbox
        )
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ViewId::ALL
            .iter()
            .copied()
            .find(|view| view.as_str() == wanted)
            .ok_or_else(|| format!("Unknown view: {}", s))
    }
}
