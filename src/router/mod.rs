use log::warn;

use crate::access::can_access;
use crate::entity::{Identity, ViewId};

/// Outcome of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Granted(ViewId),
    Redirected { requested: ViewId, to: ViewId },
}

/// Screen to mount for the current view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    ClientDashboard,
    AdminDashboard,
    NewTransaction,
    Profile,
    Statement { all_customers: bool },
    Support,
    Customers,
    AllTransactions,
    Settings,
    /// Known view without a screen yet
    Placeholder(ViewId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub view: ViewId,
    pub label: &'static str,
}

// Base router trait
pub trait Router: Send + Sync {
    fn current_view(&self) -> ViewId;
    fn change_view(&mut self, view: ViewId, identity: Option<&Identity>) -> Navigation;
    fn screen(&self, identity: Option<&Identity>) -> Screen;
}

/// Single-level view router; there is no history to go back through.
#[derive(Debug, Default)]
pub struct ViewRouter {
    current: ViewId,
}

impl ViewRouter {
    pub const DEFAULT_VIEW: ViewId = ViewId::Dashboard;

    pub fn new() -> Self {
        Self {
            current: Self::DEFAULT_VIEW,
        }
    }

    pub fn reset(&mut self) {
        self.current = Self::DEFAULT_VIEW;
    }
}

impl Router for ViewRouter {
    fn current_view(&self) -> ViewId {
        self.current
    }

    fn change_view(&mut self, view: ViewId, identity: Option<&Identity>) -> Navigation {
        if view.is_admin_only() && !can_access(identity, view) {
            warn!(
                "Access denied: {} tried to open {} without administrator rights",
                identity.map_or_else(|| "anonymous".to_string(), |i| i.id.to_string()),
                view
            );
            self.current = Self::DEFAULT_VIEW;
            return Navigation::Redirected {
                requested: view,
                to: Self::DEFAULT_VIEW,
            };
        }

        self.current = view;
        Navigation::Granted(view)
    }

    fn screen(&self, identity: Option<&Identity>) -> Screen {
        // Checked again here in case the identity changed after navigation
        let view = if can_access(identity, self.current) {
            self.current
        } else {
            Self::DEFAULT_VIEW
        };
        let is_admin = identity.is_some_and(|i| i.is_admin());

        match view {
            ViewId::Dashboard if is_admin => Screen::AdminDashboard,
            ViewId::Dashboard => Screen::ClientDashboard,
            ViewId::NewTransaction => Screen::NewTransaction,
            ViewId::Profile => Screen::Profile,
            ViewId::Statement => Screen::Statement {
                all_customers: false,
            },
            ViewId::AdminStatement => Screen::Statement {
                all_customers: true,
            },
            ViewId::Support => Screen::Support,
            ViewId::Customers => Screen::Customers,
            ViewId::AllTransactions => Screen::AllTransactions,
            ViewId::Settings => Screen::Settings,
            ViewId::Docs | ViewId::SupportInbox => Screen::Placeholder(view),
        }
    }
}

/// Sidebar entries for the signed-in identity.
pub fn menu_for(identity: Option<&Identity>) -> Vec<MenuEntry> {
    let client = [
        (ViewId::Dashboard, "Dashboard"),
        (ViewId::NewTransaction, "New transaction"),
        (ViewId::Statement, "Statement"),
        (ViewId::Docs, "How it works"),
        (ViewId::Support, "Support"),
        (ViewId::Profile, "Profile"),
    ];
    let admin = [
        (ViewId::Dashboard, "Overview"),
        (ViewId::Customers, "Customers"),
        (ViewId::AllTransactions, "All transactions"),
        (ViewId::AdminStatement, "Global statement"),
        (ViewId::Settings, "Settings"),
        (ViewId::SupportInbox, "Support tickets"),
        (ViewId::Profile, "Profile"),
    ];

    let entries: &[(ViewId, &'static str)] = match identity {
        Some(identity) if identity.is_admin() => &admin,
        _ => &client,
    };

    entries
        .iter()
        .filter(|(view, _)| can_access(identity, *view))
        .map(|&(view, label)| MenuEntry { view, label })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{AccountStatus, Role};
    use uuid::Uuid;

    fn identity(role: Role) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: None,
            full_name: None,
            role,
            status: AccountStatus::Active,
            whatsapp: None,
            telegram: None,
            created_at: None,
        }
    }

    #[test]
    fn client_is_redirected_from_admin_views() {
        let client = identity(Role::Client);
        let mut router = ViewRouter::new();
        router.change_view(ViewId::Statement, Some(&client));

        let nav = router.change_view(ViewId::Customers, Some(&client));
        assert_eq!(
            nav,
            Navigation::Redirected {
                requested: ViewId::Customers,
                to: ViewId::Dashboard
            }
        );
        assert_eq!(router.current_view(), ViewId::Dashboard);
    }

    #[test]
    fn admin_reaches_admin_views() {
        let admin = identity(Role::Admin);
        let mut router = ViewRouter::new();
        assert_eq!(
            router.change_view(ViewId::AllTransactions, Some(&admin)),
            Navigation::Granted(ViewId::AllTransactions)
        );
        assert_eq!(router.screen(Some(&admin)), Screen::AllTransactions);
        router.change_view(ViewId::AdminStatement, Some(&admin));
        assert_eq!(
            router.screen(Some(&admin)),
            Screen::Statement {
                all_customers: true
            }
        );
    }

    #[test]
    fn render_guard_catches_demoted_identity() {
        let mut admin = identity(Role::Admin);
        let mut router = ViewRouter::new();
        router.change_view(ViewId::Settings, Some(&admin));

        // Role changed underneath the router
        admin.role = Role::Client;
        assert_eq!(router.screen(Some(&admin)), Screen::ClientDashboard);
    }

    #[test]
    fn dashboard_depends_on_role() {
        let router = ViewRouter::new();
        assert_eq!(router.screen(Some(&identity(Role::Admin))), Screen::AdminDashboard);
        assert_eq!(router.screen(Some(&identity(Role::Client))), Screen::ClientDashboard);
    }

    #[test]
    fn unimplemented_views_are_placeholders() {
        let client = identity(Role::Client);
        let mut router = ViewRouter::new();
        router.change_view(ViewId::Docs, Some(&client));
        assert_eq!(router.screen(Some(&client)), Screen::Placeholder(ViewId::Docs));
    }

    #[test]
    fn menus_match_role() {
        let client_menu = menu_for(Some(&identity(Role::Client)));
        assert!(client_menu.iter().all(|entry| !entry.view.is_admin_only()));
        let admin_menu = menu_for(Some(&identity(Role::Admin)));
        assert!(admin_menu.iter().any(|entry| entry.view == ViewId::Customers));
        assert!(menu_for(None).is_empty());
    }
}
