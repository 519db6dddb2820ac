//! Terminal shell: owns the session store, the router and the mounted
//! screen, and turns console commands into presenter calls.

use anyhow::Result;
use log::{debug, info};
use std::sync::Arc;

use crate::console::{register_commands, ConsoleCommand};
use crate::context::SessionStore;
use crate::di::ServiceContainer;
use crate::entity::{Identity, ViewId};
use crate::presenter::admin_transactions_presenter::AdminTransactionsPresenter;
use crate::presenter::auth_presenter::AuthPresenter;
use crate::presenter::customers_presenter::CustomersPresenter;
use crate::presenter::dashboard_presenter::DashboardPresenter;
use crate::presenter::new_transaction_presenter::NewTransactionPresenter;
use crate::presenter::profile_presenter::ProfilePresenter;
use crate::presenter::settings_presenter::SettingsPresenter;
use crate::presenter::statement_presenter::StatementPresenter;
use crate::presenter::support_presenter::SupportPresenter;
use crate::router::{menu_for, Router, Screen, ViewRouter};
use crate::supabase::AuthService;
use crate::view::shell_view::{ShellView, TerminalShellView};

const SIGN_IN_FIRST: &str = "Sign in first: login <email> <password>";

/// Presenter of the screen currently on display
pub enum ActiveScreen {
    SignedOut(Box<dyn AuthPresenter>),
    Dashboard(Box<dyn DashboardPresenter>),
    NewTransaction(Box<dyn NewTransactionPresenter>),
    Statement(Box<dyn StatementPresenter>),
    Customers(Box<dyn CustomersPresenter>),
    AdminTransactions(Box<dyn AdminTransactionsPresenter>),
    Settings(Box<dyn SettingsPresenter>),
    Profile(Box<dyn ProfilePresenter>),
    Support(Box<dyn SupportPresenter>),
    Placeholder(ViewId),
    Loading,
}

pub struct App {
    services: ServiceContainer,
    session: SessionStore,
    router: ViewRouter,
    shell: Arc<TerminalShellView>,
    screen: ActiveScreen,
    // What is mounted and for whom; a change of either remounts
    mounted: Option<(Screen, Identity)>,
}

impl App {
    pub fn new(services: ServiceContainer) -> Self {
        let session = services.session_store();
        let shell = services.shell_view();
        Self {
            services,
            session,
            router: ViewRouter::new(),
            shell,
            screen: ActiveScreen::Loading,
            mounted: None,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn router(&self) -> &ViewRouter {
        &self.router
    }

    pub fn screen(&self) -> &ActiveScreen {
        &self.screen
    }

    /// Restores the previous session and mounts the first screen.
    pub async fn start(&mut self) -> Result<()> {
        self.session.bootstrap().await;
        self.sync_screen().await
    }

    /// Handles one input line. Returns false when the user asked to quit.
    pub async fn handle_line(&mut self, line: &str) -> Result<bool> {
        if self.session.pump().await {
            self.sync_screen().await?;
        }

        if line.trim().is_empty() {
            return Ok(true);
        }

        let command = match line.parse::<ConsoleCommand>() {
            Ok(command) => command,
            Err(message) => {
                self.shell.display_message(&message).await?;
                self.shell.display_help(&register_commands()).await?;
                return Ok(true);
            }
        };
        debug!("Command: {:?}", command);

        if command == ConsoleCommand::Quit {
            self.unmount();
            return Ok(false);
        }

        self.dispatch(command).await?;

        if self.session.pump().await {
            self.sync_screen().await?;
        }
        Ok(true)
    }

    async fn dispatch(&mut self, command: ConsoleCommand) -> Result<()> {
        match command {
            ConsoleCommand::Help => self.shell.display_help(&register_commands()).await,
            ConsoleCommand::Menu => match self.session.context().identity().cloned() {
                Some(identity) => {
                    let entries = menu_for(Some(&identity));
                    self.shell
                        .display_menu(&identity, &entries, self.router.current_view())
                        .await
                }
                None => self.not_signed_in().await,
            },
            ConsoleCommand::Logout => {
                // The auth service may hold a session the store never accepted
                let signed_in = self.session.context().session.is_some()
                    || matches!(self.services.auth().current_session().await, Ok(Some(_)));
                if !signed_in {
                    return self.not_signed_in().await;
                }
                self.session.sign_out().await;
                self.router.reset();
                self.sync_screen().await
            }
            ConsoleCommand::Go(view) => {
                let Some(identity) = self.session.context().identity().cloned() else {
                    return self.not_signed_in().await;
                };
                // Denied views fall back to the default view; the router logs it
                self.router.change_view(view, Some(&identity));
                self.mounted = None;
                self.sync_screen().await
            }
            ConsoleCommand::Refresh => {
                self.mounted = None;
                self.sync_screen().await
            }
            other => self.dispatch_to_screen(other).await,
        }
    }

    async fn dispatch_to_screen(&mut self, command: ConsoleCommand) -> Result<()> {
        use ConsoleCommand as C;

        let saves_profile = matches!(self.screen, ActiveScreen::Profile(_)) && command == C::Save;
        if saves_profile {
            let saved = match &mut self.screen {
                ActiveScreen::Profile(profile) => profile.save().await?,
                _ => false,
            };
            if saved {
                // Role and status changes only show up through a re-fetch
                self.session.refresh_identity().await;
                self.sync_screen().await?;
            }
            return Ok(());
        }

        let shell = self.shell.clone();
        match (&mut self.screen, command) {
            (ActiveScreen::SignedOut(auth), C::Login { email, password }) => {
                auth.login(&email, &password).await.map(|_| ())
            }
            (ActiveScreen::SignedOut(auth), C::Register(form)) => {
                auth.register(form).await.map(|_| ())
            }
            (_, C::Login { .. }) | (_, C::Register(_)) => shell
                .display_message("Already signed in. Type `logout` first.")
                .await,
            (ActiveScreen::SignedOut(_), _) => shell
                .display_message(SIGN_IN_FIRST)
                .await,

            (ActiveScreen::NewTransaction(swap), C::Amount(text)) => swap.set_amount(&text).await,
            (ActiveScreen::NewTransaction(swap), C::Wallet(text)) => swap.set_wallet(&text).await,
            (ActiveScreen::NewTransaction(swap), C::Submit) => swap.submit().await,
            (ActiveScreen::NewTransaction(swap), C::New) => swap.new_swap().await,

            (ActiveScreen::Statement(list), C::Search(text)) => list.search(&text).await,
            (ActiveScreen::Statement(list), C::From(text)) => list.set_from(&text).await,
            (ActiveScreen::Statement(list), C::To(text)) => list.set_to(&text).await,
            (ActiveScreen::Statement(list), C::Clear) => list.clear_filters().await,

            (ActiveScreen::Customers(list), C::Search(text)) => list.search(&text).await,
            (ActiveScreen::Customers(list), C::Clear) => list.clear_filters().await,
            (ActiveScreen::Customers(list), C::Edit(target)) => list.edit(&target).await,
            (ActiveScreen::Customers(list), C::Delete(target)) => {
                list.request_delete(&target).await
            }
            (ActiveScreen::Customers(list), C::Role(target)) => {
                list.request_role_toggle(&target).await
            }
            (ActiveScreen::Customers(list), C::Block(target)) => {
                list.request_block_toggle(&target).await
            }
            (ActiveScreen::Customers(list), C::Set { field, value }) => {
                list.set_field(&field, &value).await
            }
            (ActiveScreen::Customers(list), C::Save) => list.save().await,
            (ActiveScreen::Customers(list), C::Confirm) => list.confirm().await,
            (ActiveScreen::Customers(list), C::Cancel) => list.cancel().await,

            (ActiveScreen::AdminTransactions(list), C::Search(text)) => list.search(&text).await,
            (ActiveScreen::AdminTransactions(list), C::Status(text)) => {
                list.filter_status(&text).await
            }
            (ActiveScreen::AdminTransactions(list), C::From(text)) => list.set_from(&text).await,
            (ActiveScreen::AdminTransactions(list), C::To(text)) => list.set_to(&text).await,
            (ActiveScreen::AdminTransactions(list), C::Clear) => list.clear_filters().await,
            (ActiveScreen::AdminTransactions(list), C::Approve(target)) => {
                list.request_approve(&target).await
            }
            (ActiveScreen::AdminTransactions(list), C::Reject(target)) => {
                list.request_reject(&target).await
            }
            (ActiveScreen::AdminTransactions(list), C::Confirm) => list.confirm().await,
            (ActiveScreen::AdminTransactions(list), C::Cancel) => list.cancel().await,

            (ActiveScreen::Settings(settings), C::Set { field, value }) => {
                settings.set_field(&field, &value).await
            }
            (ActiveScreen::Settings(settings), C::Save) => settings.save().await,

            (ActiveScreen::Profile(profile), C::Set { field, value }) => {
                profile.set_field(&field, &value).await
            }

            (_, command) => shell
                .display_message(&format!(
                    "`{}` is not available here. Type `help` for the command list.",
                    command_name(&command)
                ))
                .await,
        }
    }


    /// Mounts the screen matching the session and router state, unless it
    /// is already on display.
    async fn sync_screen(&mut self) -> Result<()> {
        let context = self.session.context();
        let identity = match (context.is_authenticated(), context.identity().cloned()) {
            (true, Some(identity)) => identity,
            _ => return self.show_signed_out().await,
        };

        let screen = self.router.screen(Some(&identity));
        if self
            .mounted
            .as_ref()
            .is_some_and(|(mounted, viewer)| *mounted == screen && *viewer == identity)
        {
            return Ok(());
        }

        self.unmount();
        info!("Mounting {:?} for {}", screen, identity.id);
        self.mounted = Some((screen, identity.clone()));

        let services = &self.services;
        self.screen = match screen {
            Screen::ClientDashboard | Screen::AdminDashboard => {
                let mut presenter = services.dashboard_presenter(identity);
                presenter.mount().await?;
                ActiveScreen::Dashboard(presenter)
            }
            Screen::NewTransaction => {
                let mut presenter = services.new_transaction_presenter(identity.id);
                presenter.mount().await?;
                ActiveScreen::NewTransaction(presenter)
            }
            Screen::Statement { all_customers } => {
                let mut presenter = services.statement_presenter(identity, all_customers);
                presenter.mount().await?;
                ActiveScreen::Statement(presenter)
            }
            Screen::Customers => {
                let mut presenter = services.customers_presenter(identity);
                presenter.mount().await?;
                ActiveScreen::Customers(presenter)
            }
            Screen::AllTransactions => {
                let mut presenter = services.admin_transactions_presenter(identity);
                presenter.mount().await?;
                ActiveScreen::AdminTransactions(presenter)
            }
            Screen::Settings => {
                let mut presenter = services.settings_presenter(identity);
                presenter.mount().await?;
                ActiveScreen::Settings(presenter)
            }
            Screen::Profile => {
                let mut presenter = services.profile_presenter(identity);
                presenter.mount().await?;
                ActiveScreen::Profile(presenter)
            }
            Screen::Support => {
                let mut presenter = services.support_presenter();
                presenter.mount().await?;
                ActiveScreen::Support(presenter)
            }
            Screen::Placeholder(view) => {
                self.shell.display_placeholder(view).await?;
                ActiveScreen::Placeholder(view)
            }
        };
        Ok(())
    }

    async fn show_signed_out(&mut self) -> Result<()> {
        let notice = self.session.take_notice();

        if let ActiveScreen::SignedOut(auth) = &mut self.screen {
            // The login form already reported its own failure
            if auth.error().is_none() && notice.is_some() {
                auth.mount(notice).await?;
            }
            return Ok(());
        }

        self.unmount();
        self.mounted = None;
        self.router.reset();

        let mut auth = self.services.auth_presenter();
        auth.mount(notice).await?;
        self.screen = ActiveScreen::SignedOut(auth);
        Ok(())
    }

    fn unmount(&mut self) {
        if let ActiveScreen::NewTransaction(swap) = &mut self.screen {
            swap.unmount();
        }
    }

    async fn not_signed_in(&self) -> Result<()> {
        self.shell.display_message(SIGN_IN_FIRST).await
    }
}

fn command_name(command: &ConsoleCommand) -> String {
    format!("{:?}", command)
        .split(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or_default()
        .to_lowercase()
}
