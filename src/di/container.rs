use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::Result;
use log::info;
use uuid::Uuid;

use crate::config::{AppConfig, BackendKind};
use crate::context::SessionStore;
use crate::entity::{FeeSchedule, Identity};
use crate::interactor::admin_transaction_interactor::AdminTransactionInteractorImpl;
use crate::interactor::auth_interactor::AuthInteractorImpl;
use crate::interactor::customer_interactor::CustomerInteractorImpl;
use crate::interactor::dashboard_interactor::DashboardInteractorImpl;
use crate::interactor::profile_interactor::ProfileInteractorImpl;
use crate::interactor::quote_interactor::{QuoteInteractor, QuoteInteractorImpl};
use crate::interactor::settings_interactor::SettingsInteractorImpl;
use crate::interactor::statement_interactor::StatementInteractorImpl;
use crate::interactor::swap_interactor::SwapInteractorImpl;
use crate::market::{BinancePriceService, PriceService};
use crate::presenter::admin_transactions_presenter::{
    AdminTransactionsPresenter, AdminTransactionsPresenterImpl,
};
use crate::presenter::auth_presenter::{AuthPresenter, AuthPresenterImpl};
use crate::presenter::customers_presenter::{CustomersPresenter, CustomersPresenterImpl};
use crate::presenter::dashboard_presenter::{DashboardPresenter, DashboardPresenterImpl};
use crate::presenter::new_transaction_presenter::{
    NewTransactionPresenter, NewTransactionPresenterImpl,
};
use crate::presenter::profile_presenter::{ProfilePresenter, ProfilePresenterImpl};
use crate::presenter::settings_presenter::{SettingsPresenter, SettingsPresenterImpl};
use crate::presenter::statement_presenter::{StatementPresenter, StatementPresenterImpl};
use crate::presenter::support_presenter::{SupportPresenter, SupportPresenterImpl};
use crate::services::QuoteTicker;
use crate::supabase::auth_service::SessionHandle;
use crate::supabase::{
    AuthService, GoTrueAuthService, MemoryBackend, PostgrestClient, ProfileRepository,
    SettingsRepository, TransactionRepository,
};
use crate::view::admin_transactions_view::TerminalAdminTransactionsView;
use crate::view::auth_view::TerminalAuthView;
use crate::view::customers_view::TerminalCustomersView;
use crate::view::dashboard_view::TerminalDashboardView;
use crate::view::new_transaction_view::TerminalNewTransactionView;
use crate::view::profile_view::TerminalProfileView;
use crate::view::settings_view::TerminalSettingsView;
use crate::view::shell_view::TerminalShellView;
use crate::view::statement_view::TerminalStatementView;
use crate::view::support_view::TerminalSupportView;
use crate::view::terminal::Terminal;

/// ServiceContainer wires backends, interactors, presenters and views together
pub struct ServiceContainer {
    config: AppConfig,
    terminal: Terminal,
    fees: FeeSchedule,

    // Backend
    auth: Arc<dyn AuthService>,
    profiles: Arc<dyn ProfileRepository>,
    transactions: Arc<dyn TransactionRepository>,
    settings: Arc<dyn SettingsRepository>,

    // Market data
    price_service: Arc<dyn PriceService>,
}

impl ServiceContainer {
    /// Create a container for the configured backend, printing to stdout
    pub fn new(config: AppConfig) -> Result<Self> {
        match config.backend {
            BackendKind::Rest => {
                let session: SessionHandle = Arc::new(RwLock::new(None));
                let auth = Arc::new(GoTrueAuthService::new(
                    &config.supabase_url,
                    &config.supabase_anon_key,
                    session.clone(),
                    config.session_file.as_str(),
                ));
                let data = Arc::new(PostgrestClient::new(
                    &config.supabase_url,
                    &config.supabase_anon_key,
                    session,
                ));
                info!("Using backend at {}", config.supabase_url);

                let price_service = Arc::new(BinancePriceService::new(&config.price_api_url));
                Ok(Self::with_services(
                    config,
                    Terminal::stdout(),
                    auth,
                    data.clone(),
                    data.clone(),
                    data,
                    price_service,
                ))
            }
            BackendKind::Memory => {
                info!("Using the in-memory demo backend");
                let price_service = Arc::new(BinancePriceService::new(&config.price_api_url));
                Ok(Self::in_memory(
                    config,
                    Terminal::stdout(),
                    Arc::new(MemoryBackend::demo()),
                    price_service,
                ))
            }
        }
    }

    /// Container over an in-memory backend
    pub fn in_memory(
        config: AppConfig,
        terminal: Terminal,
        backend: Arc<MemoryBackend>,
        price_service: Arc<dyn PriceService>,
    ) -> Self {
        Self::with_services(
            config,
            terminal,
            backend.clone(),
            backend.clone(),
            backend.clone(),
            backend,
            price_service,
        )
    }

    pub fn with_services(
        config: AppConfig,
        terminal: Terminal,
        auth: Arc<dyn AuthService>,
        profiles: Arc<dyn ProfileRepository>,
        transactions: Arc<dyn TransactionRepository>,
        settings: Arc<dyn SettingsRepository>,
        price_service: Arc<dyn PriceService>,
    ) -> Self {
        Self {
            config,
            terminal,
            fees: FeeSchedule::default(),
            auth,
            profiles,
            transactions,
            settings,
            price_service,
        }
    }

    // Accessor methods

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn terminal(&self) -> Terminal {
        self.terminal.clone()
    }

    pub fn auth(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    pub fn profiles(&self) -> Arc<dyn ProfileRepository> {
        self.profiles.clone()
    }

    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(self.auth.clone(), self.profiles.clone())
    }

    pub fn shell_view(&self) -> Arc<TerminalShellView> {
        Arc::new(TerminalShellView::new(self.terminal()))
    }

    fn settings_interactor(&self) -> Arc<SettingsInteractorImpl> {
        Arc::new(SettingsInteractorImpl::new(
            self.settings.clone(),
            self.config.default_spread,
            self.fees.clone(),
        ))
    }

    fn quote_ticker(&self) -> QuoteTicker {
        let interactor: Arc<dyn QuoteInteractor> = Arc::new(QuoteInteractorImpl::new(
            self.price_service.clone(),
            self.settings.clone(),
            &self.config.price_symbol,
            self.config.default_spread,
        ));
        QuoteTicker::new(
            interactor,
            Duration::from_secs(self.config.quote_refresh_secs),
            self.config.fallback_rate,
        )
    }

    // Screens

    pub fn auth_presenter(&self) -> Box<dyn AuthPresenter> {
        Box::new(AuthPresenterImpl::new(
            Arc::new(AuthInteractorImpl::new(
                self.auth.clone(),
                self.profiles.clone(),
                self.settings.clone(),
            )),
            Arc::new(TerminalAuthView::new(self.terminal())),
        ))
    }

    pub fn dashboard_presenter(&self, viewer: Identity) -> Box<dyn DashboardPresenter> {
        Box::new(DashboardPresenterImpl::new(
            Arc::new(DashboardInteractorImpl::new(
                self.profiles.clone(),
                self.transactions.clone(),
                self.fees.variable_rate,
            )),
            Arc::new(TerminalDashboardView::new(self.terminal())),
            viewer,
        ))
    }

    pub fn new_transaction_presenter(&self, user_id: Uuid) -> Box<dyn NewTransactionPresenter> {
        Box::new(NewTransactionPresenterImpl::new(
            Arc::new(SwapInteractorImpl::new(
                self.transactions.clone(),
                self.fees.clone(),
            )),
            Arc::new(TerminalNewTransactionView::new(self.terminal())),
            self.quote_ticker(),
            user_id,
        ))
    }

    pub fn statement_presenter(
        &self,
        viewer: Identity,
        all_customers: bool,
    ) -> Box<dyn StatementPresenter> {
        Box::new(StatementPresenterImpl::new(
            Arc::new(StatementInteractorImpl::new(self.transactions.clone())),
            Arc::new(TerminalStatementView::new(self.terminal())),
            viewer,
            all_customers,
        ))
    }

    pub fn customers_presenter(&self, viewer: Identity) -> Box<dyn CustomersPresenter> {
        Box::new(CustomersPresenterImpl::new(
            Arc::new(CustomerInteractorImpl::new(self.profiles.clone())),
            Arc::new(TerminalCustomersView::new(self.terminal())),
            viewer,
        ))
    }

    pub fn admin_transactions_presenter(
        &self,
        viewer: Identity,
    ) -> Box<dyn AdminTransactionsPresenter> {
        Box::new(AdminTransactionsPresenterImpl::new(
            Arc::new(AdminTransactionInteractorImpl::new(
                self.transactions.clone(),
            )),
            Arc::new(TerminalAdminTransactionsView::new(self.terminal())),
            viewer,
        ))
    }

    pub fn settings_presenter(&self, viewer: Identity) -> Box<dyn SettingsPresenter> {
        Box::new(SettingsPresenterImpl::new(
            self.settings_interactor(),
            Arc::new(TerminalSettingsView::new(self.terminal())),
            viewer,
        ))
    }

    pub fn profile_presenter(&self, identity: Identity) -> Box<dyn ProfilePresenter> {
        Box::new(ProfilePresenterImpl::new(
            Arc::new(ProfileInteractorImpl::new(self.profiles.clone())),
            Arc::new(TerminalProfileView::new(self.terminal())),
            identity,
        ))
    }

    pub fn support_presenter(&self) -> Box<dyn SupportPresenter> {
        Box::new(SupportPresenterImpl::new(
            self.settings_interactor(),
            Arc::new(TerminalSupportView::new(self.terminal())),
        ))
    }
}
