pub mod admin_transaction_interactor;
pub mod auth_interactor;
pub mod customer_interactor;
pub mod dashboard_interactor;
pub mod profile_interactor;
pub mod quote_interactor;
pub mod settings_interactor;
pub mod statement_interactor;
pub mod swap_interactor;
