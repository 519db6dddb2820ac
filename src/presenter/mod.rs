pub mod admin_transactions_presenter;
pub mod auth_presenter;
pub mod customers_presenter;
pub mod dashboard_presenter;
pub mod new_transaction_presenter;
pub mod profile_presenter;
pub mod settings_presenter;
pub mod statement_presenter;
pub mod support_presenter;
