pub mod admin_transactions_view;
pub mod auth_view;
pub mod customers_view;
pub mod dashboard_view;
pub mod new_transaction_view;
pub mod profile_view;
pub mod settings_view;
pub mod shell_view;
pub mod statement_view;
pub mod support_view;
pub mod terminal;

pub use terminal::Terminal;
