mod app_error;
mod identity;
mod quote;
mod session;
mod setting;
mod stats;
mod swap_transaction;
mod view_id;

pub use app_error::AppError;
pub use identity::{AccountStatus, CustomerSummary, Identity, IdentityPatch, Role};
pub use quote::{FeeSchedule, Quote, RateSnapshot};
pub use session::{AuthEvent, AuthUser, Session};
pub use setting::{Setting, SupportLinks, SETTING_SPREAD, SETTING_SUPPORT_TELEGRAM, SETTING_SUPPORT_WHATSAPP};
pub use stats::{AdminStats, ClientStats, WelcomeSummary};
pub use swap_transaction::{NewSwapTransaction, SwapTransaction, TransactionQuery, TransactionStatus};
pub use view_id::ViewId;
