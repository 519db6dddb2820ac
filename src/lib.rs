pub mod access;
pub mod app;
pub mod config;
pub mod console;
pub mod context;
pub mod di;
pub mod entity;
pub mod interactor;
pub mod market;
pub mod modal;
pub mod presenter;
pub mod router;
pub mod services;
pub mod supabase;
pub mod utils;
pub mod view;

// Re-export commonly used items
pub use app::App;
pub use config::{AppConfig, BackendKind};
pub use context::{AppContext, SessionStore};
pub use di::*;
pub use entity::*;
pub use router::*;
pub use utils::*;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
