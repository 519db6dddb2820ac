pub mod quote_ticker;

pub use quote_ticker::QuoteTicker;
