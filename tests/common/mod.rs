use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use atlas_swap::market::PriceService;
use atlas_swap::supabase::MemoryBackend;
use atlas_swap::view::Terminal;
use atlas_swap::{App, AppConfig, BackendKind, ServiceContainer};

pub struct FixedPrice(pub Decimal);

#[async_trait]
impl PriceService for FixedPrice {
    async fn get_price(&self, _symbol: &str) -> Result<Decimal> {
        Ok(self.0)
    }
}

pub struct Harness {
    pub app: App,
    pub backend: Arc<MemoryBackend>,
    pub terminal: Terminal,
}

impl Harness {
    pub async fn start() -> Self {
        let backend = Arc::new(MemoryBackend::demo());
        let terminal = Terminal::buffered();
        let config = AppConfig {
            backend: BackendKind::Memory,
            ..AppConfig::default()
        };
        let services = ServiceContainer::in_memory(
            config,
            terminal.clone(),
            backend.clone(),
            Arc::new(FixedPrice(dec!(5.00))),
        );

        let mut app = App::new(services);
        app.start().await.unwrap();
        Self {
            app,
            backend,
            terminal,
        }
    }

    /// Runs one command line and clears the output captured before it.
    pub async fn run(&mut self, line: &str) -> bool {
        self.terminal.clear();
        self.app.handle_line(line).await.unwrap()
    }

    pub fn saw(&self, text: &str) -> bool {
        self.terminal.contains(text)
    }
}
