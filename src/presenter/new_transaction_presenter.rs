use anyhow::Result;
use async_trait::async_trait;
use log::{error, info};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

use crate::entity::{Quote, RateSnapshot};
use crate::interactor::swap_interactor::SwapInteractor;
use crate::services::QuoteTicker;
use crate::utils::{parse_amount, validate_wallet_address};
use crate::view::new_transaction_view::NewTransactionView;

pub const SUBMIT_FAILED: &str = "Could not create the transaction. Please try again.";

/// Input and status of the swap form
#[derive(Debug, Clone, PartialEq)]
pub struct SwapForm {
    pub amount_text: String,
    pub wallet_text: String,
    pub snapshot: RateSnapshot,
    pub submitting: bool,
    /// Id of the transaction just created, until the user starts a new one
    pub success: Option<String>,
}

impl SwapForm {
    pub fn new(snapshot: RateSnapshot) -> Self {
        Self {
            amount_text: String::new(),
            wallet_text: String::new(),
            snapshot,
            submitting: false,
            success: None,
        }
    }

    pub fn amount(&self) -> Decimal {
        parse_amount(&self.amount_text)
    }

    pub fn wallet_valid(&self) -> bool {
        validate_wallet_address(self.wallet_text.trim())
    }

    /// Warn only once something has been typed
    pub fn show_wallet_warning(&self) -> bool {
        !self.wallet_text.is_empty() && !self.wallet_valid()
    }

    pub fn can_submit(&self) -> bool {
        self.amount() > Decimal::ZERO
            && self.wallet_valid()
            && !self.snapshot.loading
            && !self.submitting
    }

    fn reset(&mut self) {
        self.amount_text.clear();
        self.wallet_text.clear();
        self.submitting = false;
    }
}

#[async_trait]
pub trait NewTransactionPresenter: Send + Sync {
    /// Starts the quote ticker and shows the empty form.
    async fn mount(&mut self) -> Result<()>;
    /// Stops the quote ticker.
    fn unmount(&mut self);
    async fn set_amount(&mut self, text: &str) -> Result<()>;
    async fn set_wallet(&mut self, text: &str) -> Result<()>;
    async fn submit(&mut self) -> Result<()>;
    /// Leaves the success acknowledgment for a fresh form.
    async fn new_swap(&mut self) -> Result<()>;
    async fn refresh(&mut self) -> Result<()>;
    fn form(&self) -> &SwapForm;
    fn quote(&self) -> Quote;
}

pub struct NewTransactionPresenterImpl<I, V> {
    interactor: Arc<I>,
    view: Arc<V>,
    ticker: QuoteTicker,
    rates: watch::Receiver<RateSnapshot>,
    user_id: Uuid,
    form: SwapForm,
}

impl<I, V> NewTransactionPresenterImpl<I, V>
where
    I: SwapInteractor,
    V: NewTransactionView,
{
    pub fn new(interactor: Arc<I>, view: Arc<V>, ticker: QuoteTicker, user_id: Uuid) -> Self {
        let rates = ticker.subscribe();
        let form = SwapForm::new(rates.borrow().clone());
        Self {
            interactor,
            view,
            ticker,
            rates,
            user_id,
            form,
        }
    }

    fn sync_rate(&mut self) {
        self.form.snapshot = self.rates.borrow_and_update().clone();
    }

    async fn render(&mut self) -> Result<()> {
        self.sync_rate();
        let quote = self.quote();
        self.view.display_form(&self.form, &quote).await
    }
}

#[async_trait]
impl<I, V> NewTransactionPresenter for NewTransactionPresenterImpl<I, V>
where
    I: SwapInteractor + Send + Sync,
    V: NewTransactionView + Send + Sync,
{
    async fn mount(&mut self) -> Result<()> {
        self.ticker.start();
        self.render().await
    }

    fn unmount(&mut self) {
        self.ticker.stop();
    }

    async fn set_amount(&mut self, text: &str) -> Result<()> {
        self.form.amount_text = text.trim().to_string();
        self.render().await
    }

    async fn set_wallet(&mut self, text: &str) -> Result<()> {
        self.form.wallet_text = text.trim().to_string();
        self.render().await
    }

    async fn submit(&mut self) -> Result<()> {
        self.sync_rate();
        if !self.form.can_submit() {
            let reason = if self.form.amount() <= Decimal::ZERO {
                "Enter an amount greater than zero."
            } else if !self.form.wallet_valid() {
                "Enter a valid Polygon wallet address."
            } else if self.form.snapshot.loading {
                "The quote is still updating, try again in a moment."
            } else {
                "A submission is already in progress."
            };
            return self.view.display_error(reason.to_string()).await;
        }

        self.form.submitting = true;
        let rate = self.form.snapshot.rate;
        let amount = self.form.amount();
        let wallet = self.form.wallet_text.trim().to_string();

        match self
            .interactor
            .execute_swap(self.user_id, amount, &wallet, rate)
            .await
        {
            Ok(result) => {
                info!("Swap {} submitted by {}", result.transaction_id, self.user_id);
                self.form.reset();
                self.form.success = Some(result.transaction_id.clone());
                self.view
                    .display_success(&result.transaction_id, &result.quote)
                    .await
            }
            Err(e) => {
                error!("Failed to submit swap: {:#}", e);
                self.form.submitting = false;
                self.view.display_error(SUBMIT_FAILED.to_string()).await
            }
        }
    }

    async fn new_swap(&mut self) -> Result<()> {
        self.form.success = None;
        self.render().await
    }

    async fn refresh(&mut self) -> Result<()> {
        self.render().await
    }

    fn form(&self) -> &SwapForm {
        &self.form
    }

    fn quote(&self) -> Quote {
        self.interactor
            .quote(self.form.amount(), self.form.snapshot.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{FeeSchedule, TransactionStatus};
    use crate::interactor::quote_interactor::QuoteInteractor;
    use crate::interactor::swap_interactor::SwapInteractorImpl;
    use crate::supabase::MemoryBackend;
    use crate::view::new_transaction_view::TerminalNewTransactionView;
    use crate::view::terminal::Terminal;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    const WALLET: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

    struct FixedRate(Decimal);

    #[async_trait]
    impl QuoteInteractor for FixedRate {
        async fn effective_rate(&self) -> Result<Decimal> {
            Ok(self.0)
        }
    }

    fn presenter(
        backend: &Arc<MemoryBackend>,
        terminal: &Terminal,
    ) -> NewTransactionPresenterImpl<SwapInteractorImpl, TerminalNewTransactionView> {
        let ticker = QuoteTicker::new(Arc::new(FixedRate(dec!(5.26))), Duration::from_secs(30), dec!(5.26));
        NewTransactionPresenterImpl::new(
            Arc::new(SwapInteractorImpl::new(backend.clone(), FeeSchedule::default())),
            Arc::new(TerminalNewTransactionView::new(terminal.clone())),
            ticker,
            Uuid::new_v4(),
        )
    }

    #[test]
    fn form_gating() {
        let mut form = SwapForm::new(RateSnapshot::ready(dec!(5.26)));
        assert!(!form.can_submit());

        form.amount_text = "50".to_string();
        form.wallet_text = "0x123".to_string();
        assert!(form.show_wallet_warning());
        assert!(!form.can_submit());

        form.wallet_text = WALLET.to_string();
        assert!(form.can_submit());

        form.snapshot.loading = true;
        assert!(!form.can_submit());
        form.snapshot.loading = false;

        form.submitting = true;
        assert!(!form.can_submit());
        form.submitting = false;

        form.amount_text = "abc".to_string();
        assert_eq!(form.amount(), Decimal::ZERO);
        assert!(!form.can_submit());
    }

    #[tokio::test(start_paused = true)]
    async fn submit_records_pending_swap_and_resets() {
        let backend = Arc::new(MemoryBackend::new());
        let terminal = Terminal::buffered();
        let mut presenter = presenter(&backend, &terminal);

        presenter.mount().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        presenter.set_amount("50").await.unwrap();
        presenter.set_wallet(WALLET).await.unwrap();
        assert!(presenter.form().can_submit());
        assert_eq!(presenter.quote().destination_amount.round_dp(2), dec!(8.46));

        presenter.submit().await.unwrap();

        let id = presenter.form().success.clone().unwrap();
        let stored = backend.transaction(&id).unwrap();
        assert_eq!(stored.status, TransactionStatus::Pending);
        assert_eq!(stored.amount_depix, dec!(50));
        assert_eq!(stored.amount_usdt.round_dp(2), dec!(8.46));
        assert!(presenter.form().amount_text.is_empty());
        assert!(presenter.form().wallet_text.is_empty());
        assert!(terminal.contains("is pending"));

        presenter.new_swap().await.unwrap();
        assert_eq!(presenter.form().success, None);
        presenter.unmount();
    }

    #[tokio::test(start_paused = true)]
    async fn failed_submit_keeps_form() {
        let backend = Arc::new(MemoryBackend::new());
        backend.fail_writes(true);
        let terminal = Terminal::buffered();
        let mut presenter = presenter(&backend, &terminal);

        presenter.mount().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        presenter.set_amount("500").await.unwrap();
        presenter.set_wallet(WALLET).await.unwrap();
        presenter.submit().await.unwrap();

        assert_eq!(presenter.form().amount_text, "500");
        assert!(!presenter.form().submitting);
        assert_eq!(presenter.form().success, None);
        assert_eq!(backend.transaction_count(), 0);
        assert!(terminal.contains(SUBMIT_FAILED));
    }

    #[tokio::test(start_paused = true)]
    async fn submit_is_refused_while_quote_loads() {
        let backend = Arc::new(MemoryBackend::new());
        let terminal = Terminal::buffered();
        let mut presenter = presenter(&backend, &terminal);

        // Ticker not started: the snapshot is still the loading fallback
        presenter.set_amount("50").await.unwrap();
        presenter.set_wallet(WALLET).await.unwrap();
        presenter.submit().await.unwrap();

        assert_eq!(backend.transaction_count(), 0);
        assert!(terminal.contains("still updating"));
    }
}
