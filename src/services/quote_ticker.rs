use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::entity::RateSnapshot;
use crate::interactor::quote_interactor::QuoteInteractor;

/// Background task that keeps the effective rate fresh while the
/// new-transaction screen is mounted.
///
/// The first fetch happens immediately on `start`, then once per period.
/// Dropping the ticker cancels the task.
pub struct QuoteTicker {
    interactor: Arc<dyn QuoteInteractor>,
    period: Duration,
    snapshot_tx: Arc<watch::Sender<RateSnapshot>>,
    snapshot_rx: watch::Receiver<RateSnapshot>,
    stop_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl QuoteTicker {
    pub fn new(interactor: Arc<dyn QuoteInteractor>, period: Duration, fallback_rate: Decimal) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(RateSnapshot::loading(fallback_rate));
        Self {
            interactor,
            period,
            snapshot_tx: Arc::new(snapshot_tx),
            snapshot_rx,
            stop_tx: None,
            handle: None,
        }
    }

    /// Receiver that always holds the latest snapshot
    pub fn subscribe(&self) -> watch::Receiver<RateSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub fn start(&mut self) {
        if self.stop_tx.is_some() {
            warn!("Quote ticker is already running");
            return;
        }

        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
        self.stop_tx = Some(stop_tx);

        let interactor = self.interactor.clone();
        let snapshot_tx = self.snapshot_tx.clone();
        let period = self.period;

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last_run = Instant::now();

            loop {
                select! {
                    _ = ticker.tick() => {
                        debug!("Refreshing quote (last run: {:.2?} ago)", last_run.elapsed());
                        Self::refresh(interactor.as_ref(), &snapshot_tx).await;
                        last_run = Instant::now();
                    }
                    _ = stop_rx.recv() => {
                        debug!("Stopping quote ticker");
                        break;
                    }
                }
            }
        }));

        info!("Quote ticker started ({}s period)", self.period.as_secs());
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.try_send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Quote ticker stopped");
        }
    }

    async fn refresh(interactor: &dyn QuoteInteractor, snapshot_tx: &watch::Sender<RateSnapshot>) {
        snapshot_tx.send_modify(|snapshot| snapshot.loading = true);

        match interactor.effective_rate().await {
            Ok(rate) => {
                snapshot_tx.send_replace(RateSnapshot::ready(rate));
            }
            Err(e) => {
                // Keep showing the previous rate
                error!("Failed to refresh USDT quote: {}", e);
                snapshot_tx.send_modify(|snapshot| snapshot.loading = false);
            }
        }
    }
}

impl Drop for QuoteTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
