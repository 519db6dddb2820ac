use anyhow::Result;
use async_trait::async_trait;
use log::{error, warn};
use std::sync::Arc;

use crate::access::can_access;
use crate::entity::{Identity, SwapTransaction, ViewId};
use crate::interactor::statement_interactor::StatementInteractor;
use crate::utils::DateRange;
use crate::view::statement_view::StatementView;

pub const LOAD_FAILED: &str = "Could not load transactions. Type `refresh` to try again.";

/// Text search over id and status plus an inclusive date range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementFilter {
    pub search: String,
    pub range: DateRange,
}

impl StatementFilter {
    pub fn matches(&self, tx: &SwapTransaction) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = needle.is_empty()
            || tx.id.to_lowercase().contains(&needle)
            || tx.status.as_str().contains(&needle);
        matches_search && self.range.contains(tx.created_at)
    }
}

#[async_trait]
pub trait StatementPresenter: Send + Sync {
    async fn mount(&mut self) -> Result<()>;
    async fn refresh(&mut self) -> Result<()>;
    async fn search(&mut self, text: &str) -> Result<()>;
    async fn set_from(&mut self, text: &str) -> Result<()>;
    async fn set_to(&mut self, text: &str) -> Result<()>;
    async fn clear_filters(&mut self) -> Result<()>;
    fn transactions(&self) -> &[SwapTransaction];
    fn visible(&self) -> Vec<&SwapTransaction>;
}

pub struct StatementPresenterImpl<I, V> {
    interactor: Arc<I>,
    view: Arc<V>,
    viewer: Identity,
    all_customers: bool,
    transactions: Vec<SwapTransaction>,
    filter: StatementFilter,
}

impl<I, V> StatementPresenterImpl<I, V>
where
    I: StatementInteractor,
    V: StatementView,
{
    pub fn new(interactor: Arc<I>, view: Arc<V>, viewer: Identity, all_customers: bool) -> Self {
        Self {
            interactor,
            view,
            viewer,
            all_customers,
            transactions: Vec::new(),
            filter: StatementFilter::default(),
        }
    }

    async fn render(&self) -> Result<()> {
        let rows: Vec<&SwapTransaction> = self
            .transactions
            .iter()
            .filter(|tx| self.filter.matches(tx))
            .collect();
        self.view
            .display_transactions(
                &rows,
                self.transactions.len(),
                self.all_customers,
                &self.filter.search,
                &self.filter.range,
            )
            .await
    }
}

#[async_trait]
impl<I, V> StatementPresenter for StatementPresenterImpl<I, V>
where
    I: StatementInteractor + Send + Sync,
    V: StatementView + Send + Sync,
{
    async fn mount(&mut self) -> Result<()> {
        if self.all_customers && !can_access(Some(&self.viewer), ViewId::AdminStatement) {
            warn!("{} is not allowed to see the global statement", self.viewer.id);
            self.all_customers = false;
        }
        self.refresh().await
    }

    async fn refresh(&mut self) -> Result<()> {
        self.view.display_loading().await?;

        match self
            .interactor
            .get_transactions(self.viewer.id, self.all_customers)
            .await
        {
            Ok(transactions) => {
                self.transactions = transactions;
                self.render().await
            }
            Err(e) => {
                error!("Failed to load statement: {:#}", e);
                self.view.display_error(LOAD_FAILED.to_string()).await
            }
        }
    }

    async fn search(&mut self, text: &str) -> Result<()> {
        self.filter.search = text.trim().to_string();
        self.render().await
    }

    async fn set_from(&mut self, text: &str) -> Result<()> {
        if let Err(e) = self.filter.range.set_start(text) {
            return self.view.display_error(e.to_string()).await;
        }
        self.render().await
    }

    async fn set_to(&mut self, text: &str) -> Result<()> {
        if let Err(e) = self.filter.range.set_end(text) {
            return self.view.display_error(e.to_string()).await;
        }
        self.render().await
    }

    async fn clear_filters(&mut self) -> Result<()> {
        self.filter = StatementFilter::default();
        self.render().await
    }

    fn transactions(&self) -> &[SwapTransaction] {
        &self.transactions
    }

    fn visible(&self) -> Vec<&SwapTransaction> {
        self.transactions
            .iter()
            .filter(|tx| self.filter.matches(tx))
            .collect()
    }
}
