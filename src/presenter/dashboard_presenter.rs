use anyhow::Result;
use async_trait::async_trait;
use futures::join;
use log::error;
use std::sync::Arc;

use crate::access::can_administer;
use crate::entity::{AdminStats, ClientStats, Identity, WelcomeSummary};
use crate::interactor::dashboard_interactor::DashboardInteractor;
use crate::view::dashboard_view::DashboardView;

#[async_trait]
pub trait DashboardPresenter: Send + Sync {
    async fn mount(&mut self) -> Result<()>;
    async fn refresh(&mut self) -> Result<()>;
    fn client_stats(&self) -> Option<&ClientStats>;
    fn welcome(&self) -> Option<&WelcomeSummary>;
    fn admin_stats(&self) -> Option<&AdminStats>;
}

pub struct DashboardPresenterImpl<I, V> {
    interactor: Arc<I>,
    view: Arc<V>,
    viewer: Identity,
    client_stats: Option<ClientStats>,
    welcome: Option<WelcomeSummary>,
    admin_stats: Option<AdminStats>,
}

impl<I, V> DashboardPresenterImpl<I, V>
where
    I: DashboardInteractor,
    V: DashboardView,
{
    pub fn new(interactor: Arc<I>, view: Arc<V>, viewer: Identity) -> Self {
        Self {
            interactor,
            view,
            viewer,
            client_stats: None,
            welcome: None,
            admin_stats: None,
        }
    }

    async fn load_client(&mut self) -> Result<()> {
        let user_id = self.viewer.id;
        // The cards load independently; one failing does not hide the other
        let (stats, welcome) = join!(
            self.interactor.client_stats(user_id),
            self.interactor.welcome(user_id)
        );

        match stats {
            Ok(stats) => self.client_stats = Some(stats),
            Err(e) => error!("Failed to load statistics for {}: {:#}", user_id, e),
        }
        match welcome {
            Ok(welcome) => self.welcome = Some(welcome),
            Err(e) => error!("Failed to load welcome card for {}: {:#}", user_id, e),
        }

        self.view
            .display_client_dashboard(self.client_stats.as_ref(), self.welcome.as_ref())
            .await
    }

    async fn load_admin(&mut self) -> Result<()> {
        match self.interactor.admin_stats().await {
            Ok(stats) => {
                self.view.display_admin_dashboard(&stats).await?;
                self.admin_stats = Some(stats);
                Ok(())
            }
            Err(e) => {
                error!("Failed to load admin overview: {:#}", e);
                self.view
                    .display_error("Could not load the overview. Type `refresh` to try again.".to_string())
                    .await
            }
        }
    }
}

#[async_trait]
impl<I, V> DashboardPresenter for DashboardPresenterImpl<I, V>
where
    I: DashboardInteractor + Send + Sync,
    V: DashboardView + Send + Sync,
{
    async fn mount(&mut self) -> Result<()> {
        self.refresh().await
    }

    async fn refresh(&mut self) -> Result<()> {
        if can_administer(Some(&self.viewer)) {
            self.load_admin().await
        } else {
            self.load_client().await
        }
    }

    fn client_stats(&self) -> Option<&ClientStats> {
        self.client_stats.as_ref()
    }

    fn welcome(&self) -> Option<&WelcomeSummary> {
        self.welcome.as_ref()
    }

    fn admin_stats(&self) -> Option<&AdminStats> {
        self.admin_stats.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interactor::dashboard_interactor::DashboardInteractorImpl;
    use crate::supabase::{AuthService, MemoryBackend, ProfileRepository};
    use crate::view::dashboard_view::TerminalDashboardView;
    use crate::view::terminal::Terminal;
    use rust_decimal_macros::dec;

    async fn presenter(
        backend: &Arc<MemoryBackend>,
        email: &str,
        password: &str,
        terminal: &Terminal,
    ) -> DashboardPresenterImpl<DashboardInteractorImpl, TerminalDashboardView> {
        let session = backend.sign_in(email, password).await.unwrap();
        let viewer = backend.fetch_identity(session.user_id()).await.unwrap();
        DashboardPresenterImpl::new(
            Arc::new(DashboardInteractorImpl::new(backend.clone(), backend.clone(), dec!(0.01))),
            Arc::new(TerminalDashboardView::new(terminal.clone())),
            viewer,
        )
    }

    #[tokio::test]
    async fn client_sees_own_cards() {
        let backend = Arc::new(MemoryBackend::demo());
        let terminal = Terminal::buffered();
        let mut presenter = presenter(&backend, "client@atlas.local", "client123", &terminal).await;

        presenter.mount().await.unwrap();

        let stats = presenter.client_stats().unwrap();
        assert_eq!((stats.total, stats.completed, stats.pending), (2, 1, 1));
        assert_eq!(presenter.welcome().unwrap().first_name, "Ana");
        assert_eq!(presenter.welcome().unwrap().volume, dec!(500));
        assert!(presenter.admin_stats().is_none());
        assert!(terminal.contains("Welcome back, Ana!"));
    }

    #[tokio::test]
    async fn admin_sees_overview() {
        let backend = Arc::new(MemoryBackend::demo());
        let terminal = Terminal::buffered();
        let mut presenter = presenter(&backend, "admin@atlas.local", "admin123", &terminal).await;

        presenter.mount().await.unwrap();

        let stats = presenter.admin_stats().unwrap();
        assert_eq!(stats.total_customers, 2);
        assert_eq!(stats.pending_swaps, 1);
        assert!(presenter.client_stats().is_none());
        assert!(terminal.contains("Recent transactions:"));
    }
}
