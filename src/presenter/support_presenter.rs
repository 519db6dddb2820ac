use anyhow::Result;
use async_trait::async_trait;
use log::error;
use std::sync::Arc;

use crate::entity::SupportLinks;
use crate::interactor::settings_interactor::SettingsInteractor;
use crate::view::support_view::SupportView;

#[async_trait]
pub trait SupportPresenter: Send + Sync {
    async fn mount(&mut self) -> Result<()>;
    fn links(&self) -> Option<&SupportLinks>;
}

pub struct SupportPresenterImpl<I, V> {
    interactor: Arc<I>,
    view: Arc<V>,
    links: Option<SupportLinks>,
}

impl<I, V> SupportPresenterImpl<I, V>
where
    I: SettingsInteractor,
    V: SupportView,
{
    pub fn new(interactor: Arc<I>, view: Arc<V>) -> Self {
        Self {
            interactor,
            view,
            links: None,
        }
    }
}

#[async_trait]
impl<I, V> SupportPresenter for SupportPresenterImpl<I, V>
where
    I: SettingsInteractor + Send + Sync,
    V: SupportView + Send + Sync,
{
    async fn mount(&mut self) -> Result<()> {
        match self.interactor.support_links().await {
            Ok(links) => {
                self.view.display_support(&links).await?;
                self.links = Some(links);
                Ok(())
            }
            Err(e) => {
                error!("Failed to load support contacts: {:#}", e);
                self.view
                    .display_error("Support contacts are unavailable right now.".to_string())
                    .await
            }
        }
    }

    fn links(&self) -> Option<&SupportLinks> {
        self.links.as_ref()
    }
}
