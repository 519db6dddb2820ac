use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::entity::{AccountStatus, Identity, IdentityPatch, Role};
use crate::supabase::ProfileRepository;

/// Fields an administrator may edit on a customer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerForm {
    pub full_name: String,
    pub email: String,
    pub whatsapp: String,
    pub telegram: String,
}

impl CustomerForm {
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            full_name: identity.full_name.clone().unwrap_or_default(),
            email: identity.email.clone().unwrap_or_default(),
            whatsapp: identity.whatsapp.clone().unwrap_or_default(),
            telegram: identity.telegram.clone().unwrap_or_default(),
        }
    }

    pub fn to_patch(&self) -> IdentityPatch {
        IdentityPatch {
            full_name: Some(self.full_name.clone()),
            email: Some(self.email.clone()),
            whatsapp: Some(self.whatsapp.clone()),
            telegram: Some(self.telegram.clone()),
            ..IdentityPatch::default()
        }
    }
}

#[async_trait]
pub trait CustomerInteractor: Send + Sync {
    async fn list_customers(&self) -> Result<Vec<Identity>>;
    async fn update_customer(&self, id: Uuid, form: &CustomerForm) -> Result<IdentityPatch>;
    async fn delete_customer(&self, id: Uuid) -> Result<()>;
    async fn set_role(&self, id: Uuid, role: Role) -> Result<()>;
    async fn set_status(&self, id: Uuid, status: AccountStatus) -> Result<()>;
}

pub struct CustomerInteractorImpl {
    profiles: Arc<dyn ProfileRepository>,
}

impl CustomerInteractorImpl {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }
}

#[async_trait]
impl CustomerInteractor for CustomerInteractorImpl {
    async fn list_customers(&self) -> Result<Vec<Identity>> {
        self.profiles
            .list_identities()
            .await
            .context("Failed to load customers")
    }

    async fn update_customer(&self, id: Uuid, form: &CustomerForm) -> Result<IdentityPatch> {
        let patch = form.to_patch();
        self.profiles
            .update_identity(id, &patch)
            .await
            .context("Failed to save customer")?;
        Ok(patch)
    }

    async fn delete_customer(&self, id: Uuid) -> Result<()> {
        self.profiles
            .delete_identity(id)
            .await
            .context("Failed to delete customer")?;
        info!("Deleted customer {}", id);
        Ok(())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<()> {
        self.profiles
            .update_identity(id, &IdentityPatch::role(role))
            .await
            .context("Failed to update role")?;
        info!("Customer {} is now {:?}", id, role);
        Ok(())
    }

    async fn set_status(&self, id: Uuid, status: AccountStatus) -> Result<()> {
        self.profiles
            .update_identity(id, &IdentityPatch::status(status))
            .await
            .context("Failed to update status")?;
        info!("Customer {} is now {:?}", id, status);
        Ok(())
    }
}
