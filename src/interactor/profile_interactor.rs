use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::entity::{Identity, IdentityPatch};
use crate::supabase::ProfileRepository;

/// Self-editable profile fields; the email is the login and stays read-only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub full_name: String,
    pub whatsapp: String,
    pub telegram: String,
}

impl ProfileForm {
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            full_name: identity.full_name.clone().unwrap_or_default(),
            whatsapp: identity.whatsapp.clone().unwrap_or_default(),
            telegram: identity.telegram.clone().unwrap_or_default(),
        }
    }
}

#[async_trait]
pub trait ProfileInteractor: Send + Sync {
    async fn update_profile(&self, id: Uuid, form: &ProfileForm) -> Result<()>;
}

pub struct ProfileInteractorImpl {
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileInteractorImpl {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }
}

#[async_trait]
impl ProfileInteractor for ProfileInteractorImpl {
    async fn update_profile(&self, id: Uuid, form: &ProfileForm) -> Result<()> {
        let patch = IdentityPatch {
            full_name: Some(form.full_name.trim().to_string()),
            whatsapp: Some(form.whatsapp.trim().to_string()),
            telegram: Some(form.telegram.trim().to_string()),
            updated_at: Some(Utc::now()),
            ..IdentityPatch::default()
        };

        self.profiles
            .update_identity(id, &patch)
            .await
            .context("Failed to update profile")
    }
}
