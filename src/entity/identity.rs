use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Client,
    Admin,
}

impl Role {
    pub fn toggled(self) -> Self {
        match self {
            Role::Client => Role::Admin,
            Role::Admin => Role::Client,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Client => "Client",
            Role::Admin => "Administrator",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Blocked,
}

impl AccountStatus {
    pub fn toggled(self) -> Self {
        match self {
            AccountStatus::Active => AccountStatus::Blocked,
            AccountStatus::Blocked => AccountStatus::Active,
        }
    }
}

// Row of the `profiles` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_blocked(&self) -> bool {
        self.status == AccountStatus::Blocked
    }

    /// First word of the full name, used for greetings.
    pub fn first_name(&self) -> &str {
        self.full_name
            .as_deref()
            .and_then(|name| name.split_whitespace().next())
            .unwrap_or("User")
    }

    /// Applies the fields a patch carries, leaving the rest untouched.
    pub fn apply(&mut self, patch: &IdentityPatch) {
        if let Some(full_name) = &patch.full_name {
            self.full_name = Some(full_name.clone());
        }
        if let Some(email) = &patch.email {
            self.email = Some(email.clone());
        }
        if let Some(whatsapp) = &patch.whatsapp {
            self.whatsapp = Some(whatsapp.clone());
        }
        if let Some(telegram) = &patch.telegram {
            self.telegram = Some(telegram.clone());
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

// Partial update of a profile row
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IdentityPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl IdentityPatch {
    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    pub fn status(status: AccountStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

// Customer columns embedded in admin transaction listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub full_name: Option<String>,
    pub email: Option<String>,
}
