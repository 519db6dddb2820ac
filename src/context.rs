//! Application context owned by the shell: who is signed in and with
//! which profile. It only changes through auth notifications and explicit
//! identity re-fetches.

use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use uuid::Uuid;

use crate::entity::{AuthEvent, Identity, Session};
use crate::supabase::{AuthService, ProfileRepository};

pub const BLOCKED_NOTICE: &str =
    "Your account is disabled. Please contact support for more information.";

#[derive(Debug, Clone, Default)]
pub struct AppContext {
    pub session: Option<Session>,
    pub identity: Option<Identity>,
    pub loading: bool,
}

impl AppContext {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some() && self.identity.is_some()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(Session::user_id)
    }

    fn clear(&mut self) {
        self.session = None;
        self.identity = None;
        self.loading = false;
    }
}

pub struct SessionStore {
    auth: Arc<dyn AuthService>,
    profiles: Arc<dyn ProfileRepository>,
    events: broadcast::Receiver<AuthEvent>,
    context: AppContext,
    notice: Option<String>,
}

impl SessionStore {
    /// Subscribes to auth notifications right away so none are missed.
    pub fn new(auth: Arc<dyn AuthService>, profiles: Arc<dyn ProfileRepository>) -> Self {
        let events = auth.subscribe();
        Self {
            auth,
            profiles,
            events,
            context: AppContext {
                loading: true,
                ..AppContext::default()
            },
            notice: None,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Restores the previous session, if any, and loads its identity.
    pub async fn bootstrap(&mut self) {
        match self.auth.current_session().await {
            Ok(Some(session)) => self.load_identity(session).await,
            Ok(None) => self.context.clear(),
            Err(e) => {
                error!("Failed to restore session: {}", e);
                self.context.clear();
            }
        }
    }

    /// Applies every queued auth notification. Returns true if any arrived.
    pub async fn pump(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.handle_event(event).await;
                    changed = true;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Missed {} auth notifications", skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        changed
    }

    pub async fn handle_event(&mut self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(session) => self.load_identity(session).await,
            AuthEvent::SignedOut => {
                if self.context.session.is_some() {
                    info!("Signed out");
                }
                self.context.clear();
            }
        }
    }

    /// Re-reads the profile of the current session, e.g. after a profile edit.
    pub async fn refresh_identity(&mut self) {
        if let Some(session) = self.context.session.clone() {
            self.load_identity(session).await;
        }
    }

    /// Message left for the login screen; it is cleared once read.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub async fn sign_out(&mut self) {
        if let Err(e) = self.auth.sign_out().await {
            error!("Sign-out failed: {}", e);
        }
        self.context.clear();
    }

    async fn load_identity(&mut self, session: Session) {
        self.context.loading = true;
        let user_id = session.user_id();

        match self.profiles.fetch_identity(user_id).await {
            Ok(identity) if identity.is_blocked() => {
                warn!("Blocked account {} tried to use the application", user_id);
                self.notice = Some(BLOCKED_NOTICE.to_string());
                self.sign_out().await;
            }
            Ok(identity) => {
                self.context.session = Some(session);
                self.context.identity = Some(identity);
                self.context.loading = false;
            }
            Err(e) => {
                error!("Failed to load profile for {}: {}", user_id, e);
                self.sign_out().await;
            }
        }
    }
}
