// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Session state: who is signed in, and whether a sign-in is in flight.

use crate::api::ApiClient;
use crate::error::ActionFailure;
use crate::models::{RegisterRequest, User};
use crate::token_store::TokenStore;
use crate::utils::is_valid_email;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for AuthState {
    /// Session restore has not run yet, so the store starts out loading.
    fn default() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_loading: true,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Loading,
    Authenticated,
    Anonymous,
}

impl AuthState {
    pub fn phase(&self) -> AuthPhase {
        if self.is_loading {
            AuthPhase::Loading
        } else if self.is_authenticated {
            AuthPhase::Authenticated
        } else {
            AuthPhase::Anonymous
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    Start,
    Succeeded(User),
    Failed(Option<String>),
    /// Input refused before any request; the session is left as it was.
    Rejected(String),
    LoggedOut,
    /// The credential disappeared underneath us (gateway saw a 401).
    SessionExpired,
    ClearError,
}

pub fn reduce(state: &AuthState, action: AuthAction) -> AuthState {
    match action {
        AuthAction::Start => AuthState {
            is_loading: true,
            error: None,
            ..state.clone()
        },
        AuthAction::Succeeded(user) => AuthState {
            user: Some(user),
            is_authenticated: true,
            is_loading: false,
            error: None,
        },
        AuthAction::Failed(error) => AuthState {
            user: None,
            is_authenticated: false,
            is_loading: false,
            error,
        },
        AuthAction::Rejected(error) => AuthState {
            error: Some(error),
            ..state.clone()
        },
        AuthAction::LoggedOut => AuthState {
            user: None,
            is_authenticated: false,
            is_loading: false,
            error: None,
        },
        AuthAction::SessionExpired => AuthState {
            user: None,
            is_authenticated: false,
            is_loading: false,
            error: Some(SESSION_EXPIRED_MESSAGE.to_string()),
        },
        AuthAction::ClearError => AuthState {
            error: None,
            ..state.clone()
        },
    }
}

pub struct AuthStore {
    api: Arc<ApiClient>,
    tokens: Arc<TokenStore>,
    state: watch::Sender<Arc<AuthState>>,
}

impl AuthStore {
    pub fn new(api: Arc<ApiClient>, tokens: Arc<TokenStore>) -> Self {
        let (state, _) = watch::channel(Arc::new(AuthState::default()));
        Self { api, tokens, state }
    }

    /// Current state. A settled authenticated state whose token has since
    /// been cleared is settled to anonymous first.
    pub fn state(&self) -> Arc<AuthState> {
        let expired = {
            let current = self.state.borrow();
            !current.is_loading && current.is_authenticated && self.tokens.get().is_none()
        };
        if expired {
            warn!("credential cleared while signed in; ending session");
            self.dispatch(AuthAction::SessionExpired);
        }
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<AuthState>> {
        self.state.subscribe()
    }

    fn dispatch(&self, action: AuthAction) {
        self.state
            .send_modify(|current| *current = Arc::new(reduce(current, action)));
    }

    /// Resume a persisted session. Without a stored token this settles to
    /// anonymous without touching the network.
    #[instrument(skip(self))]
    pub async fn restore_session(&self) -> Option<User> {
        if self.tokens.get().is_none() {
            self.dispatch(AuthAction::Failed(None));
            return None;
        }
        self.dispatch(AuthAction::Start);
        let outcome = match self.api.get_current_user().await {
            Ok(envelope) => envelope.into_data().map(|p| p.user),
            Err(e) => Err(e.message().to_string()),
        };
        match outcome {
            Ok(user) => {
                info!(user_id = %user.id, "session restored");
                self.dispatch(AuthAction::Succeeded(user.clone()));
                Some(user)
            }
            Err(message) => {
                warn!(error = %message, "session restore failed");
                self.tokens.clear();
                self.dispatch(AuthAction::Failed(None));
                None
            }
        }
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ActionFailure> {
        let email = email.trim().to_lowercase();
        if let Err(failure) = check_credentials(&email, password) {
            self.dispatch(AuthAction::Rejected(failure.message.clone()));
            return Err(failure);
        }
        self.dispatch(AuthAction::Start);
        let outcome = match self.api.login(&email, password).await {
            Ok(envelope) => envelope.into_data().map_err(ActionFailure::new),
            Err(e) => Err(ActionFailure::from(&e)),
        };
        self.settle(outcome.map(|p| p.user))
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ActionFailure> {
        let mut request = request.clone();
        request.email = request.email.trim().to_lowercase();
        if let Err(failure) = check_credentials(&request.email, &request.password) {
            self.dispatch(AuthAction::Rejected(failure.message.clone()));
            return Err(failure);
        }
        self.dispatch(AuthAction::Start);
        let outcome = match self.api.register(&request).await {
            Ok(envelope) => envelope.into_data().map_err(ActionFailure::new),
            Err(e) => Err(ActionFailure::from(&e)),
        };
        self.settle(outcome.map(|p| p.user))
    }

    /// Always ends anonymous, whatever the server says.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "logout call failed");
        }
        self.tokens.clear();
        self.dispatch(AuthAction::LoggedOut);
    }

    pub fn clear_error(&self) {
        self.dispatch(AuthAction::ClearError);
    }

    fn settle(&self, outcome: Result<User, ActionFailure>) -> Result<User, ActionFailure> {
        match outcome {
            Ok(user) => {
                info!(user_id = %user.id, "signed in");
                self.dispatch(AuthAction::Succeeded(user.clone()));
                Ok(user)
            }
            Err(failure) => {
                warn!(error = %failure, "sign-in failed");
                self.tokens.clear();
                self.dispatch(AuthAction::Failed(Some(failure.message.clone())));
                Err(failure)
            }
        }
    }
}

fn check_credentials(email: &str, password: &str) -> Result<(), ActionFailure> {
    if !is_valid_email(email) {
        return Err(ActionFailure::invalid_field(
            "email",
            "Please enter a valid email address.",
        ));
    }
    if password.is_empty() {
        return Err(ActionFailure::invalid_field(
            "password",
            "Password is required.",
        ));
    }
    Ok(())
}
