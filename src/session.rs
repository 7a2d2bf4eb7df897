//! Identity collaborator and session-gated routing.

use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

impl UserProfile {
    /// ヘッダーの挨拶に使う名前
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            "Coder"
        } else {
            name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("credential is empty")]
    EmptyCredential,
    #[error("credential must not contain whitespace")]
    MalformedCredential,
}

/// What the dashboard needs from the identity provider
pub trait IdentityProvider: Send {
    fn is_authenticated(&self) -> bool;
    fn is_session_loading(&self) -> bool;
    fn current_user(&self) -> Option<&UserProfile>;
    /// Bearer token for backend calls
    fn session_token(&self) -> Option<&str>;
    fn login(&mut self, credential: &str) -> Result<(), SessionError>;
    fn logout(&mut self);
}

/// Bearer-token session fed from the CLI, environment, config or login screen
#[derive(Debug, Clone)]
pub struct TokenSession {
    profile: UserProfile,
    token: Option<String>,
    loading: bool,
}

impl TokenSession {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            profile,
            token: None,
            loading: false,
        }
    }

    pub fn with_token(profile: UserProfile, token: Option<String>) -> Self {
        let mut session = Self::new(profile);
        if let Some(token) = token {
            // 不正なトークンはログイン画面で入力し直す
            if session.login(&token).is_err() {
                tracing::warn!("ignoring malformed session token");
            }
        }
        session
    }

    /// Splash state while a credential is being restored
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

impl IdentityProvider for TokenSession {
    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn is_session_loading(&self) -> bool {
        self.loading
    }

    fn current_user(&self) -> Option<&UserProfile> {
        self.token.as_ref().map(|_| &self.profile)
    }

    fn session_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn login(&mut self, credential: &str) -> Result<(), SessionError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(SessionError::EmptyCredential);
        }
        if credential.chars().any(char::is_whitespace) {
            return Err(SessionError::MalformedCredential);
        }
        self.token = Some(credential.to_string());
        self.loading = false;
        Ok(())
    }

    fn logout(&mut self) {
        self.token = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SessionLoading,
    Login,
    Dashboard,
}

pub fn route_for(identity: &dyn IdentityProvider) -> Route {
    if identity.is_session_loading() {
        Route::SessionLoading
    } else if identity.is_authenticated() {
        Route::Dashboard
    } else {
        Route::Login
    }
}
