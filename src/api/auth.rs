// src/api/auth.rs

use reqwest::Method;
use url::Url;
use validator::Validate;

use super::{ApiClient, server_message};
use crate::{
    error::ClientError,
    models::user::{AuthResponse, LoginRequest, RegisterRequest},
};

/// Which credential exchange to perform.
#[derive(Debug, Clone)]
pub enum AuthAction {
    Register(RegisterRequest),
    Login(LoginRequest),
}

impl AuthAction {
    fn path(&self) -> &'static str {
        match self {
            AuthAction::Register(_) => "/api/register",
            AuthAction::Login(_) => "/api/login",
        }
    }

    fn fallback_message(&self) -> &'static str {
        match self {
            AuthAction::Register(_) => "Registration failed. Please try again.",
            AuthAction::Login(_) => "Login failed. Please try again.",
        }
    }
}

/// Third-party sign-in providers reached by full-page redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    WeChat,
    Weibo,
}

impl OAuthProvider {
    fn path(self) -> &'static str {
        match self {
            OAuthProvider::WeChat => "/api/auth/wechat",
            OAuthProvider::Weibo => "/api/auth/weibo",
        }
    }
}

impl ApiClient {
    /// Exchanges credentials for a bearer token.
    ///
    /// On success the `access_token` is stored in the session and the whole
    /// payload is returned. Every failure becomes `AuthError` carrying the
    /// server's `detail`, or a generic fallback, and leaves the stored token alone.
    pub async fn authenticate(&self, action: AuthAction) -> Result<AuthResponse, ClientError> {
        let fallback = action.fallback_message();

        let result = match &action {
            AuthAction::Register(payload) => self.post_credentials(action.path(), payload).await,
            AuthAction::Login(payload) => self.post_credentials(action.path(), payload).await,
        };

        let response = result.map_err(|e| {
            tracing::error!("Authentication failed: {:?}", e);
            match e {
                ClientError::AuthError(msg) if !msg.is_empty() => ClientError::AuthError(msg),
                ClientError::BadRequest(msg) => ClientError::AuthError(msg),
                _ => ClientError::AuthError(fallback.to_string()),
            }
        })?;

        self.session().set_token(&response.access_token)?;
        tracing::info!("Authenticated, token stored");
        Ok(response)
    }

    pub async fn register(&self, payload: RegisterRequest) -> Result<AuthResponse, ClientError> {
        self.authenticate(AuthAction::Register(payload)).await
    }

    pub async fn login(&self, payload: LoginRequest) -> Result<AuthResponse, ClientError> {
        self.authenticate(AuthAction::Login(payload)).await
    }

    /// Drops the stored token. Requests already in flight keep theirs.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.session().clear_token()?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Redirect target for a third-party sign-in; not a JSON endpoint.
    pub fn oauth_url(&self, provider: OAuthProvider) -> Result<Url, ClientError> {
        self.url(provider.path())
    }

    /// Posts credentials. A rejection carries only the server's own message,
    /// empty when the body had none.
    async fn post_credentials<T>(&self, path: &str, payload: &T) -> Result<AuthResponse, ClientError>
    where
        T: serde::Serialize + Validate + Sync,
    {
        payload.validate()?;
        let builder = self.request(Method::POST, path)?.json(payload);
        let response = self.send_raw(builder).await?;

        if !response.status().is_success() {
            let (_, _, body) = Self::read_failure(response).await;
            return Err(ClientError::AuthError(server_message(&body).unwrap_or_default()));
        }

        response.json::<AuthResponse>().await.map_err(ClientError::from)
    }
}
