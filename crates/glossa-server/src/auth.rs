use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use glossa_sdk::UserId;

use crate::config::AuthConfig;
use crate::error::{ServerError, ServerResult};

/// Header carrying a caller name when the server trusts its front proxy.
pub const USER_HEADER: &str = "x-glossa-user";

pub const ANONYMOUS: &str = "anonymous";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    Bearer(String),
    User(String),
    Anonymous,
}

impl Credentials {
    /// A bearer token wins over the user header.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty());
        if let Some(token) = bearer {
            return Self::Bearer(token.to_string());
        }
        match headers.get(USER_HEADER).and_then(|v| v.to_str().ok()) {
            Some(user) if !user.trim().is_empty() => Self::User(user.trim().to_string()),
            _ => Self::Anonymous,
        }
    }
}

/// Turns request credentials into the acting user.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<UserId>;
}

/// Authentication driven by [`AuthConfig`].
#[derive(Clone, Debug)]
pub struct ConfigAuth {
    tokens: HashMap<String, UserId>,
    trust_user_header: bool,
    allow_anonymous: bool,
}

impl ConfigAuth {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            tokens: config
                .tokens
                .iter()
                .map(|(token, user)| (token.clone(), UserId::new(user.as_str())))
                .collect(),
            trust_user_header: config.trust_user_header,
            allow_anonymous: config.allow_anonymous,
        }
    }
}

#[async_trait]
impl AuthProvider for ConfigAuth {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<UserId> {
        match credentials {
            Credentials::Bearer(token) => self
                .tokens
                .get(token)
                .cloned()
                .ok_or_else(|| ServerError::Unauthorized("unknown token".into())),
            Credentials::User(name) if self.trust_user_header => Ok(UserId::new(name.as_str())),
            Credentials::User(_) => Err(ServerError::Unauthorized(format!(
                "{USER_HEADER} is not accepted"
            ))),
            Credentials::Anonymous if self.allow_anonymous => Ok(UserId::new(ANONYMOUS)),
            Credentials::Anonymous => Err(ServerError::Unauthorized("credentials required".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn credentials_prefer_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static("alice"));
        assert_eq!(Credentials::from_headers(&headers), Credentials::User("alice".into()));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok123"));
        assert_eq!(
            Credentials::from_headers(&headers),
            Credentials::Bearer("tok123".into())
        );

        assert_eq!(Credentials::from_headers(&HeaderMap::new()), Credentials::Anonymous);
    }

    #[tokio::test]
    async fn default_config_trusts_header_and_anonymous() {
        let auth = ConfigAuth::new(&AuthConfig::default());
        let user = auth
            .authenticate(&Credentials::User("alice".into()))
            .await
            .unwrap();
        assert_eq!(user.as_str(), "alice");
        let anon = auth.authenticate(&Credentials::Anonymous).await.unwrap();
        assert_eq!(anon.as_str(), ANONYMOUS);
    }

    #[tokio::test]
    async fn locked_down_config_requires_known_token() {
        let config = AuthConfig {
            tokens: [("s3cret".to_string(), "olivia".to_string())].into(),
            trust_user_header: false,
            allow_anonymous: false,
        };
        let auth = ConfigAuth::new(&config);

        let user = auth
            .authenticate(&Credentials::Bearer("s3cret".into()))
            .await
            .unwrap();
        assert_eq!(user.as_str(), "olivia");

        for credentials in [
            Credentials::Bearer("guess".into()),
            Credentials::User("olivia".into()),
            Credentials::Anonymous,
        ] {
            assert!(matches!(
                auth.authenticate(&credentials).await,
                Err(ServerError::Unauthorized(_))
            ));
        }
    }
}
