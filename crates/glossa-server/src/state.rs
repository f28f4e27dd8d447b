use std::sync::Arc;

use axum::http::HeaderMap;
use glossa_sdk::{Glossa, GlossaResult, UserId};

use crate::auth::{AuthProvider, Credentials};
use crate::error::{ServerError, ServerResult};

/// Shared handler state. Everything mutable lives in the database.
#[derive(Clone)]
pub struct AppState {
    glossa: Arc<Glossa>,
    auth: Arc<dyn AuthProvider>,
}

impl AppState {
    pub fn new(glossa: Arc<Glossa>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { glossa, auth }
    }

    pub async fn caller(&self, headers: &HeaderMap) -> ServerResult<UserId> {
        self.auth
            .authenticate(&Credentials::from_headers(headers))
            .await
    }

    /// Run a synchronous Glossa call on the blocking pool.
    pub async fn run<T, F>(&self, f: F) -> ServerResult<T>
    where
        F: FnOnce(&Glossa) -> GlossaResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let glossa = self.glossa.clone();
        let result = tokio::task::spawn_blocking(move || f(&glossa))
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        Ok(result?)
    }
}
