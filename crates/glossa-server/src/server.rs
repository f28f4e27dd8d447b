use std::sync::Arc;

use glossa_sdk::{
    AllowAll, Glossa, GlossaError, ProjectAccess, SqliteStore, StaticAccessList, TracingEventSink,
};
use tokio::net::TcpListener;

use crate::auth::ConfigAuth;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// Glossa HTTP server.
pub struct GlossaServer {
    config: ServerConfig,
    state: AppState,
}

impl GlossaServer {
    /// Open the store and wire the collaborators described by `config`.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = SqliteStore::open(config.store.clone()).map_err(GlossaError::from)?;
        let glossa = Glossa::builder(Arc::new(store))
            .access(access_from_config(&config))
            .events(Arc::new(TracingEventSink))
            .build();
        let state = AppState::new(Arc::new(glossa), Arc::new(ConfigAuth::new(&config.auth)));
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = build_router(self.state);
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            grants = self.config.grants.len(),
            "Glossa server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

fn access_from_config(config: &ServerConfig) -> Arc<dyn ProjectAccess> {
    if config.grants.is_empty() {
        return Arc::new(AllowAll);
    }
    let list = StaticAccessList::new();
    for grant in &config.grants {
        list.grant(grant.user.as_str(), grant.project.as_str(), grant.role);
    }
    Arc::new(list)
}

#[cfg(test)]
mod tests {
    use glossa_sdk::{ProjectId, Role, UserId};

    use super::*;
    use crate::config::GrantConfig;

    #[test]
    fn server_construction() {
        let server = GlossaServer::new(ServerConfig::default()).unwrap();
        assert_eq!(server.config().bind_addr, "127.0.0.1:8470".parse().unwrap());
        let _router = server.router();
    }

    #[test]
    fn grants_switch_to_access_list() {
        let open = access_from_config(&ServerConfig::default());
        assert!(open
            .verify_project_access(&UserId::new("anyone"), &ProjectId::new("acme"), Role::MAINTAINERS)
            .is_ok());

        let config = ServerConfig {
            grants: vec![GrantConfig {
                user: "olivia".into(),
                project: "acme".into(),
                role: Role::Translator,
            }],
            ..ServerConfig::default()
        };
        let access = access_from_config(&config);
        let olivia = UserId::new("olivia");
        let acme = ProjectId::new("acme");
        assert!(access.verify_project_access(&olivia, &acme, Role::EDITORS).is_ok());
        assert!(access.verify_project_access(&olivia, &acme, Role::MAINTAINERS).is_err());
        assert!(access
            .verify_project_access(&UserId::new("mallory"), &acme, Role::ANY)
            .is_err());
    }

    #[test]
    fn file_backed_store_opens() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            store: glossa_sdk::StoreConfig::at_path(dir.path().join("glossa.db")),
            ..ServerConfig::default()
        };
        assert!(GlossaServer::new(config).is_ok());
    }
}
