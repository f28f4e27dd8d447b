use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use glossa_sdk::{Role, StoreConfig};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

pub const DEFAULT_PORT: u16 = 8470;

/// Server settings, loaded from a TOML file.
///
/// ```toml
/// bind_addr = "0.0.0.0:8470"
///
/// [store]
/// path = "/var/lib/glossa/glossa.db"
/// busy_timeout_ms = 5000
/// copy_batch_size = 500
///
/// [auth]
/// trust_user_header = false
/// tokens = { "s3cret" = "olivia" }
///
/// [[grants]]
/// user = "olivia"
/// project = "acme"
/// role = "owner"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    /// Project roles. When empty every caller may do everything.
    pub grants: Vec<GrantConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
            store: StoreConfig::default(),
            auth: AuthConfig::default(),
            grants: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> ServerResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> ServerResult<Self> {
        toml::from_str(raw).map_err(|e| ServerError::Config(e.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Bearer token to user name.
    pub tokens: BTreeMap<String, String>,
    /// Accept the `x-glossa-user` header as the caller's identity.
    pub trust_user_header: bool,
    /// Treat requests without credentials as the `anonymous` user.
    pub allow_anonymous: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            tokens: BTreeMap::new(),
            trust_user_header: true,
            allow_anonymous: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantConfig {
    pub user: String,
    pub project: String,
    pub role: Role,
}
