use crate::api::routes;
use crate::config::SharedConfig;
use crate::directory::DynHostDirectory;
use crate::session::DynSessionStore;
use crate::zone::DynZoneStore;
use std::future::Future;
use std::net::SocketAddr;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: SharedConfig,
    pub directory: DynHostDirectory,
    pub zone_store: DynZoneStore,
    pub sessions: DynSessionStore,
}

pub fn new(
    config: SharedConfig,
    directory: DynHostDirectory,
    zone_store: DynZoneStore,
    sessions: DynSessionStore,
) -> impl Future<Output = hyper::Result<()>> {
    axum::Server::bind(&config.api_bind_addr).serve(
        routes::new(AppState {
            config,
            directory,
            zone_store,
            sessions,
        })
        .into_make_service_with_connect_info::<SocketAddr>(),
    )
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::config::tests::test_config;
    use crate::directory::{Host, InMemoryHostDirectory};
    use crate::secret::hash_secret;
    use crate::session::InMemorySessionStore;
    use crate::zone::InMemoryZoneStore;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    pub(in crate::api) const SECRET: &str = "s3cr3t";

    /// `foo.example.com` (alice) and `bar.example.com` (bob) with [`SECRET`], plus a
    /// duplicated `dup.example.com`.
    pub(in crate::api) fn test_directory() -> InMemoryHostDirectory {
        let secret = hash_secret(SECRET);
        InMemoryHostDirectory::new(vec![
            Host::new("foo.example.com", "alice", &secret),
            Host::new("bar.example.com", "bob", &secret),
            Host::new("dup.example.com", "alice", &secret),
            Host::new("dup.example.com", "alice", &secret),
        ])
    }

    pub(in crate::api) fn test_state() -> AppState {
        test_state_with(Arc::new(RwLock::new(test_directory())))
    }

    pub(in crate::api) fn test_state_with(directory: DynHostDirectory) -> AppState {
        let config = test_config();
        let zone_store = InMemoryZoneStore::new(config.domain.clone());
        AppState {
            config: Arc::new(config),
            directory,
            zone_store: Arc::new(RwLock::new(zone_store)),
            sessions: Arc::new(RwLock::new(InMemorySessionStore::default())),
        }
    }
}
