//! Registered host records.
//!
//! The directory answers "which host records match this FQDN (and owner)?" and records when
//! an address family of a host was last confirmed by a client. Matching never assumes
//! uniqueness: callers must check that exactly one record came back.

use crate::ip::IpKind;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::RwLock;

pub mod memory;

#[allow(clippy::module_name_repetitions)]
pub use memory::InMemoryHostDirectory;

/// `DynHostDirectory` is a type alias for a [`HostDirectory`] that can be used by multiple
/// read/write consumers that coordinate through an [`Arc`] and a [`RwLock`].
#[allow(clippy::module_name_repetitions)]
pub type DynHostDirectory = Arc<RwLock<dyn HostDirectory + Send + Sync>>;

/// A host registered for dynamic updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub fqdn: String,
    /// Username of the operator owning the host.
    pub owner: String,
    /// Salted hash of the update secret, see [`crate::secret`].
    pub update_secret: String,
    pub last_update: Option<OffsetDateTime>,
    pub last_update_ipv4: Option<OffsetDateTime>,
    pub last_update_ipv6: Option<OffsetDateTime>,
}

impl Host {
    #[must_use]
    pub fn new(fqdn: &str, owner: &str, update_secret: &str) -> Self {
        Host {
            fqdn: fqdn.to_string(),
            owner: owner.to_string(),
            update_secret: update_secret.to_string(),
            last_update: None,
            last_update_ipv4: None,
            last_update_ipv6: None,
        }
    }

    /// Mark the `kind` address family as confirmed at `now`.
    pub fn poke(&mut self, kind: IpKind, now: OffsetDateTime) {
        self.last_update = Some(now);
        match kind {
            IpKind::V4 => self.last_update_ipv4 = Some(now),
            IpKind::V6 => self.last_update_ipv6 = Some(now),
        }
    }

    /// Whether this host is named by `fqdn`, ignoring ASCII case and a trailing root dot.
    #[must_use]
    pub fn matches_fqdn(&self, fqdn: &str) -> bool {
        normalize_fqdn(&self.fqdn) == normalize_fqdn(fqdn)
    }
}

#[must_use]
pub fn normalize_fqdn(fqdn: &str) -> String {
    fqdn.strip_suffix('.').unwrap_or(fqdn).to_ascii_lowercase()
}

/// An async trait describing lookup and bookkeeping of registered [`Host`]s.
#[async_trait::async_trait]
pub trait HostDirectory {
    /// All hosts named `fqdn`, restricted to those owned by `owner` when given.
    async fn filter_by_fqdn(&self, fqdn: &str, owner: Option<&str>) -> Vec<Host>;

    /// Mark the `kind` address family of every host named `fqdn` as confirmed now.
    async fn poke(&mut self, fqdn: &str, kind: IpKind);
}

/// The single host named `fqdn` (and owned by `owner`, when given). Zero and multiple matches
/// both yield `None`; multiple matches are logged as a data integrity error.
pub async fn unique_host(
    directory: &(dyn HostDirectory + Send + Sync),
    fqdn: &str,
    owner: Option<&str>,
) -> Option<Host> {
    let mut hosts = directory.filter_by_fqdn(fqdn, owner).await;
    match hosts.len() {
        1 => hosts.pop(),
        0 => None,
        n => {
            tracing::error!(fqdn, matches = n, "fqdn has multiple entries");
            None
        }
    }
}
