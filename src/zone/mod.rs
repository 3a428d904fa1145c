//! Dynamic address record storage.
//!
//! Holds the `A` and `AAAA` data served by the [DNS server][crate::dns] for each updated name
//! inside the configured [`Config::domain`][`crate::config::Config::domain`]. Each name has at
//! most one address per family and an update replaces it.
//!
//! Two implementations are provided, [`memory::InMemoryZoneStore`] and [`file::FileZoneStore`].
//! The former is not durable across restarts. The latter will write its state to disk for each
//! change and load this state again on startup.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use trust_dns_server::client::rr::{LowerName, Name};

pub mod file;
pub mod memory;

#[allow(clippy::module_name_repetitions)]
pub use file::FileZoneStore;
#[allow(clippy::module_name_repetitions)]
pub use memory::InMemoryZoneStore;

/// `DynZoneStore` is a type alias for a [`ZoneStore`] that can be used by multiple read/write
/// consumers that coordinate through an [`Arc`] and a [`RwLock`] wrapping the [`ZoneStore`].
#[allow(clippy::module_name_repetitions)]
pub type DynZoneStore = Arc<RwLock<dyn ZoneStore + Send + Sync>>;

/// The addresses currently served for a name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub a: Option<Ipv4Addr>,
    pub aaaa: Option<Ipv6Addr>,
}

impl AddressRecord {
    /// Set the address of `addr`'s family, reporting whether anything changed.
    pub fn set(&mut self, addr: IpAddr) -> UpdateOutcome {
        let changed = match addr {
            IpAddr::V4(v4) => self.a.replace(v4) != Some(v4),
            IpAddr::V6(v6) => self.aaaa.replace(v6) != Some(v6),
        };
        if changed {
            UpdateOutcome::Updated
        } else {
            UpdateOutcome::Unchanged
        }
    }
}

/// The result of a successful [`ZoneStore::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    /// The name already had this address. Nothing was written.
    Unchanged,
}

/// An async trait describing dynamic storage of address records, keyed by the FQDN they should
/// be served for in the [DNS API][crate::dns].
#[async_trait::async_trait]
pub trait ZoneStore {
    /// Point `fqdn` at `addr` for `addr`'s address family.
    async fn update(&mut self, fqdn: &LowerName, addr: IpAddr) -> Result<UpdateOutcome, Error>;

    /// Get the address record for the given FQDN (if any).
    async fn get(&self, fqdn: &LowerName) -> Option<AddressRecord>;
}

/// Parse `hostname` as a fully qualified [`LowerName`], with or without the trailing root dot.
///
/// # Errors
///
/// Returns [`Error::InvalidName`] if `hostname` isn't a valid DNS name.
pub fn fqdn(hostname: &str) -> Result<LowerName, Error> {
    let mut name = Name::from_str(hostname).map_err(|_| Error::InvalidName(hostname.to_string()))?;
    name.set_fqdn(true);
    Ok(LowerName::from(name))
}
