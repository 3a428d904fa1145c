use crate::error::Error;
use crate::zone::{AddressRecord, UpdateOutcome, ZoneStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;
use trust_dns_server::client::rr::LowerName;

/// Serializable zone contents, keyed by FQDN text (with trailing dot).
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneState {
    records: BTreeMap<String, AddressRecord>,
}

#[derive(Debug, Clone)]
pub struct InMemoryZoneStore {
    origin: LowerName,
    state: ZoneState,
}

impl InMemoryZoneStore {
    /// Create an empty store accepting names at or below `origin`.
    #[must_use]
    pub fn new(origin: LowerName) -> Self {
        Self::from_state(origin, ZoneState::default())
    }

    #[must_use]
    pub fn from_state(origin: LowerName, state: ZoneState) -> Self {
        Self { origin, state }
    }

    #[must_use]
    pub fn state(&self) -> &ZoneState {
        &self.state
    }
}

#[async_trait::async_trait]
impl ZoneStore for InMemoryZoneStore {
    async fn update(&mut self, fqdn: &LowerName, addr: IpAddr) -> Result<UpdateOutcome, Error> {
        if !fqdn.is_fqdn() || !self.origin.zone_of(fqdn) {
            return Err(Error::NotInZone(fqdn.clone()));
        }
        Ok(self
            .state
            .records
            .entry(fqdn.to_string())
            .or_default()
            .set(addr))
    }

    async fn get(&self, fqdn: &LowerName) -> Option<AddressRecord> {
        self.state.records.get(&fqdn.to_string()).copied()
    }
}
