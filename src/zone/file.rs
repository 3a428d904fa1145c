//! An JSON file-backed implementation of the [`ZoneStore`][super::ZoneStore] trait.
//!
//! Wraps a [`InMemoryZoneStore`][super::memory::InMemoryZoneStore] instance, persisting
//! changes to a JSON file on disk that can be reloaded across restarts.
use crate::error::Error;
use crate::zone::memory::{InMemoryZoneStore, ZoneState};
use crate::zone::{AddressRecord, UpdateOutcome, ZoneStore};
use std::io::ErrorKind;
use std::net::IpAddr;
use tokio::fs::File;
use tokio::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use trust_dns_server::client::rr::LowerName;

/// A file-backed zone store. After each change a JSON file on disk is updated with the new
/// data. This file can be reloaded across restarts to avoid losing state.
///
/// No-op updates ([`UpdateOutcome::Unchanged`]) don't touch the file.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct FileZoneStore {
    zone_store: InMemoryZoneStore,
    path: String,
}

impl FileZoneStore {
    /// Save the state of the zone store as JSON to the store's configured path, or return an
    /// Error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidJSON`] if the store state can't be serialized to JSON.
    ///
    /// Returns [`Error::IO`] if the serialized state can't be written to the backing file path.
    pub async fn save(&self) -> Result<(), Error> {
        let data = serde_json::to_string_pretty(self.zone_store.state())?;
        let mut output_file = File::create(&self.path).await?;
        output_file.write_all(data.as_bytes()).await?;
        output_file.flush().await?;
        Ok(())
    }

    /// Load a [`FileZoneStore`] for `origin` from the JSON state located at the given path,
    /// creating an empty state file if none exists yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidJSON`] if the JSON state file is invalid.
    ///
    /// Returns [`Error::IO`] if the path can't be opened or read.
    pub async fn try_from_file(p: &str, origin: LowerName) -> Result<Self, Error> {
        let contents = match File::open(p).await {
            Ok(mut f) => {
                let mut buf = vec![];
                f.read_to_end(&mut buf).await?;
                buf
            }
            Err(err) => match err.kind() {
                ErrorKind::NotFound => Self::write_empty_state(File::create(&p).await?).await?,
                _ => return Err(Error::IO(err)),
            },
        };

        let state: ZoneState = serde_json::from_slice(&contents)?;
        Ok(Self {
            path: p.to_string(),
            zone_store: InMemoryZoneStore::from_state(origin, state),
        })
    }

    async fn write_empty_state(mut f: File) -> io::Result<Vec<u8>> {
        let default_data = serde_json::to_string_pretty(&ZoneState::default())?;
        let default_bytes = default_data.as_bytes();
        f.write_all(default_bytes).await?;
        f.flush().await?;
        Ok(default_bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl ZoneStore for FileZoneStore {
    async fn update(&mut self, fqdn: &LowerName, addr: IpAddr) -> Result<UpdateOutcome, Error> {
        let outcome = self.zone_store.update(fqdn, addr).await?;
        if outcome == UpdateOutcome::Updated {
            self.save().await?;
        }
        Ok(outcome)
    }

    async fn get(&self, fqdn: &LowerName) -> Option<AddressRecord> {
        self.zone_store.get(fqdn).await
    }
}
