//! Dyn Crab
//!
//! A small [dyndns2] compatible dynamic DNS service. Routers and other update clients
//! authenticate with a per-host secret and publish their current address, which is served by a
//! built-in authoritative DNS server for the configured zone.
//!
//! [dyndns2]: https://help.dyn.com/remote-access-api/
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod config;
pub mod directory;
pub mod dns;
pub mod error;
pub mod ip;
pub mod secret;
pub mod session;
pub mod zone;

pub use api::new as new_http;
pub use config::{Config, SharedConfig};
pub use directory::InMemoryHostDirectory;
pub use dns::new as new_dns;
pub use session::InMemorySessionStore;
pub use zone::{FileZoneStore, InMemoryZoneStore};
