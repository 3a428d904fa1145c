//! Server-side web sessions.
//!
//! Sessions are addressed by an opaque key. A browser normally presents that key as a cookie,
//! but the [IP detection beacon][crate::api#detectipsecret-get] receives it in the URL instead,
//! so a request arriving over a different address family (and origin) can still write into the
//! browser's session.

use crate::ip::IpKind;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::RwLock;

pub mod memory;

#[allow(clippy::module_name_repetitions)]
pub use memory::InMemorySessionStore;

/// `DynSessionStore` is a type alias for a [`SessionStore`] shared through an [`Arc`] and a
/// [`RwLock`].
#[allow(clippy::module_name_repetitions)]
pub type DynSessionStore = Arc<RwLock<dyn SessionStore + Send + Sync>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Username of the logged in operator, if any.
    pub user: Option<String>,
    pub ipv4: Option<String>,
    pub ipv4_timestamp: Option<OffsetDateTime>,
    pub ipv6: Option<String>,
    pub ipv6_timestamp: Option<OffsetDateTime>,
}

impl Session {
    #[must_use]
    pub fn for_user(user: &str) -> Self {
        Session {
            user: Some(user.to_string()),
            ..Session::default()
        }
    }

    /// Record `addr` as the detected address of the `kind` family.
    pub fn set_detected(&mut self, kind: IpKind, addr: &str, now: OffsetDateTime) {
        let (ip, timestamp) = match kind {
            IpKind::V4 => (&mut self.ipv4, &mut self.ipv4_timestamp),
            IpKind::V6 => (&mut self.ipv6, &mut self.ipv6_timestamp),
        };
        *ip = Some(addr.to_string());
        *timestamp = Some(now);
    }
}

#[async_trait::async_trait]
pub trait SessionStore {
    /// Load the session addressed by `key` (if any).
    async fn load(&self, key: &str) -> Option<Session>;

    /// Store `session` under `key`, replacing any existing session.
    async fn save(&mut self, key: &str, session: Session);
}
