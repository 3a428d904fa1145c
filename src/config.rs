use crate::directory::{Host, InMemoryHostDirectory};
use crate::error::Error;
use crate::zone::{DynZoneStore, FileZoneStore, InMemoryZoneStore};
use ipnetwork::IpNetwork;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use trust_dns_server::client::rr::{LowerName, Name};

pub type SharedConfig = Arc<Config>;

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// The zone dynamic hosts live in, e.g. `dyn.example.com`.
    pub domain: LowerName,
    pub ns_domain: LowerName,
    pub ns_admin: String,
    pub zone_state_path: Option<String>,
    #[serde(default = "default_record_ttl")]
    pub record_ttl: u32,
    pub api_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub api_timeout: Duration,
    pub dns_udp_bind_addr: SocketAddr,
    pub dns_tcp_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub dns_tcp_timeout: Duration,
    #[serde(default)]
    pub ns_records: HashMap<LowerName, Vec<LowerName>>,
    /// User agents refused by the dyndns2 update endpoint. Matched exactly.
    #[serde(default)]
    pub bad_agents: HashSet<String>,
    /// Reverse proxies whose `X-Forwarded-For` header is trusted for the client address.
    #[serde(default)]
    pub trusted_proxies: Vec<IpNetwork>,
    #[serde(default = "default_session_cookie_name")]
    pub session_cookie_name: String,
    #[serde(default)]
    pub hosts: Vec<HostEntry>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct HostEntry {
    pub fqdn: String,
    pub owner: String,
    /// A hash produced by [`hash_secret`][crate::secret::hash_secret].
    pub update_secret: String,
}

fn default_record_ttl() -> u32 {
    60
}

fn default_session_cookie_name() -> String {
    "sessionid".to_string()
}

impl Config {
    /// Load and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] or [`Error::InvalidJSON`] if the file can't be read or parsed, and
    /// [`Error::HostOutsideZone`] if a configured host isn't inside [`Config::domain`].
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        conf.hosts_in_zone()?;
        Ok(conf)
    }

    /// Build a host directory holding every configured host.
    #[must_use]
    pub fn host_directory(&self) -> InMemoryHostDirectory {
        InMemoryHostDirectory::new(
            self.hosts
                .iter()
                .map(|h| Host::new(&h.fqdn, &h.owner, &h.update_secret))
                .collect(),
        )
    }

    /// Open the zone store: file-backed when [`Config::zone_state_path`] is set, in-memory
    /// otherwise.
    ///
    /// # Errors
    ///
    /// See [`FileZoneStore::try_from_file`].
    pub async fn zone_store(&self) -> Result<DynZoneStore, Error> {
        let zone_store: DynZoneStore = match &self.zone_state_path {
            Some(path) => Arc::new(RwLock::new(
                FileZoneStore::try_from_file(path, self.domain.clone()).await?,
            )),
            None => Arc::new(RwLock::new(InMemoryZoneStore::new(self.domain.clone()))),
        };
        Ok(zone_store)
    }

    #[must_use]
    pub fn is_bad_agent(&self, agent: &str) -> bool {
        self.bad_agents.contains(agent)
    }

    /// Resolve the address of the client behind a connection from `peer`. The right-most
    /// `X-Forwarded-For` entry is used only when `peer` is a trusted proxy.
    #[must_use]
    pub fn client_ip(&self, peer: IpAddr, forwarded_for: Option<&str>) -> IpAddr {
        if !self.trusted_proxies.iter().any(|net| net.contains(peer)) {
            return peer;
        }
        forwarded_for
            .and_then(|header| header.rsplit(',').next())
            .and_then(|hop| IpAddr::from_str(hop.trim()).ok())
            .unwrap_or(peer)
    }

    pub fn ns_admin(&self) -> Result<Name, Error> {
        Ok(Name::from_str(&self.sanitized_ns_admin())?)
    }

    fn sanitized_ns_admin(&self) -> Cow<str> {
        match self.ns_admin.split_once('@') {
            Some((user, domain)) => {
                let user = user.replace('.', "\\.");
                Cow::Owned(format!("{user}.{domain}"))
            }
            _ => Cow::Borrowed(&self.ns_admin),
        }
    }

    fn hosts_in_zone(&self) -> Result<(), Error> {
        for host in &self.hosts {
            let in_zone = crate::zone::fqdn(&host.fqdn)
                .map(|name| self.domain.zone_of(&name))
                .unwrap_or(false);
            if !in_zone {
                return Err(Error::HostOutsideZone(host.fqdn.clone(), self.domain.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn test_config() -> Config {
        serde_json::from_value(json!({
            "domain": "example.com.",
            "ns_domain": "ns1.example.com.",
            "ns_admin": "dns.admin@example.com",
            "zone_state_path": null,
            "api_bind_addr": "127.0.0.1:3000",
            "api_timeout": 5,
            "dns_udp_bind_addr": "127.0.0.1:5353",
            "dns_tcp_bind_addr": "127.0.0.1:5353",
            "dns_tcp_timeout": 5,
            "ns_records": { "example.com.": ["ns1.example.com."] },
            "bad_agents": ["BadRouter/1.0"],
            "trusted_proxies": ["10.0.0.0/8"],
            "hosts": []
        }))
        .unwrap()
    }

    #[test]
    fn defaults() {
        let config = test_config();
        assert_eq!(config.record_ttl, 60);
        assert_eq!(config.session_cookie_name, "sessionid");
        assert_eq!(config.api_timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_agents_match_exactly() {
        let config = test_config();
        assert!(config.is_bad_agent("BadRouter/1.0"));
        assert!(!config.is_bad_agent("BadRouter/1.1"));
        assert!(!config.is_bad_agent("badrouter/1.0"));
    }

    #[test]
    fn client_ip_trusts_only_proxies() {
        let config = test_config();
        let proxy: IpAddr = "10.1.2.3".parse().unwrap();
        let stranger: IpAddr = "198.51.100.7".parse().unwrap();
        let header = Some("192.0.2.1, 203.0.113.5");

        assert_eq!(config.client_ip(stranger, header), stranger);
        assert_eq!(
            config.client_ip(proxy, header),
            "203.0.113.5".parse::<IpAddr>().unwrap()
        );
        assert_eq!(config.client_ip(proxy, None), proxy);
        assert_eq!(config.client_ip(proxy, Some("garbage")), proxy);
    }

    #[test]
    fn ns_admin_escapes_user_dots() {
        let config = test_config();
        assert_eq!(config.ns_admin().unwrap().num_labels(), 3);
    }

    #[test]
    fn hosts_must_be_in_zone() {
        let mut config = test_config();
        config.hosts.push(HostEntry {
            fqdn: "foo.example.com".to_string(),
            owner: "alice".to_string(),
            update_secret: String::new(),
        });
        assert!(config.hosts_in_zone().is_ok());
        assert_eq!(config.host_directory().hosts().len(), 1);

        config.hosts.push(HostEntry {
            fqdn: "foo.example.org".to_string(),
            owner: "alice".to_string(),
            update_secret: String::new(),
        });
        assert!(matches!(
            config.hosts_in_zone(),
            Err(Error::HostOutsideZone(_, _))
        ));
    }

    #[test]
    fn loads_example_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config.example.json");
        let config = Config::try_from_file(path).unwrap();
        assert_eq!(config.hosts.len(), 1);
        assert!(crate::secret::verify_secret(
            "s3cr3t",
            &config.hosts[0].update_secret
        ));
        assert!(config.domain.zone_of(&crate::zone::fqdn("foo.dyn.example.com").unwrap()));
    }
}
