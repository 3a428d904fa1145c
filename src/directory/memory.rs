use crate::directory::{Host, HostDirectory};
use crate::ip::IpKind;
use time::OffsetDateTime;

/// A [`HostDirectory`] held in memory, usually seeded from the
/// [`Config::hosts`][`crate::config::Config::hosts`] list. Duplicate FQDNs are kept as-is.
#[derive(Default, Debug, Clone)]
pub struct InMemoryHostDirectory {
    hosts: Vec<Host>,
}

impl InMemoryHostDirectory {
    #[must_use]
    pub fn new(hosts: Vec<Host>) -> Self {
        Self { hosts }
    }

    #[must_use]
    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }
}

#[async_trait::async_trait]
impl HostDirectory for InMemoryHostDirectory {
    async fn filter_by_fqdn(&self, fqdn: &str, owner: Option<&str>) -> Vec<Host> {
        self.hosts
            .iter()
            .filter(|h| h.matches_fqdn(fqdn))
            .filter(|h| owner.map_or(true, |owner| h.owner == owner))
            .cloned()
            .collect()
    }

    async fn poke(&mut self, fqdn: &str, kind: IpKind) {
        let now = OffsetDateTime::now_utc();
        self.hosts
            .iter_mut()
            .filter(|h| h.matches_fqdn(fqdn))
            .for_each(|h| h.poke(kind, now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> InMemoryHostDirectory {
        InMemoryHostDirectory::new(vec![
            Host::new("foo.example.com", "alice", "x"),
            Host::new("bar.example.com", "bob", "x"),
        ])
    }

    #[tokio::test]
    async fn filters_case_insensitively() {
        let dir = directory();
        assert_eq!(dir.filter_by_fqdn("FOO.example.com.", None).await.len(), 1);
        assert!(dir.filter_by_fqdn("baz.example.com", None).await.is_empty());
    }

    #[tokio::test]
    async fn filters_by_owner() {
        let dir = directory();
        assert_eq!(dir.filter_by_fqdn("foo.example.com", Some("alice")).await.len(), 1);
        assert!(dir.filter_by_fqdn("foo.example.com", Some("bob")).await.is_empty());
    }

    #[tokio::test]
    async fn poke_marks_family() {
        let mut dir = directory();
        dir.poke("foo.example.com", IpKind::V6).await;
        let host = &dir.hosts()[0];
        assert!(host.last_update.is_some());
        assert!(host.last_update_ipv6.is_some());
        assert!(host.last_update_ipv4.is_none());
        assert!(dir.hosts()[1].last_update.is_none());
    }
}
