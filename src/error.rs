//! Error types.

use trust_dns_server::client::rr::LowerName;
use trust_dns_server::proto::error::ProtoError;

/// Error enumerates the possible Dyn Crab error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when a hostname resolves to zero, or to more than one,
    /// [`Host`][crate::directory::Host] record. Both cases are reported to clients as `nohost`
    /// so that callers can't tell an unregistered FQDN apart from a duplicated one.
    #[error("no unique host record for \"{0}\"")]
    NoHost(String),

    /// Returned when an address literal isn't a valid IPv4 or IPv6 address, or when it is valid
    /// but of a family that wasn't allowed by the caller of
    /// [`check_ip`][crate::ip::check_ip].
    #[error("invalid IP address: \"{0}\"")]
    InvalidIp(String),

    /// Returned when an update targets a name that isn't inside the configured
    /// [`Config::domain`][`crate::config::Config::domain`].
    #[error("name is not inside the served zone: \"{0}\"")]
    NotInZone(LowerName),

    /// Returned when a hostname can't be parsed as a DNS name.
    #[error("invalid DNS name: \"{0}\"")]
    InvalidName(String),

    /// Returned when the [session-owner update endpoint][crate::api#nicupdate_authorized-get] is
    /// requested without a session carrying an operator identity.
    #[error("login required")]
    LoginRequired,

    /// Returned when a [`Config`][`crate::config::Config`] host entry names an FQDN outside of
    /// the configured zone.
    #[error("configured host \"{0}\" is not inside the zone \"{1}\"")]
    HostOutsideZone(String, LowerName),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when processing JSON from disk (e.g. to
    /// [trying to load a `Config`][crate::config::Config::try_from_file], or to
    /// [trying to load a `FileZoneStore`][crate::zone::file::FileZoneStore::try_from_file] fails
    /// due to invalid JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),

    /// Returned when the Dyn Crab DNS server encounters a generic DNS protocol error.
    #[error("DNS error")]
    DNSError(#[from] ProtoError),
}
