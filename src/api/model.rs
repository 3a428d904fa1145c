use crate::config::Config;
use axum::http::header::{AUTHORIZATION, USER_AGENT};
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use super::auth::{basic_challenge, REALM};

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Agent reported for requests without a `User-Agent` header.
pub(super) const UNKNOWN_AGENT: &str = "unknown";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct UpdateParams {
    pub hostname: Option<String>,
    pub myip: Option<String>,
}

impl UpdateParams {
    /// Pick the update parameters out of raw query pairs. The first occurrence of a repeated
    /// key wins and unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = UpdateParams::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "hostname" => &mut params.hostname,
                "myip" => &mut params.myip,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        params
    }
}

/// Everything an update handler needs from the inbound request, extracted once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RequestContext {
    pub hostname: Option<String>,
    pub myip: Option<String>,
    pub agent: String,
    pub authorization: Option<String>,
    pub client_ip: IpAddr,
}

impl RequestContext {
    pub fn new(
        config: &Config,
        params: UpdateParams,
        headers: &HeaderMap,
        peer: SocketAddr,
    ) -> Self {
        let header = |name: &HeaderName| headers.get(name).and_then(|v| v.to_str().ok());
        RequestContext {
            hostname: params.hostname,
            myip: params.myip,
            agent: header(&USER_AGENT).unwrap_or(UNKNOWN_AGENT).to_string(),
            authorization: header(&AUTHORIZATION).map(ToString::to_string),
            client_ip: client_ip(config, headers, peer),
        }
    }
}

/// The address of the client behind `peer`, see [`Config::client_ip`].
pub(super) fn client_ip(config: &Config, headers: &HeaderMap, peer: SocketAddr) -> IpAddr {
    let forwarded_for = headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok());
    config.client_ip(peer.ip(), forwarded_for)
}

/// The dyndns2 response vocabulary. The rendered text is the entire response body and is
/// parsed by clients, so it must not change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Status {
    Good(String),
    NoChg(String),
    NoHost,
    BadAgent,
    NoAuth,
    BadAuth,
    BadIp,
    DnsErr,
    ServerError,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Good(ip) => write!(f, "good {ip}"),
            Status::NoChg(ip) => write!(f, "nochg {ip}"),
            Status::NoHost => f.write_str("nohost"),
            Status::BadAgent => f.write_str("badagent"),
            Status::NoAuth => f.write_str("noauth"),
            Status::BadAuth => f.write_str("badauth"),
            Status::BadIp => f.write_str("badip"),
            Status::DnsErr => f.write_str("dnserr"),
            Status::ServerError => f.write_str("911"),
        }
    }
}

impl IntoResponse for Status {
    fn into_response(self) -> Response {
        let body = self.to_string();
        match self {
            Status::NoAuth | Status::BadAuth => basic_challenge(REALM, &body),
            Status::BadIp => (StatusCode::BAD_REQUEST, body).into_response(),
            Status::DnsErr | Status::ServerError => {
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
            Status::Good(_) | Status::NoChg(_) | Status::NoHost | Status::BadAgent => {
                (StatusCode::OK, body).into_response()
            }
        }
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct DetectedIps {
    pub ipv4: Option<String>,
    pub ipv6: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;
    use axum::http::HeaderValue;

    #[test]
    fn status_tokens() {
        assert_eq!(Status::Good("203.0.113.5".into()).to_string(), "good 203.0.113.5");
        assert_eq!(Status::NoChg("2001:db8::5".into()).to_string(), "nochg 2001:db8::5");
        assert_eq!(Status::NoHost.to_string(), "nohost");
        assert_eq!(Status::BadAgent.to_string(), "badagent");
        assert_eq!(Status::NoAuth.to_string(), "noauth");
        assert_eq!(Status::BadAuth.to_string(), "badauth");
    }

    #[test]
    fn status_codes() {
        assert_eq!(Status::NoHost.into_response().status(), StatusCode::OK);
        assert_eq!(Status::BadAuth.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Status::BadIp.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Status::DnsErr.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn params_take_first_value() {
        let pairs = vec![
            ("myip".to_string(), "203.0.113.5".to_string()),
            ("wildcard".to_string(), "NOCHG".to_string()),
            ("hostname".to_string(), "foo.example.com".to_string()),
            ("myip".to_string(), "203.0.113.6".to_string()),
            ("hostname".to_string(), "bar.example.com".to_string()),
        ];
        let params = UpdateParams::from_pairs(pairs);
        assert_eq!(params.hostname.as_deref(), Some("foo.example.com"));
        assert_eq!(params.myip.as_deref(), Some("203.0.113.5"));
        assert_eq!(UpdateParams::from_pairs(vec![]), UpdateParams::default());
    }

    #[test]
    fn context_defaults() {
        let config = test_config();
        let peer: SocketAddr = "198.51.100.7:40000".parse().unwrap();
        let ctx = RequestContext::new(&config, UpdateParams::default(), &HeaderMap::new(), peer);
        assert_eq!(ctx.agent, UNKNOWN_AGENT);
        assert_eq!(ctx.authorization, None);
        assert_eq!(ctx.client_ip, peer.ip());
    }

    #[test]
    fn context_reads_headers() {
        let config = test_config();
        let peer: SocketAddr = "10.0.0.1:40000".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("inadyn/2.9"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.5"));
        let params = UpdateParams {
            hostname: Some("foo.example.com".into()),
            myip: None,
        };

        let ctx = RequestContext::new(&config, params, &headers, peer);
        assert_eq!(ctx.agent, "inadyn/2.9");
        assert_eq!(ctx.authorization.as_deref(), Some("Basic Zm9vOmJhcg=="));
        assert_eq!(ctx.hostname.as_deref(), Some("foo.example.com"));
        assert_eq!(ctx.client_ip, "203.0.113.5".parse::<IpAddr>().unwrap());
    }
}
