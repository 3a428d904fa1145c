use crate::api::model::Status;
use crate::api::server::AppState;
use crate::directory::unique_host;
use crate::error::Error;
use crate::ip::{parse_ip, IpKind, ANY_KIND};
use crate::zone::{self, UpdateOutcome};

/// Point `hostname` at `ipaddr`.
///
/// The host's address family is poked as confirmed before the zone is touched, so it is
/// recorded even when the zone already held `ipaddr`. The literal `ipaddr` text is echoed back
/// in the response.
pub(super) async fn update(
    state: &AppState,
    hostname: &str,
    ipaddr: &str,
    agent: &str,
) -> Result<Status, Error> {
    let host = {
        let directory = state.directory.read().await;
        unique_host(&*directory, hostname, None).await
    };
    let Some(host) = host else {
        tracing::info!(hostname, ip = ipaddr, agent, "update for unknown host");
        return Err(Error::NoHost(hostname.to_string()));
    };

    let addr = parse_ip(ipaddr, ANY_KIND).map_err(|err| {
        tracing::info!(hostname, ip = ipaddr, agent, "update with invalid ip");
        err
    })?;
    let kind = IpKind::from(&addr);
    let fqdn = zone::fqdn(&host.fqdn)?;

    state.directory.write().await.poke(&host.fqdn, kind).await;

    let outcome = state.zone_store.write().await.update(&fqdn, addr).await;
    match outcome {
        Ok(UpdateOutcome::Updated) => {
            tracing::info!(hostname, ip = ipaddr, agent, "received good update");
            Ok(Status::Good(ipaddr.to_string()))
        }
        Ok(UpdateOutcome::Unchanged) => {
            tracing::warn!(hostname, ip = ipaddr, agent, "received no-change update");
            Ok(Status::NoChg(ipaddr.to_string()))
        }
        Err(err) => {
            tracing::error!(hostname, ip = ipaddr, agent, "zone update failed: {err}");
            Err(err)
        }
    }
}
