use crate::config::SharedConfig;
use crate::dns::handlers::Handler;
use crate::zone::DynZoneStore;
use tokio::net::{TcpListener, UdpSocket};
use trust_dns_server::ServerFuture;

/// Bind the configured UDP and TCP addresses and serve the zone on them.
pub async fn new(
    config: SharedConfig,
    zone_store: DynZoneStore,
) -> anyhow::Result<ServerFuture<Handler>> {
    let udp_socket = UdpSocket::bind(config.dns_udp_bind_addr).await?;
    let tcp_listener = TcpListener::bind(config.dns_tcp_bind_addr).await?;
    Ok(serve(config, zone_store, udp_socket, tcp_listener))
}

/// Serve the zone on already bound sockets.
#[must_use]
pub fn serve(
    config: SharedConfig,
    zone_store: DynZoneStore,
    udp_socket: UdpSocket,
    tcp_listener: TcpListener,
) -> ServerFuture<Handler> {
    let tcp_timeout = config.dns_tcp_timeout;
    let dns_handler = Handler::new(config, zone_store);
    let mut dns_server = ServerFuture::new(dns_handler);
    dns_server.register_socket(udp_socket);
    dns_server.register_listener(tcp_listener, tcp_timeout);
    dns_server
}
