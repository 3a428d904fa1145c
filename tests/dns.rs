use dyncrab::zone::{fqdn, DynZoneStore, InMemoryZoneStore, ZoneStore};
use dyncrab::Config;
use serde_json::json;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::RwLock;
use trust_dns_client::client::{AsyncClient, ClientHandle};
use trust_dns_client::op::ResponseCode;
use trust_dns_client::rr::{DNSClass, Name, RData, RecordType};
use trust_dns_client::udp::UdpClientStream;

fn config() -> Config {
    serde_json::from_value(json!({
        "domain": "example.com.",
        "ns_domain": "ns1.example.com.",
        "ns_admin": "dns-admin@example.com",
        "zone_state_path": null,
        "record_ttl": 30,
        "api_bind_addr": "127.0.0.1:0",
        "api_timeout": 5,
        "dns_udp_bind_addr": "127.0.0.1:0",
        "dns_tcp_bind_addr": "127.0.0.1:0",
        "dns_tcp_timeout": 5,
        "ns_records": { "example.com.": ["ns1.example.com."] }
    }))
    .unwrap()
}

async fn start() -> (AsyncClient, DynZoneStore) {
    let config = Arc::new(config());
    let mut store = InMemoryZoneStore::new(config.domain.clone());
    store
        .update(&fqdn("foo.example.com").unwrap(), "203.0.113.5".parse().unwrap())
        .await
        .unwrap();
    let zone_store: DynZoneStore = Arc::new(RwLock::new(store));

    let udp_socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = udp_socket.local_addr().unwrap();
    let tcp_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server = dyncrab::dns::serve(config, zone_store.clone(), udp_socket, tcp_listener);
    tokio::spawn(server.block_until_done());

    let stream = UdpClientStream::<UdpSocket>::new(addr);
    let (client, background) = AsyncClient::connect(stream).await.unwrap();
    tokio::spawn(background);
    (client, zone_store)
}

fn name(s: &str) -> Name {
    Name::from_str(s).unwrap()
}

#[tokio::test]
async fn serves_published_addresses() {
    let (mut client, zone_store) = start().await;

    let response = client
        .query(name("foo.example.com."), DNSClass::IN, RecordType::A)
        .await
        .unwrap();
    assert_eq!(response.response_code(), ResponseCode::NoError);
    assert_eq!(response.answers().len(), 1);
    assert_eq!(response.answers()[0].ttl(), 30);
    assert_eq!(
        response.answers()[0].data(),
        Some(&RData::A("203.0.113.5".parse().unwrap()))
    );

    // No AAAA yet: the name exists but has no data of that type.
    let response = client
        .query(name("foo.example.com."), DNSClass::IN, RecordType::AAAA)
        .await
        .unwrap();
    assert_eq!(response.response_code(), ResponseCode::NoError);
    assert!(response.answers().is_empty());

    zone_store
        .write()
        .await
        .update(&fqdn("foo.example.com").unwrap(), "2001:db8::5".parse().unwrap())
        .await
        .unwrap();
    let response = client
        .query(name("foo.example.com."), DNSClass::IN, RecordType::AAAA)
        .await
        .unwrap();
    assert_eq!(
        response.answers()[0].data(),
        Some(&RData::AAAA("2001:db8::5".parse().unwrap()))
    );
}

#[tokio::test]
async fn unknown_names_are_nxdomain() {
    let (mut client, _) = start().await;
    let response = client
        .query(name("bar.example.com."), DNSClass::IN, RecordType::A)
        .await
        .unwrap();
    assert_eq!(response.response_code(), ResponseCode::NXDomain);
}

#[tokio::test]
async fn serves_static_records() {
    let (mut client, _) = start().await;

    let response = client
        .query(name("example.com."), DNSClass::IN, RecordType::NS)
        .await
        .unwrap();
    assert_eq!(
        response.answers()[0].data(),
        Some(&RData::NS(name("ns1.example.com.")))
    );

    let response = client
        .query(name("example.com."), DNSClass::IN, RecordType::SOA)
        .await
        .unwrap();
    assert_eq!(response.answers().len(), 1);
    assert_eq!(response.answers()[0].record_type(), RecordType::SOA);
}
