use anyhow::{anyhow, Result};
use dyncrab::error::Error::DNSError;
use dyncrab::{Config, InMemorySessionStore, SharedConfig};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::RwLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().take(3);
    let program_name = args.next().unwrap_or("dyncrab".to_string());
    let (first, second) = (args.next(), args.next());

    if let (Some("hash-secret"), Some(secret)) = (first.as_deref(), second.as_deref()) {
        println!("{}", dyncrab::secret::hash_secret(secret));
        return Ok(());
    }

    tracing_init();

    let config = config_init(&program_name, first)?;
    let zone_store = config.zone_store().await?;
    let directory = Arc::new(RwLock::new(config.host_directory()));
    let sessions = Arc::new(RwLock::new(InMemorySessionStore::default()));
    tracing::info!(hosts = config.hosts.len(), "serving zone {}", &config.domain);

    tracing::info!("DNS listening on UDP {}", &config.dns_udp_bind_addr);
    tracing::info!("DNS listening on TCP {}", &config.dns_tcp_bind_addr);
    let dns_server = dyncrab::dns::new(config.clone(), zone_store.clone()).await?;
    let dns_handle = tokio::spawn(dns_server.block_until_done());

    tracing::info!("API listening on {}", &config.api_bind_addr);
    let api_server = dyncrab::api::new(config.clone(), directory, zone_store.clone(), sessions);
    let api_handle = tokio::spawn(api_server);

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
        },
        Ok(dns_res) = dns_handle => {
            if let Err(err) = dns_res {
                return Err(DNSError(err).into())
            }
        }
        Ok(api_res) = api_handle => {
            if let Err(err) = api_res {
                return Err(err.into())
            }
        }
    }
    tracing::info!("goodbye");
    Ok(())
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dyncrab=info,tower_http=info".into()),
        )
        .init();
}

fn config_init(program_name: &str, config_file: Option<String>) -> Result<SharedConfig> {
    match config_file {
        None => Err(anyhow!(
            "usage: {program_name} /path/to/config.json\n       {program_name} hash-secret <secret>"
        )),
        Some(config_file) => {
            let config = Config::try_from_file(&config_file)?;
            tracing::debug!("loaded config from {config_file}");
            Ok(Arc::new(config))
        }
    }
}
