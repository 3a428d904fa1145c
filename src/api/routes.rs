use crate::api::api_error::APIError;
use crate::api::auth::{basic_authenticate, check_api_auth, check_session_auth};
use crate::api::model::{client_ip, DetectedIps, RequestContext, Status, UpdateParams};
use crate::api::server::AppState;
use crate::api::update::update;
use crate::directory::normalize_fqdn;
use crate::error::Error;
use crate::ip::{check_ip, IpKind};
use crate::session::Session;
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use std::net::SocketAddr;
use time::OffsetDateTime;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub(super) fn new(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(health_check))
        .route("/nic/update", get(nic_update))
        .route("/nic/update_authorized", get(authorized_nic_update))
        .route("/detectip/:secret", get(detect_ip))
        .route("/ajax_get_ips", get(ajax_get_ips))
        .route("/myip", get(my_ip))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.api_timeout))
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

async fn nic_update(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(pairs): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Status, APIError> {
    let params = UpdateParams::from_pairs(pairs);
    let ctx = RequestContext::new(&state.config, params, &headers, peer);
    let agent = ctx.agent.as_str();

    let credentials = ctx.authorization.as_deref().map(basic_authenticate);
    let (username, password) = match credentials {
        Some(Ok(credentials)) => credentials,
        Some(Err(err)) => {
            tracing::warn!(hostname = ?ctx.hostname, agent, "received unusable auth: {err}");
            return Ok(Status::NoAuth);
        }
        None => {
            tracing::warn!(hostname = ?ctx.hostname, agent, "received no auth");
            return Ok(Status::NoAuth);
        }
    };

    let authenticated = {
        let directory = state.directory.read().await;
        check_api_auth(&*directory, &username, &password).await
    };
    if !authenticated {
        tracing::info!(hostname = ?ctx.hostname, username, agent, "received bad credentials");
        return Ok(Status::BadAuth);
    }

    // The update username is the FQDN, so it stands in for a missing hostname.
    let hostname = ctx.hostname.clone().unwrap_or_else(|| username.clone());
    if normalize_fqdn(&hostname) != normalize_fqdn(&username) {
        tracing::info!(hostname, username, agent, "credentials are for another host");
        return Ok(Status::NoHost);
    }

    let ipaddr = ctx
        .myip
        .clone()
        .unwrap_or_else(|| ctx.client_ip.to_string());

    if state.config.is_bad_agent(agent) {
        tracing::info!(hostname, agent, "received update from bad user agent");
        return Ok(Status::BadAgent);
    }

    Ok(update(&state, &hostname, &ipaddr, agent).await?)
}

async fn authorized_nic_update(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Query(pairs): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<Status, APIError> {
    let user = session(&state, &jar)
        .await
        .and_then(|s| s.user)
        .ok_or(Error::LoginRequired)?;
    let params = UpdateParams::from_pairs(pairs);
    let ctx = RequestContext::new(&state.config, params, &headers, peer);

    let Some(hostname) = ctx.hostname.as_deref() else {
        return Ok(Status::NoHost);
    };

    let owned = {
        let directory = state.directory.read().await;
        check_session_auth(&*directory, &user, hostname).await
    };
    if !owned {
        tracing::info!(hostname, user, "host is not owned by user");
        return Ok(Status::NoHost);
    }

    let ipaddr = match ctx.myip.as_deref() {
        Some(ip) if !ip.is_empty() => ip.to_string(),
        _ => ctx.client_ip.to_string(),
    };
    Ok(update(&state, hostname, &ipaddr, &ctx.agent).await?)
}

/// Record the connecting address into the session addressed by `secret`. The requester's own
/// cookies are not consulted.
async fn detect_ip(
    State(state): State<AppState>,
    Path(secret): Path<String>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<StatusCode, APIError> {
    let client_ip = client_ip(&state.config, &headers, peer);
    let ipaddr = client_ip.to_string();
    let kind = check_ip(&ipaddr, &[IpKind::from(&client_ip)])?;

    let mut sessions = state.sessions.write().await;
    match sessions.load(&secret).await {
        Some(mut session) => {
            session.set_detected(kind, &ipaddr, OffsetDateTime::now_utc());
            sessions.save(&secret, session).await;
            tracing::debug!(%kind, ip = %ipaddr, "detected address");
        }
        None => tracing::debug!(%kind, ip = %ipaddr, "ignoring detection for unknown session"),
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn ajax_get_ips(State(state): State<AppState>, jar: CookieJar) -> Json<DetectedIps> {
    let session = session(&state, &jar).await.unwrap_or_default();
    let ips = DetectedIps {
        ipv4: session.ipv4,
        ipv6: session.ipv6,
    };
    tracing::debug!(?ips, "ajax_get_ips response");
    Json(ips)
}

#[allow(clippy::unused_async)]
async fn my_ip(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> String {
    client_ip(&state.config, &headers, peer).to_string()
}

/// The requester's cookie-bound session (if any).
async fn session(state: &AppState, jar: &CookieJar) -> Option<Session> {
    let key = jar.get(&state.config.session_cookie_name)?.value().to_string();
    state.sessions.read().await.load(&key).await
}
