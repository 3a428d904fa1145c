//! Update client authentication.
//!
//! dyndns2 clients authenticate with HTTP Basic credentials where the username is the FQDN
//! being updated and the password is its update secret. Logged in operators are instead
//! authorized by owning the host.

use crate::directory::{unique_host, HostDirectory};
use crate::secret::verify_secret;
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::{DecodeError, Engine};
use std::string::FromUtf8Error;

/// Realm sent with every Basic challenge.
pub(super) const REALM: &str = "authenticate to update DNS";

#[derive(thiserror::Error, Debug)]
pub enum BasicAuthError {
    #[error("missing authorization scheme")]
    MissingScheme,
    #[error("unsupported authorization scheme: {0}")]
    UnsupportedScheme(String),
    #[error("invalid encoding: {0}")]
    InvalidEncoding(#[from] DecodeError),
    #[error("credentials are not UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),
    #[error("credentials have no username/password separator")]
    MissingSeparator,
}

/// Extract the username and password from a `Basic` `Authorization` header value.
pub(super) fn basic_authenticate(auth: &str) -> Result<(String, String), BasicAuthError> {
    let (scheme, payload) = auth
        .trim()
        .split_once(' ')
        .ok_or(BasicAuthError::MissingScheme)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(BasicAuthError::UnsupportedScheme(scheme.to_string()));
    }
    let decoded = String::from_utf8(STANDARD.decode(payload.trim())?)?;
    let (username, password) = decoded
        .split_once(':')
        .ok_or(BasicAuthError::MissingSeparator)?;
    Ok((username.to_string(), password.to_string()))
}

/// A `401` response asking for Basic credentials for `realm`, with a plain text body.
pub(super) fn basic_challenge(realm: &str, content: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(WWW_AUTHENTICATE, format!("Basic realm=\"{realm}\""))],
        content.to_string(),
    )
        .into_response()
}

/// Whether `password` is the update secret of the single host named `username`.
pub(super) async fn check_api_auth(
    directory: &(dyn HostDirectory + Send + Sync),
    username: &str,
    password: &str,
) -> bool {
    match unique_host(directory, username, None).await {
        Some(host) => verify_secret(password, &host.update_secret),
        None => false,
    }
}

/// Whether exactly one host named `hostname` is owned by `user`.
pub(super) async fn check_session_auth(
    directory: &(dyn HostDirectory + Send + Sync),
    user: &str,
    hostname: &str,
) -> bool {
    unique_host(directory, hostname, Some(user)).await.is_some()
}
