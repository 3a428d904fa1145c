use crate::api::model::Status;
use crate::error::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Failure of an API handler. Rendered as a bare dyndns2 token so clients never see error
/// details.
pub(crate) struct APIError(anyhow::Error);

impl APIError {
    fn status(&self) -> Option<Status> {
        match self.0.downcast_ref::<Error>() {
            Some(Error::NoHost(_)) => Some(Status::NoHost),
            Some(Error::InvalidIp(_)) => Some(Status::BadIp),
            Some(Error::LoginRequired) => None,
            Some(
                Error::NotInZone(_)
                | Error::InvalidName(_)
                | Error::DNSError(_)
                | Error::IO(_)
                | Error::InvalidJSON(_),
            ) => Some(Status::DnsErr),
            _ => Some(Status::ServerError),
        }
    }
}

impl IntoResponse for APIError {
    fn into_response(self) -> Response {
        match self.status() {
            None => (StatusCode::FORBIDDEN, format!("{}", self.0)).into_response(),
            Some(status @ (Status::DnsErr | Status::ServerError)) => {
                tracing::error!("API error: {:#}", self.0);
                status.into_response()
            }
            Some(status) => status.into_response(),
        }
    }
}

impl<E> From<E> for APIError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
