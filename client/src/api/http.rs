//! HTTP implementation of [`SupportApi`] over reqwest.
//!
//! Every method follows the same shape: build the request, attach the
//! bearer token if one is set, send, then map the outcome:
//!
//! - transport failure → [`ClientError::Network`] (via `From`)
//! - non-2xx → [`ClientError::Server`] with the body's `message` field
//!   when present, the raw body otherwise
//! - 2xx → decode the expected body

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use tracing::debug;

use crate::api::{Credentials, LoginResponse, NewTicket, RespondRequest, SharedToken, SupportApi};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::session::state::AuthToken;
use crate::tickets::model::{Status, Ticket, TicketId};

/// Support-ticket backend client.
///
/// Cheap to clone: the underlying `reqwest::Client` is an `Arc` internally
/// and the token cell is shared.
#[derive(Debug, Clone)]
pub struct HttpSupportApi {
    http: reqwest::Client,
    base_url: String,
    token: SharedToken,
}

impl HttpSupportApi {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Network`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: &ClientConfig, token: SharedToken) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the current bearer token, if any.
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.bearer() {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        }
    }

    /// Map a non-2xx response to [`ClientError::Server`], preferring the
    /// body's `message` field over the raw body.
    async fn server_error(response: Response) -> ClientError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(serde_json::Value::as_str).map(String::from))
            .unwrap_or_else(|| {
                if body.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                } else {
                    body
                }
            });

        ClientError::Server {
            status: status.as_u16(),
            message,
        }
    }

    /// Send a request and decode a JSON body on success.
    async fn expect_json<T: serde::de::DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }
        Ok(response.json().await?)
    }

    /// Send a request, discarding any success body.
    async fn expect_ok(request: RequestBuilder) -> Result<()> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }
        Ok(())
    }
}

#[async_trait]
impl SupportApi for HttpSupportApi {
    async fn login(&self, credentials: &Credentials) -> Result<AuthToken> {
        debug!(username = %credentials.username, "Logging in");
        let request = self.http.post(self.url("/auth/login")).json(credentials);
        let response: LoginResponse = Self::expect_json(request).await?;

        // A success body without a usable token is a server contract
        // violation, not a transport failure.
        if response.token.is_empty() {
            return Err(ClientError::Server {
                status: StatusCode::OK.as_u16(),
                message: "login response carried no token".to_string(),
            });
        }

        Ok(AuthToken::new(response.token))
    }

    async fn register(&self, credentials: &Credentials) -> Result<()> {
        debug!(username = %credentials.username, "Registering");
        let request = self.http.post(self.url("/auth/register")).json(credentials);
        Self::expect_ok(request).await
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket> {
        debug!(title = %ticket.title, category = %ticket.category, "Creating ticket");
        let request = self.authorized(self.http.post(self.url("/tickets")).json(ticket));
        Self::expect_json(request).await
    }

    async fn list_own_tickets(&self) -> Result<Vec<Ticket>> {
        let request = self.authorized(self.http.get(self.url("/tickets")));
        Self::expect_json(request).await
    }

    async fn list_admin_tickets(&self, filter: Option<Status>) -> Result<Vec<Ticket>> {
        let mut request = self.http.get(self.url("/tickets/admin"));
        // The query parameter is omitted entirely when unfiltered; the
        // backend treats an empty value as an (unmatched) exact filter.
        if let Some(status) = filter {
            request = request.query(&[("status", status.as_str())]);
        }
        Self::expect_json(self.authorized(request)).await
    }

    async fn respond_to_ticket(&self, id: TicketId, request: &RespondRequest) -> Result<Ticket> {
        debug!(ticket_id = %id, "Responding to ticket");
        let request = self.authorized(
            self.http
                .post(self.url(&format!("/tickets/admin/{id}/respond")))
                .json(request),
        );
        Self::expect_json(request).await
    }

    async fn set_ticket_status(&self, id: TicketId, status: Status) -> Result<Ticket> {
        debug!(ticket_id = %id, status = %status, "Setting ticket status");
        let request = self.authorized(
            self.http
                .post(self.url(&format!("/tickets/admin/{id}/status")))
                .json(&status),
        );
        Self::expect_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let config = ClientConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..ClientConfig::default()
        };
        let api = HttpSupportApi::new(&config, SharedToken::new());
        let api = api.ok().map(|a| a.url("/tickets"));
        assert_eq!(api.as_deref(), Some("http://localhost:8080/tickets"));
    }
}
