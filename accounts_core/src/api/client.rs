use super::envelope::Envelope;
use super::error::{self, Error};
use super::{account, login, register};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

/// Client for the accounts API
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Client {
    /// The server to connect to. Should only be the protocol and domain, e.g.
    /// `https://accounts.your-domain.com`.
    pub server: String,

    /// Auth. Set this by logging in.
    pub auth: Option<String>,
}

impl Client {
    /// Construct a new client
    pub fn new(server: String) -> Self {
        Self { server, auth: None }
    }

    /// Register a new account.
    ///
    /// ## Errors
    ///
    /// Errors are the same as `handle_response`.
    pub async fn register(
        &self,
        client: &reqwest::Client,
        req: &register::Req,
    ) -> error::Result<register::Resp> {
        let url = self.url(register::PATH)?;

        Self::handle_response(client.post(url).json(req)).await
    }

    /// Log into the server, keeping the token for later authenticated calls.
    ///
    /// ## Errors
    ///
    /// Errors are the same as `handle_response`.
    pub async fn login(
        &mut self,
        client: &reqwest::Client,
        req: &login::Req,
    ) -> error::Result<login::Resp> {
        let url = self.url(login::PATH)?;

        let resp: login::Resp = Self::handle_response(client.post(url).json(req)).await?;
        self.auth = Some(resp.jwt.clone());

        Ok(resp)
    }

    /// Fetch the account you're logged in as.
    ///
    /// ## Errors
    ///
    /// `Error::Unauthenticated` if you haven't logged in, otherwise the same
    /// as `handle_response`.
    pub async fn account(&self, client: &reqwest::Client) -> error::Result<account::Account> {
        let url = self.url(register::PATH)?;

        match &self.auth {
            Some(jwt) => Self::handle_response(client.get(url).bearer_auth(jwt)).await,
            None => Err(Error::Unauthenticated),
        }
    }

    fn url(&self, path: &str) -> error::Result<Url> {
        Ok(Url::parse(&self.server)?.join(path)?)
    }

    /// Convert an HTTP response into a result, interpreting the envelope in a
    /// standard way.
    ///
    /// ## Errors
    ///
    /// - `Ok(..)` with the envelope's `data` if the server returned a success (2xx)
    /// - `Error::Client` if the server returned a client error (4xx)
    /// - `Error::Server` if the server returned a server error (5xx)
    /// - `Error::Unexpected` if the server returned something else (the server is
    ///   not supposed to issue redirects or informational responses.)
    async fn handle_response<T>(resp: reqwest::RequestBuilder) -> error::Result<T>
    where
        T: DeserializeOwned,
    {
        let resp = resp.send().await?;

        let status = resp.status();
        let envelope: Envelope = resp.json().await?;

        if status.is_success() {
            Ok(serde_json::from_value(envelope.data)?)
        } else if status.is_client_error() {
            Err(Error::Client {
                status: envelope.status,
                message: envelope.message,
                data: envelope.data,
            })
        } else if status.is_server_error() {
            Err(Error::Server(envelope.message))
        } else {
            Err(Error::Unexpected(status.as_u16()))
        }
    }
}
