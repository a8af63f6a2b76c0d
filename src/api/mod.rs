//! HTTP access to the budget API.
//!
//! `ApiClient` owns the reqwest client, the base URL and the session handle.
//! Authenticated requests read the token from the session at send time, so a
//! login that happens between two calls is picked up by the second one.

pub mod resource;

use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{Credentials, Form, LoginResponse, Registration};
use crate::session::Session;

pub use resource::{Created, Resource, ResourceApi, ResourceModel, Updatable, UpdatableApi};

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    session: Session,
}

impl ApiClient {
    pub fn new(api: &ApiConfig, session: Session) -> ClientResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(api.user_agent.clone());
        if let Some(timeout) = api.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base: parse_base(&api.base_url)?,
            session,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> ClientResult<Self> {
        self.base = parse_base(base_url)?;
        Ok(self)
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Typed accessor for one collection
    pub fn resource<T: ResourceModel>(&self) -> Resource<T> {
        Resource::new(self.clone())
    }

    pub fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    /// POST /login; stores the issued token on success
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<()> {
        let payload = credentials.validate()?;
        let response = self
            .send(Method::POST, "login", Some(&payload), None)
            .await
            .map_err(rejected_credentials)?;
        let body: LoginResponse = decode_json(response).await?;

        self.session.set_token(body.access_token)?;
        tracing::info!(username = %payload.username, "logged in");
        Ok(())
    }

    /// POST /register; adopts a token if the server hands one out
    pub async fn register(&self, credentials: &Credentials) -> ClientResult<Registration> {
        let payload = credentials.validate()?;
        let response = self
            .send(Method::POST, "register", Some(&payload), None)
            .await
            .map_err(rejected_credentials)?;
        let body = read_optional_json(response).await?;

        match body
            .as_ref()
            .and_then(|b| b.get("access_token"))
            .and_then(Value::as_str)
        {
            Some(token) => {
                self.session.set_token(token)?;
                tracing::info!(username = %payload.username, "registered and signed in");
                Ok(Registration::SignedIn)
            }
            None => {
                tracing::info!(username = %payload.username, "registered");
                Ok(Registration::Registered)
            }
        }
    }

    /// Local logout; the API keeps no server-side session to revoke
    pub fn logout(&self) -> ClientResult<()> {
        self.session.clear_token()
    }

    /// GET / and return the API banner message
    pub async fn ping(&self) -> ClientResult<String> {
        let response = self.send(Method::GET, "", None::<&Value>, None).await?;
        let body = read_optional_json(response).await?;
        Ok(body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("ok")
            .to_string())
    }

    /// Send a request carrying the current bearer token
    pub(crate) async fn send_authed<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<Response> {
        let token = self.session.token().ok_or_else(ClientError::not_authenticated)?;
        self.send(method, path, body, Some(&token)).await
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> ClientResult<Response> {
        let url = self.endpoint(path)?;
        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::debug!(%method, %url, "request failed: {}", e);
            ClientError::Network(e.to_string())
        })?;

        let status = response.status();
        tracing::debug!(%method, %url, status = status.as_u16(), "response");

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        Err(ClientError::from_status(status.as_u16(), &text))
    }
}

// A 401 from /login means bad credentials, not an expired session
fn rejected_credentials(err: ClientError) -> ClientError {
    match err {
        ClientError::Auth(message) => ClientError::Validation { status: 401, message },
        other => other,
    }
}

fn parse_base(base_url: &str) -> ClientResult<Url> {
    // A trailing slash makes `join` append instead of replacing the last segment
    let mut normalized = base_url.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Ok(Url::parse(&normalized)?)
}

pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ClientError::decode(format!("{} in {:?}", e, text)))
}

/// Bodies of 201/204 acknowledgements may be empty or plain text
pub(crate) async fn read_optional_json(response: Response) -> ClientResult<Option<Value>> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(serde_json::from_str(&text).ok())
}
