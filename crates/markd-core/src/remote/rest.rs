//! HTTP storage client
//!
//! Talks to the bookmark row API: `POST /bookmarks` creates a row and
//! returns it, `DELETE /bookmarks?id=eq.X&owner=eq.Y` removes one, and
//! `GET /bookmarks?owner=eq.Y&order=created_at.desc` lists an owner's
//! rows. Authentication is a bearer api key when configured.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use super::{RemoteError, RemoteStore};
use crate::models::Bookmark;

/// Request timeout in seconds
const REQUEST_TIMEOUT: u64 = 10;

/// Longest error-body excerpt carried into a `RemoteError`
const ERROR_BODY_LIMIT: usize = 200;

/// Row payload for creates; the service issues id and created_at
#[derive(Debug, Serialize)]
struct NewRow<'a> {
    owner: &'a str,
    url: &'a str,
    title: &'a str,
}

/// HTTP client for the bookmark storage service
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestStore {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT))
            .build()
            .map_err(|err| RemoteError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    /// Authenticate requests with a bearer api key
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    fn rows_url(&self) -> String {
        format!("{}/bookmarks", self.base_url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

impl RemoteStore for RestStore {
    async fn create(&self, owner: &str, url: &str, title: &str) -> Result<Bookmark, RemoteError> {
        debug!(%url, "creating bookmark row");
        let request = self
            .authorize(self.client.post(self.rows_url()))
            .json(&NewRow { owner, url, title });

        let response = request.send().await.map_err(transport)?;
        let response = check_status(response).await?;

        response
            .json::<Bookmark>()
            .await
            .map_err(|err| RemoteError::Decode(err.to_string()))
    }

    async fn delete(&self, owner: &str, id: &str) -> Result<(), RemoteError> {
        debug!(%id, "deleting bookmark row");
        let request = self
            .authorize(self.client.delete(self.rows_url()))
            .query(&[
                ("id", format!("eq.{}", id)),
                ("owner", format!("eq.{}", owner)),
            ]);

        let response = request.send().await.map_err(transport)?;
        check_status(response).await?;
        Ok(())
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Bookmark>, RemoteError> {
        let request = self.authorize(self.client.get(self.rows_url())).query(&[
            ("owner", format!("eq.{}", owner)),
            ("order", "created_at.desc".to_string()),
        ]);

        let response = request.send().await.map_err(transport)?;
        let response = check_status(response).await?;

        response
            .json::<Vec<Bookmark>>()
            .await
            .map_err(|err| RemoteError::Decode(err.to_string()))
    }
}

fn transport(err: reqwest::Error) -> RemoteError {
    RemoteError::Transport(err.to_string())
}

/// Turn a failure status into a `Service` error carrying a body excerpt
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut message = response.text().await.unwrap_or_default();
    if message.len() > ERROR_BODY_LIMIT {
        message.truncate(ERROR_BODY_LIMIT);
    }

    Err(RemoteError::Service {
        status: status.as_u16(),
        message,
    })
}
