//! Blocking HTTP client for Azure management and data-plane endpoints.
//!
//! Every request carries `Authorization: Bearer <token>` and an
//! `api-version` query parameter. Failures are decoded from the Azure error
//! envelope (`{"error": {"code": ..., "message": ...}}`) into [`AzopsError`].

use crate::error::{AzopsError, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const USER_AGENT: &str = concat!("azops/", env!("CARGO_PKG_VERSION"));
const TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

pub struct ManagementClient {
    http: Client,
    token: String,
}

impl ManagementClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            token: token.into(),
        })
    }

    pub fn put_json<B, T>(&self, url: &str, api_version: &str, body: &B) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let resp = self.send(self.request(Method::PUT, url, api_version).json(body))?;
        Ok(resp.json()?)
    }

    pub fn delete_json<T: DeserializeOwned>(&self, url: &str, api_version: &str) -> Result<T> {
        let resp = self.send(self.request(Method::DELETE, url, api_version))?;
        Ok(resp.json()?)
    }

    /// DELETE that ignores the response body (200, 202 and 204 are all success).
    pub fn delete(&self, url: &str, api_version: &str) -> Result<()> {
        self.send(self.request(Method::DELETE, url, api_version))?;
        Ok(())
    }

    fn request(&self, method: Method, url: &str, api_version: &str) -> RequestBuilder {
        tracing::debug!(%method, url, api_version, "sending request");
        self.http
            .request(method, url)
            .query(&[("api-version", api_version)])
            .bearer_auth(&self.token)
    }

    fn send(&self, req: RequestBuilder) -> Result<Response> {
        let resp = req.send()?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let text = resp.text().unwrap_or_default();
        Err(error_from_response(status, &text))
    }
}

fn error_from_response(status: StatusCode, body: &str) -> AzopsError {
    let (code, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => (env.error.code, env.error.message),
        Err(_) => (
            status.canonical_reason().unwrap_or("Unknown").to_string(),
            body.trim().to_string(),
        ),
    };
    match status {
        StatusCode::NOT_FOUND => AzopsError::NotFound(message),
        StatusCode::CONFLICT => AzopsError::Conflict(message),
        _ => AzopsError::Api {
            status: status.as_u16(),
            code,
            message,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
