use crate::config::InsightsConfig;
use crate::error::{InsightsError, Result};
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Put,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Put => "PUT",
            Self::Post => "POST",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// Sends one JSON request and returns the decoded JSON response body.
///
/// Implementations report a failed exchange or a non-success status as a
/// transport error, and an undecodable body as [`InsightsError::Parse`].
pub trait Transport {
    fn send(&self, method: Method, url: &str, body: &Value) -> Result<Value>;
}

/// Blocking reqwest client routed through the configured forward proxy.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: &InsightsConfig) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder();
        builder = if config.proxy_url.is_empty() {
            builder.no_proxy()
        } else {
            builder.proxy(reqwest::Proxy::all(config.proxy_url.as_str())?)
        };
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, method: Method, url: &str, body: &Value) -> Result<Value> {
        tracing::debug!(method = method.as_str(), url, "sending request");

        let response = self
            .client
            .request(method.into(), url)
            .json(body)
            .send()
            .map_err(|e| InsightsError::Transport {
                method: method.as_str().to_string(),
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().map_err(|e| InsightsError::Transport {
            method: method.as_str().to_string(),
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        tracing::trace!(status = status.as_u16(), body = %text, "received response");

        if !status.is_success() {
            return Err(InsightsError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body: text,
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| InsightsError::Parse(format!("{url}: {e}")))
    }
}

/// Prints each request to stderr instead of sending it, answering with a
/// fresh `uuid` so the whole run can be previewed offline.
#[derive(Debug, Default)]
pub struct DryRunTransport;

impl Transport for DryRunTransport {
    fn send(&self, method: Method, url: &str, body: &Value) -> Result<Value> {
        eprintln!("dry-run: {} {}", method.as_str(), url);
        eprintln!("  {body}");

        let fake_uuid = || Uuid::new_v4().braced().to_string();
        Ok(match body {
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|_| json!({ "uuid": fake_uuid() }))
                    .collect(),
            ),
            _ => json!({ "uuid": fake_uuid() }),
        })
    }
}
