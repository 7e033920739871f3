//! Outbound HTTP seam.
//!
//! The engine sends every remote call and every continuation through a
//! [`Transport`]. [`HttpTransport`] is the reqwest-backed implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use thiserror::Error;

/// A fully built outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
  pub method: Method,
  pub url: String,
  pub headers: Vec<(String, String)>,
  pub body: Vec<u8>,
}

impl OutboundRequest {
  /// Look up a header by name, case-insensitively.
  pub fn header(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(k, _)| k.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }
}

/// Status and body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundResponse {
  pub status: u16,
  pub body: Vec<u8>,
}

impl InboundResponse {
  pub fn ok(body: impl Into<Vec<u8>>) -> Self {
    Self {
      status: 200,
      body: body.into(),
    }
  }

  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

#[derive(Debug, Error)]
pub enum TransportError {
  #[error("failed to build http client: {0}")]
  Client(#[source] reqwest::Error),

  /// The request could not be sent or no response arrived.
  #[error("{0}")]
  Send(String),

  /// A response arrived but its body could not be read.
  #[error("{0}")]
  Body(String),
}

/// Sends outbound requests on behalf of the engine.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn send(&self, request: OutboundRequest) -> Result<InboundResponse, TransportError>;
}

/// [`Transport`] backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
  client: Client,
}

impl HttpTransport {
  pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
      builder = builder.timeout(timeout);
    }
    let client = builder.build().map_err(TransportError::Client)?;
    Ok(Self { client })
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn send(&self, request: OutboundRequest) -> Result<InboundResponse, TransportError> {
    let mut builder = self.client.request(request.method, &request.url);

    for (key, value) in &request.headers {
      builder = builder.header(key, value);
    }

    let response = builder
      .body(request.body)
      .send()
      .await
      .map_err(|e| TransportError::Send(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response
      .bytes()
      .await
      .map_err(|e| TransportError::Body(e.to_string()))?;

    Ok(InboundResponse {
      status,
      body: body.to_vec(),
    })
  }
}
