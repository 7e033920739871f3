//! Engine configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_GATEWAY: &str = "gateway:8080";
pub const DEFAULT_FUNCTION_PORT: u16 = 8080;

/// Configuration threaded into the engine for a single invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// Gateway address, with or without scheme.
  pub gateway: String,
  /// Name of this function on the gateway; continuations re-enter here.
  pub function_name: String,
  /// Method used for remote calls without a `method` header.
  pub default_method: Option<String>,
  /// Chain-wide callback URL, delivered with the final hop.
  pub callback_url: Option<String>,
  /// Port upstream functions listen on.
  pub function_port: u16,
  /// Client-side timeout for every outbound request.
  pub request_timeout_ms: Option<u64>,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      gateway: DEFAULT_GATEWAY.to_string(),
      function_name: String::new(),
      default_method: None,
      callback_url: None,
      function_port: DEFAULT_FUNCTION_PORT,
      request_timeout_ms: None,
    }
  }
}

impl EngineConfig {
  pub fn new(function_name: impl Into<String>) -> Self {
    Self {
      function_name: function_name.into(),
      ..Self::default()
    }
  }

  /// Base URL of the gateway.
  pub fn gateway_url(&self) -> String {
    let gateway = self.gateway.trim_end_matches('/');
    if gateway.starts_with("http://") || gateway.starts_with("https://") {
      gateway.to_string()
    } else {
      format!("http://{}", gateway)
    }
  }

  /// Asynchronous invocation URL of this function, `None` when the function
  /// name is not configured.
  pub fn async_url(&self) -> Option<String> {
    if self.function_name.is_empty() {
      return None;
    }
    Some(format!(
      "{}/async-function/{}",
      self.gateway_url(),
      self.function_name
    ))
  }
}
