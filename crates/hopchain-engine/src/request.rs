//! Construction of upstream function calls and continuation requests.

use std::collections::BTreeMap;

use hopchain_chain::RemoteCall;
use reqwest::Method;

use crate::config::EngineConfig;
use crate::transport::OutboundRequest;

pub const CALLBACK_HEADER: &str = "X-Callback-Url";

/// Serialize params as `?k1-v1&k1-v2&k2-v3`.
///
/// Keys are emitted in sorted order and each value forms its own pair. No
/// escaping is applied beyond the joining rule.
pub fn query_string(params: &BTreeMap<String, Vec<String>>) -> String {
  let pairs: Vec<String> = params
    .iter()
    .flat_map(|(key, values)| values.iter().map(move |value| format!("{}-{}", key, value)))
    .collect();

  if pairs.is_empty() {
    String::new()
  } else {
    format!("?{}", pairs.join("&"))
  }
}

/// URL of a remote function service.
pub fn function_url(call: &RemoteCall, port: u16) -> String {
  format!(
    "http://{}:{}/{}",
    call.name(),
    port,
    query_string(call.params())
  )
}

/// Pick the method for a remote call: the `method` header, then the
/// configured default, then POST.
pub fn resolve_method(call: &RemoteCall, config: &EngineConfig) -> Result<Method, String> {
  let method = call
    .header("method")
    .or(config.default_method.as_deref())
    .filter(|m| !m.is_empty())
    .unwrap_or("POST");
  parse_method(method)
}

fn parse_method(method: &str) -> Result<Method, String> {
  match method.to_uppercase().as_str() {
    "GET" => Ok(Method::GET),
    "POST" => Ok(Method::POST),
    "PUT" => Ok(Method::PUT),
    "DELETE" => Ok(Method::DELETE),
    "PATCH" => Ok(Method::PATCH),
    "HEAD" => Ok(Method::HEAD),
    "OPTIONS" => Ok(Method::OPTIONS),
    _ => Err(method.to_string()),
  }
}

/// Build the request for a remote function with `body` as input.
pub fn upstream_request(
  call: &RemoteCall,
  config: &EngineConfig,
  body: Vec<u8>,
) -> Result<OutboundRequest, String> {
  let method = resolve_method(call, config)?;
  let headers = call
    .headers()
    .iter()
    .map(|(k, v)| (k.clone(), v.clone()))
    .collect();

  Ok(OutboundRequest {
    method,
    url: function_url(call, config.function_port),
    headers,
    body,
  })
}

/// Build the asynchronous re-entry request carrying an encoded continuation.
pub fn continuation_request(
  async_url: String,
  envelope: Vec<u8>,
  callback_url: Option<&str>,
) -> OutboundRequest {
  let mut headers = vec![
    ("Accept".to_string(), "application/json".to_string()),
    ("Content-Type".to_string(), "application/json".to_string()),
  ];
  if let Some(url) = callback_url {
    headers.push((CALLBACK_HEADER.to_string(), url.to_string()));
  }

  OutboundRequest {
    method: Method::POST,
    url: async_url,
    headers,
    body: envelope,
  }
}
