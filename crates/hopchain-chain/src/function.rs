use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ModifierError;

/// Signature of an in-process data transform.
pub type Transform = dyn Fn(&[u8]) -> Result<Vec<u8>, ModifierError> + Send + Sync;

/// A local byte transform applied in place of a remote call.
#[derive(Clone)]
pub struct Modifier(Arc<Transform>);

impl Modifier {
  pub fn new<F>(transform: F) -> Self
  where
    F: Fn(&[u8]) -> Result<Vec<u8>, ModifierError> + Send + Sync + 'static,
  {
    Self(Arc::new(transform))
  }

  /// Run the transform against `data`.
  pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>, ModifierError> {
    (self.0)(data)
  }
}

impl fmt::Debug for Modifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Modifier(..)")
  }
}

/// A named remote function together with the headers and query parameters
/// sent along with each call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteCall {
  name: String,
  headers: BTreeMap<String, String>,
  params: BTreeMap<String, Vec<String>>,
}

impl RemoteCall {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      headers: BTreeMap::new(),
      params: BTreeMap::new(),
    }
  }

  /// Set a header. Keys are stored lower-cased.
  pub fn add_header(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
    self.headers.insert(key.to_lowercase(), value.into());
    self
  }

  /// Append a query parameter value. Repeated keys keep every value in
  /// insertion order.
  pub fn add_param(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
    self.params.entry(key.into()).or_default().push(value.into());
    self
  }

  /// Builder form of [`RemoteCall::add_header`].
  pub fn with_header(mut self, key: &str, value: impl Into<String>) -> Self {
    self.add_header(key, value);
    self
  }

  /// Builder form of [`RemoteCall::add_param`].
  pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.add_param(key, value);
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn headers(&self) -> &BTreeMap<String, String> {
    &self.headers
  }

  pub fn params(&self) -> &BTreeMap<String, Vec<String>> {
    &self.params
  }

  /// Look up a header by name, case-insensitively.
  pub fn header(&self, key: &str) -> Option<&str> {
    self.headers.get(&key.to_lowercase()).map(String::as_str)
  }
}

/// One step of a phase.
#[derive(Debug, Clone)]
pub enum Function {
  /// Call a remote function over HTTP.
  RemoteCall(RemoteCall),
  /// Transform the data in-process.
  LocalModifier(Modifier),
}

impl Function {
  pub fn remote(name: impl Into<String>) -> Self {
    Function::RemoteCall(RemoteCall::new(name))
  }

  pub fn modifier<F>(transform: F) -> Self
  where
    F: Fn(&[u8]) -> Result<Vec<u8>, ModifierError> + Send + Sync + 'static,
  {
    Function::LocalModifier(Modifier::new(transform))
  }

  /// Name used in logs and error messages. Modifiers have none.
  pub fn name(&self) -> Option<&str> {
    match self {
      Function::RemoteCall(call) => Some(call.name()),
      Function::LocalModifier(_) => None,
    }
  }
}

impl From<RemoteCall> for Function {
  fn from(call: RemoteCall) -> Self {
    Function::RemoteCall(call)
  }
}

impl From<Modifier> for Function {
  fn from(modifier: Modifier) -> Self {
    Function::LocalModifier(modifier)
  }
}

impl From<&str> for Function {
  fn from(name: &str) -> Self {
    Function::remote(name)
  }
}
