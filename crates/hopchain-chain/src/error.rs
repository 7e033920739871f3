use std::error::Error as StdError;

use thiserror::Error;

/// Error returned by a local modifier transform.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ModifierError {
  message: String,
  #[source]
  source: Option<Box<dyn StdError + Send + Sync>>,
}

impl ModifierError {
  pub fn new(message: impl std::fmt::Display) -> Self {
    Self {
      message: message.to_string(),
      source: None,
    }
  }

  /// Wrap an underlying error, keeping it as the source.
  pub fn with_source<E>(message: impl std::fmt::Display, source: E) -> Self
  where
    E: StdError + Send + Sync + 'static,
  {
    Self {
      message: message.to_string(),
      source: Some(Box::new(source)),
    }
  }
}

impl From<&str> for ModifierError {
  fn from(message: &str) -> Self {
    Self::new(message)
  }
}

impl From<String> for ModifierError {
  fn from(message: String) -> Self {
    Self {
      message,
      source: None,
    }
  }
}

/// Error returned by a chain definition callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("chain definition failed: {message}")]
pub struct DefinitionError {
  message: String,
}

impl DefinitionError {
  pub fn new(message: impl std::fmt::Display) -> Self {
    Self {
      message: message.to_string(),
    }
  }
}

/// Errors from encoding or decoding a chain snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
  #[error("failed to encode chain snapshot: {0}")]
  Encode(#[source] serde_json::Error),

  #[error("malformed chain snapshot: {0}")]
  Decode(#[source] serde_json::Error),
}
