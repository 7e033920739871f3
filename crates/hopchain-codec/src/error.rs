use thiserror::Error;

/// Errors from building a continuation envelope.
#[derive(Debug, Error)]
pub enum CodecError {
  #[error("failed to encode continuation: {0}")]
  Encode(#[source] serde_json::Error),
}

/// The inbound bytes are not a continuation produced by [`crate::encode`].
///
/// This is the normal outcome on the first hop of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a continuation: {reason}")]
pub struct NotAContinuation {
  pub reason: String,
}

impl NotAContinuation {
  pub(crate) fn new(reason: impl std::fmt::Display) -> Self {
    Self {
      reason: reason.to_string(),
    }
  }
}
