use hopchain_chain::{DefinitionError, ModifierError, SnapshotError};
use hopchain_codec::CodecError;
use thiserror::Error;

use crate::transport::TransportError;

/// Errors that terminate a hop. None of them are retried.
#[derive(Debug, Error)]
pub enum ExecutionError {
  /// The chain definition callback failed.
  #[error(transparent)]
  Definition(#[from] DefinitionError),

  /// The chain definition produced no phases.
  #[error("chain '{chain_id}' defines no phases")]
  EmptyChain { chain_id: String },

  /// A continuation resumed at a position with no phase to run.
  #[error("chain '{chain_id}' has no phase at position {position} ({phases} phases defined)")]
  ChainFinished {
    chain_id: String,
    position: usize,
    phases: usize,
  },

  /// The continuation decoded but its chain definition did not.
  #[error("invalid chain definition in continuation: {0}")]
  InvalidSnapshot(#[source] SnapshotError),

  /// The re-derived chain definition differs from the one that was encoded.
  #[error("chain definition drifted: encoded {expected}, re-derived {actual}")]
  DefinitionDrift { expected: String, actual: String },

  #[error("phase {phase}, function '{function}': unsupported HTTP method: {method}")]
  InvalidMethod {
    phase: usize,
    function: String,
    method: String,
  },

  #[error("phase {phase}, function '{function}': request failed: {message}")]
  RemoteCall {
    phase: usize,
    function: String,
    message: String,
  },

  #[error("phase {phase}, function '{function}': unexpected response status {status}")]
  RemoteStatus {
    phase: usize,
    function: String,
    status: u16,
  },

  #[error("phase {phase}, function '{function}': failed to read response body: {message}")]
  ReadBody {
    phase: usize,
    function: String,
    message: String,
  },

  #[error("phase {phase}: modifier failed: {source}")]
  Modifier {
    phase: usize,
    #[source]
    source: ModifierError,
  },

  #[error("invalid configuration: {message}")]
  Config { message: String },

  #[error("failed to encode continuation: {message}")]
  Encode { message: String },

  #[error("failed to dispatch continuation for phase {next_phase}: {message}")]
  Dispatch { next_phase: usize, message: String },

  /// The HTTP client could not be constructed.
  #[error(transparent)]
  Transport(#[from] TransportError),
}

impl From<CodecError> for ExecutionError {
  fn from(e: CodecError) -> Self {
    ExecutionError::Encode {
      message: e.to_string(),
    }
  }
}
