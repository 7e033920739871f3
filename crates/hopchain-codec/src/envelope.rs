use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, NotAContinuation};

/// Envelope version written by this codec.
pub const ENVELOPE_VERSION: u32 = 1;

/// On-the-wire shape of a continuation request body.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
  version: u32,
  id: String,
  chain: String,
  /// Base64 of the payload bytes.
  #[serde(default)]
  data: String,
}

/// A decoded continuation: everything the next hop needs to resume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
  /// Correlation id of the chain.
  pub id: String,
  /// Encoded chain definition snapshot.
  pub chain_definition: String,
  /// Payload accumulated by the previous phases.
  pub data: Vec<u8>,
}

/// Build the request body for the next hop.
pub fn encode(id: &str, chain_definition: &str, data: &[u8]) -> Result<Vec<u8>, CodecError> {
  let envelope = Envelope {
    version: ENVELOPE_VERSION,
    id: id.to_string(),
    chain: chain_definition.to_string(),
    data: STANDARD.encode(data),
  };
  serde_json::to_vec(&envelope).map_err(CodecError::Encode)
}

/// Try to read an inbound request as a continuation.
///
/// Any failure means the request is the first hop of a new chain.
pub fn decode(raw: &[u8]) -> Result<Continuation, NotAContinuation> {
  let envelope: Envelope = serde_json::from_slice(raw).map_err(NotAContinuation::new)?;

  if envelope.version != ENVELOPE_VERSION {
    return Err(NotAContinuation::new(format!(
      "unsupported envelope version {}",
      envelope.version
    )));
  }
  if envelope.id.is_empty() {
    return Err(NotAContinuation::new("missing correlation id"));
  }
  if envelope.chain.is_empty() {
    return Err(NotAContinuation::new("missing chain definition"));
  }

  let data = STANDARD
    .decode(envelope.data.as_bytes())
    .map_err(NotAContinuation::new)?;

  Ok(Continuation {
    id: envelope.id,
    chain_definition: envelope.chain,
    data,
  })
}
