//! Hopchain Codec
//!
//! Continuation envelopes exchanged between hops. An envelope is a versioned
//! JSON document holding the correlation id, the encoded chain definition and
//! the base64 payload:
//!
//! ```text
//! {"version": 1, "id": "...", "chain": "<chain snapshot>", "data": "<base64>"}
//! ```
//!
//! The schema is private to hopchain; only `decode(encode(..))` is a contract.

mod envelope;
mod error;

pub use envelope::{Continuation, ENVELOPE_VERSION, decode, encode};
pub use error::{CodecError, NotAContinuation};
