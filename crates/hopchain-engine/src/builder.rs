//! Chain construction for the current hop.

use hopchain_chain::{Chain, ChainSnapshot};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::ExecutionError;
use crate::events::{HopEvent, HopNotifier};

/// The chain shell and payload for one hop, before the definition runs.
#[derive(Debug)]
pub struct Hop {
  pub chain: Chain,
  pub data: Vec<u8>,
  /// Fingerprint recorded by the previous hop, if any.
  pub expected_fingerprint: Option<String>,
  /// True when the chain was decoded from a continuation.
  pub resumed: bool,
}

/// Decode the inbound request into a resumed chain, or start a new one.
///
/// A request that is not a continuation starts a new chain with the raw bytes
/// as payload. A continuation whose chain definition cannot be read is an
/// error.
pub fn build_chain<N: HopNotifier>(
  config: &EngineConfig,
  raw: Vec<u8>,
  notifier: &N,
) -> Result<Hop, ExecutionError> {
  let continuation = match hopchain_codec::decode(&raw) {
    Ok(continuation) => continuation,
    Err(reason) => {
      debug!(reason = %reason, "request is not a continuation");
      let chain_id = Uuid::new_v4().to_string();
      info!(chain_id = %chain_id, "chain created");
      notifier.notify(HopEvent::ChainCreated {
        chain_id: chain_id.clone(),
      });

      let mut chain = Chain::new(chain_id);
      chain.set_callback_url(config.callback_url.clone());
      return Ok(Hop {
        chain,
        data: raw,
        expected_fingerprint: None,
        resumed: false,
      });
    }
  };

  let snapshot = ChainSnapshot::decode(&continuation.chain_definition).map_err(|e| {
    error!(chain_id = %continuation.id, error = %e, "failed to parse chain definition");
    ExecutionError::InvalidSnapshot(e)
  })?;

  info!(
    chain_id = %continuation.id,
    position = snapshot.position,
    "chain resumed"
  );
  notifier.notify(HopEvent::ChainResumed {
    chain_id: continuation.id.clone(),
    position: snapshot.position,
  });

  let mut chain = Chain::new(continuation.id);
  chain.set_position(snapshot.position);
  chain.set_callback_url(snapshot.callback_url);

  Ok(Hop {
    chain,
    data: continuation.data,
    expected_fingerprint: snapshot.fingerprint,
    resumed: true,
  })
}

/// Check the re-derived definition against the fingerprint from the wire.
pub fn verify_definition(chain: &Chain, expected: Option<&str>) -> Result<(), ExecutionError> {
  let Some(expected) = expected else {
    return Ok(());
  };

  let actual = chain.fingerprint().map_err(ExecutionError::InvalidSnapshot)?;
  if actual != expected {
    return Err(ExecutionError::DefinitionDrift {
      expected: expected.to_string(),
      actual,
    });
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::events::NoopNotifier;

  fn two_phase_chain(id: &str) -> Chain {
    let mut chain = Chain::new(id);
    chain.apply("a").then().apply("b");
    chain
  }

  #[test]
  fn test_plain_request_creates_chain() {
    let config = EngineConfig {
      callback_url: Some("http://cb/done".to_string()),
      ..EngineConfig::new("fn")
    };

    let hop = build_chain(&config, b"hello".to_vec(), &NoopNotifier).unwrap();

    assert!(!hop.chain.id().is_empty());
    assert_eq!(hop.chain.position(), 0);
    assert_eq!(hop.chain.callback_url(), Some("http://cb/done"));
    assert_eq!(hop.data, b"hello");
    assert!(!hop.resumed);
  }

  #[test]
  fn test_new_chains_get_distinct_ids() {
    let config = EngineConfig::new("fn");
    let a = build_chain(&config, vec![], &NoopNotifier).unwrap();
    let b = build_chain(&config, vec![], &NoopNotifier).unwrap();
    assert_ne!(a.chain.id(), b.chain.id());
  }

  #[test]
  fn test_continuation_resumes_chain() {
    let mut previous = two_phase_chain("chain-7");
    previous.set_callback_url(Some("http://cb/wire".to_string()));
    previous.advance();
    let wire =
      hopchain_codec::encode(previous.id(), &previous.encode().unwrap(), b"partial").unwrap();

    // The configured callback is ignored on resumed hops.
    let config = EngineConfig {
      callback_url: Some("http://cb/config".to_string()),
      ..EngineConfig::new("fn")
    };
    let hop = build_chain(&config, wire, &NoopNotifier).unwrap();

    assert_eq!(hop.chain.id(), "chain-7");
    assert_eq!(hop.chain.position(), 1);
    assert_eq!(hop.chain.callback_url(), Some("http://cb/wire"));
    assert_eq!(hop.data, b"partial");
    assert_eq!(
      hop.expected_fingerprint,
      Some(previous.fingerprint().unwrap())
    );
    assert!(hop.resumed);
  }

  #[test]
  fn test_broken_chain_definition_is_an_error() {
    let wire = hopchain_codec::encode("chain-7", "{not json", b"x").unwrap();
    let err = build_chain(&EngineConfig::new("fn"), wire, &NoopNotifier).unwrap_err();
    assert!(matches!(err, ExecutionError::InvalidSnapshot(_)));
  }

  #[test]
  fn test_verify_definition() {
    let chain = two_phase_chain("c");
    let fingerprint = chain.fingerprint().unwrap();

    assert!(verify_definition(&chain, None).is_ok());
    assert!(verify_definition(&chain, Some(&fingerprint)).is_ok());

    let err = verify_definition(&chain, Some("deadbeef")).unwrap_err();
    assert!(matches!(err, ExecutionError::DefinitionDrift { .. }));
  }
}
