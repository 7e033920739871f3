//! Continuation dispatch.
//!
//! After a phase completes the hop either returns the result to its caller
//! or hands the chain to the gateway for the next hop and returns nothing.
//! Dispatch does not wait for the next hop to run.

use hopchain_chain::Chain;
use tracing::{error, info, instrument};

use crate::config::EngineConfig;
use crate::error::ExecutionError;
use crate::events::{HopEvent, HopNotifier};
use crate::request::continuation_request;
use crate::transport::Transport;

/// What a hop returns to its immediate caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HopOutcome {
  /// The chain finished in this hop; the payload is the final result.
  Completed(Vec<u8>),
  /// A continuation for the phase at `position` was dispatched.
  Dispatched { position: usize },
}

impl HopOutcome {
  pub fn is_dispatched(&self) -> bool {
    matches!(self, HopOutcome::Dispatched { .. })
  }

  /// Bytes to return to the caller; empty for a dispatched hop.
  pub fn into_bytes(self) -> Vec<u8> {
    match self {
      HopOutcome::Completed(data) => data,
      HopOutcome::Dispatched { .. } => Vec::new(),
    }
  }
}

/// Decides whether a hop returns or continues, and dispatches continuations.
pub struct ContinuationDispatcher<'a, T: Transport, N: HopNotifier> {
  config: &'a EngineConfig,
  transport: &'a T,
  notifier: &'a N,
}

impl<'a, T: Transport, N: HopNotifier> ContinuationDispatcher<'a, T, N> {
  pub fn new(config: &'a EngineConfig, transport: &'a T, notifier: &'a N) -> Self {
    Self {
      config,
      transport,
      notifier,
    }
  }

  /// Finish the hop for a chain whose current phase just completed.
  #[instrument(
    name = "dispatch",
    skip(self, chain, result),
    fields(chain_id = %chain.id(), position = chain.position())
  )]
  pub async fn dispatch(&self, chain: &Chain, result: Vec<u8>) -> Result<HopOutcome, ExecutionError> {
    // A single-phase chain never continues, whatever the position says.
    if chain.phase_count() == 1 || chain.is_finished() {
      info!("chain completed");
      self.notifier.notify(HopEvent::ChainCompleted {
        chain_id: chain.id().to_string(),
      });
      return Ok(HopOutcome::Completed(result));
    }

    let next_phase = chain.position();
    let async_url = self
      .config
      .async_url()
      .ok_or_else(|| ExecutionError::Config {
        message: "function name is required to dispatch a continuation".to_string(),
      })?;

    let definition = chain.encode().map_err(|e| ExecutionError::Encode {
      message: e.to_string(),
    })?;
    let envelope = hopchain_codec::encode(chain.id(), &definition, &result)?;

    // Only the hop that runs the final phase reports to the callback.
    let callback = if chain.is_last_phase() {
      chain.callback_url()
    } else {
      None
    };
    let request = continuation_request(async_url, envelope, callback);

    let response = self.transport.send(request).await.map_err(|e| {
      error!(error = %e, "continuation dispatch failed");
      ExecutionError::Dispatch {
        next_phase,
        message: e.to_string(),
      }
    })?;

    if !response.is_success() {
      error!(status = response.status, "gateway rejected continuation");
      return Err(ExecutionError::Dispatch {
        next_phase,
        message: format!("gateway responded with status {}", response.status),
      });
    }

    info!(callback = callback.is_some(), "continuation dispatched");
    self.notifier.notify(HopEvent::ContinuationDispatched {
      chain_id: chain.id().to_string(),
      position: next_phase,
      callback: callback.is_some(),
    });

    Ok(HopOutcome::Dispatched {
      position: next_phase,
    })
  }
}
