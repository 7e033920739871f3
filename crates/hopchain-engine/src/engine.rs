//! Hop orchestration.

use std::time::Duration;

use hopchain_chain::ChainDefinition;
use tracing::{error, instrument};

use crate::builder::{Hop, build_chain, verify_definition};
use crate::config::EngineConfig;
use crate::dispatcher::{ContinuationDispatcher, HopOutcome};
use crate::error::ExecutionError;
use crate::events::{HopNotifier, NoopNotifier};
use crate::executor::PhaseExecutor;
use crate::transport::{HttpTransport, Transport};

/// Runs one hop of a chain per call to [`Engine::handle`].
///
/// The engine holds no chain state between calls; everything a later hop
/// needs travels inside the dispatched continuation.
pub struct Engine<T: Transport = HttpTransport, N: HopNotifier = NoopNotifier> {
  config: EngineConfig,
  transport: T,
  notifier: N,
}

impl Engine<HttpTransport, NoopNotifier> {
  /// Create an engine backed by a reqwest client.
  pub fn new(config: EngineConfig) -> Result<Self, ExecutionError> {
    let timeout = config.request_timeout_ms.map(Duration::from_millis);
    let transport = HttpTransport::new(timeout)?;
    Ok(Self::with_transport(config, transport))
  }
}

impl<T: Transport> Engine<T, NoopNotifier> {
  pub fn with_transport(config: EngineConfig, transport: T) -> Self {
    Self {
      config,
      transport,
      notifier: NoopNotifier,
    }
  }
}

impl<T: Transport, N: HopNotifier> Engine<T, N> {
  /// Replace the notifier.
  pub fn with_notifier<M: HopNotifier>(self, notifier: M) -> Engine<T, M> {
    Engine {
      config: self.config,
      transport: self.transport,
      notifier,
    }
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  pub fn transport(&self) -> &T {
    &self.transport
  }

  /// Handle one inbound request.
  ///
  /// Builds or resumes the chain, runs `definition` against it, executes the
  /// current phase and then returns the result or dispatches the next hop.
  pub async fn handle<D>(&self, definition: &D, input: Vec<u8>) -> Result<HopOutcome, ExecutionError>
  where
    D: ChainDefinition + ?Sized,
  {
    let hop = build_chain(&self.config, input, &self.notifier)?;
    self.run_hop(definition, hop).await
  }

  #[instrument(
    name = "hop",
    skip_all,
    fields(chain_id = %hop.chain.id(), resumed = hop.resumed)
  )]
  async fn run_hop<D>(&self, definition: &D, hop: Hop) -> Result<HopOutcome, ExecutionError>
  where
    D: ChainDefinition + ?Sized,
  {
    let Hop {
      mut chain,
      data,
      expected_fingerprint,
      ..
    } = hop;

    if let Err(e) = definition.define(&mut chain) {
      error!(error = %e, "chain definition failed");
      return Err(e.into());
    }
    verify_definition(&chain, expected_fingerprint.as_deref())?;

    if chain.phase_count() == 0 {
      return Err(ExecutionError::EmptyChain {
        chain_id: chain.id().to_string(),
      });
    }

    let result = PhaseExecutor::new(&self.config, &self.transport, &self.notifier)
      .execute(&mut chain, data)
      .await?;

    ContinuationDispatcher::new(&self.config, &self.transport, &self.notifier)
      .dispatch(&chain, result)
      .await
  }
}
