//! Phase execution.
//!
//! Runs every function of the chain's current phase in order, feeding the
//! output of each function into the next. The phase either completes as a
//! whole, advancing the chain by one position, or fails on the first error.

use hopchain_chain::{Chain, Function, RemoteCall};
use tracing::{debug, error, info, instrument};

use crate::config::EngineConfig;
use crate::error::ExecutionError;
use crate::events::{HopEvent, HopNotifier};
use crate::request::upstream_request;
use crate::transport::{Transport, TransportError};

/// Executes the current phase of a chain.
pub struct PhaseExecutor<'a, T: Transport, N: HopNotifier> {
  config: &'a EngineConfig,
  transport: &'a T,
  notifier: &'a N,
}

impl<'a, T: Transport, N: HopNotifier> PhaseExecutor<'a, T, N> {
  pub fn new(config: &'a EngineConfig, transport: &'a T, notifier: &'a N) -> Self {
    Self {
      config,
      transport,
      notifier,
    }
  }

  /// Run the current phase with `input` and return its output.
  ///
  /// On success the chain's position is advanced by one. On failure the
  /// position is left untouched and partial results are discarded.
  #[instrument(
    name = "phase_execute",
    skip(self, chain, input),
    fields(chain_id = %chain.id(), phase = chain.position())
  )]
  pub async fn execute(&self, chain: &mut Chain, input: Vec<u8>) -> Result<Vec<u8>, ExecutionError> {
    let phase = chain.position();
    let result = self.execute_inner(chain, input).await;

    match &result {
      Ok(output) => {
        chain.advance();
        info!(output_len = output.len(), "phase completed");
        self.notifier.notify(HopEvent::PhaseCompleted {
          chain_id: chain.id().to_string(),
          phase,
        });
      }
      Err(e) => {
        error!(error = %e, "phase failed");
        self.notifier.notify(HopEvent::PhaseFailed {
          chain_id: chain.id().to_string(),
          phase,
          error: e.to_string(),
        });
      }
    }

    result
  }

  async fn execute_inner(&self, chain: &Chain, input: Vec<u8>) -> Result<Vec<u8>, ExecutionError> {
    let position = chain.position();
    let phase = chain
      .current_phase()
      .ok_or_else(|| ExecutionError::ChainFinished {
        chain_id: chain.id().to_string(),
        position,
        phases: chain.phase_count(),
      })?;

    let mut buffer = input;
    for (index, function) in phase.functions().iter().enumerate() {
      buffer = match function {
        Function::RemoteCall(call) => self.call_remote(position, call, buffer).await?,
        Function::LocalModifier(modifier) => modifier
          .apply(&buffer)
          .map_err(|source| ExecutionError::Modifier {
            phase: position,
            source,
          })?,
      };

      debug!(index, function = ?function.name(), "function completed");
      self.notifier.notify(HopEvent::FunctionCompleted {
        chain_id: chain.id().to_string(),
        phase: position,
        index,
        function: function.name().map(str::to_string),
      });
    }

    Ok(buffer)
  }

  async fn call_remote(
    &self,
    phase: usize,
    call: &RemoteCall,
    body: Vec<u8>,
  ) -> Result<Vec<u8>, ExecutionError> {
    let request =
      upstream_request(call, self.config, body).map_err(|method| ExecutionError::InvalidMethod {
        phase,
        function: call.name().to_string(),
        method,
      })?;

    debug!(function = call.name(), url = %request.url, method = %request.method, "calling function");

    let response = self
      .transport
      .send(request)
      .await
      .map_err(|e| match e {
        TransportError::Body(message) => ExecutionError::ReadBody {
          phase,
          function: call.name().to_string(),
          message,
        },
        other => ExecutionError::RemoteCall {
          phase,
          function: call.name().to_string(),
          message: other.to_string(),
        },
      })?;

    if !response.is_success() {
      return Err(ExecutionError::RemoteStatus {
        phase,
        function: call.name().to_string(),
        status: response.status,
      });
    }

    Ok(response.body)
  }
}
