//! Hop events and notifiers for observability.
//!
//! Events are emitted while a hop runs so that embedders can observe
//! progress without parsing logs.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted during a hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HopEvent {
  /// No continuation was present; a new chain was created.
  ChainCreated { chain_id: String },

  /// A continuation was decoded; the chain resumes at `position`.
  ChainResumed { chain_id: String, position: usize },

  /// A function in the current phase returned successfully.
  FunctionCompleted {
    chain_id: String,
    phase: usize,
    index: usize,
    function: Option<String>,
  },

  /// Every function of the phase succeeded.
  PhaseCompleted { chain_id: String, phase: usize },

  /// The phase was aborted.
  PhaseFailed {
    chain_id: String,
    phase: usize,
    error: String,
  },

  /// A continuation for `position` was handed to the gateway.
  ContinuationDispatched {
    chain_id: String,
    position: usize,
    callback: bool,
  },

  /// The result is returned to the caller of this hop.
  ChainCompleted { chain_id: String },
}

/// Trait for receiving hop events.
pub trait HopNotifier: Send + Sync {
  fn notify(&self, event: HopEvent);
}

/// A no-op notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl HopNotifier for NoopNotifier {
  fn notify(&self, _event: HopEvent) {}
}

/// A notifier that sends events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<HopEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<HopEvent>) -> Self {
    Self { sender }
  }
}

impl HopNotifier for ChannelNotifier {
  fn notify(&self, event: HopEvent) {
    // Receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
