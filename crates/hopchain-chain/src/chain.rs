use crate::error::{ModifierError, SnapshotError};
use crate::function::Function;
use crate::phase::Phase;
use crate::snapshot::ChainSnapshot;

/// A chain of phases plus the cursor and metadata that travel between hops.
///
/// The phase list is rebuilt by the chain definition on every hop. Only the
/// position, the callback URL and the correlation id survive across hops.
#[derive(Debug, Clone)]
pub struct Chain {
  id: String,
  phases: Vec<Phase>,
  position: usize,
  callback_url: Option<String>,
  // Set by `then`; the next `apply` opens a new phase.
  open_phase: bool,
}

impl Chain {
  /// Create an empty chain shell at position 0.
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      phases: Vec::new(),
      position: 0,
      callback_url: None,
      open_phase: false,
    }
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn position(&self) -> usize {
    self.position
  }

  pub fn set_position(&mut self, position: usize) {
    self.position = position;
  }

  pub fn callback_url(&self) -> Option<&str> {
    self.callback_url.as_deref()
  }

  pub fn set_callback_url(&mut self, url: Option<String>) {
    self.callback_url = url.filter(|u| !u.is_empty());
  }

  pub fn add_phase(&mut self, phase: Phase) -> &mut Self {
    self.phases.push(phase);
    self.open_phase = false;
    self
  }

  /// Append a function to the last phase, opening a new phase if needed.
  pub fn apply(&mut self, function: impl Into<Function>) -> &mut Self {
    if self.phases.is_empty() || self.open_phase {
      self.phases.push(Phase::new());
      self.open_phase = false;
    }
    if let Some(phase) = self.phases.last_mut() {
      phase.push(function);
    }
    self
  }

  /// Append a local modifier to the last phase.
  pub fn apply_modifier<F>(&mut self, transform: F) -> &mut Self
  where
    F: Fn(&[u8]) -> Result<Vec<u8>, ModifierError> + Send + Sync + 'static,
  {
    self.apply(Function::modifier(transform))
  }

  /// Close the current phase; subsequent `apply` calls go to a new one.
  ///
  /// A `then` with nothing applied after it, or after an empty phase, adds
  /// no phase.
  pub fn then(&mut self) -> &mut Self {
    if self.phases.last().is_some_and(|phase| !phase.is_empty()) {
      self.open_phase = true;
    }
    self
  }

  pub fn phases(&self) -> &[Phase] {
    &self.phases
  }

  pub fn phase_count(&self) -> usize {
    self.phases.len()
  }

  /// The phase at the current position, `None` once the chain is finished.
  pub fn current_phase(&self) -> Option<&Phase> {
    self.phases.get(self.position)
  }

  /// Move the cursor past the current phase.
  pub fn advance(&mut self) {
    self.position += 1;
  }

  pub fn is_finished(&self) -> bool {
    self.position >= self.phases.len()
  }

  pub fn remaining_phases(&self) -> usize {
    self.phases.len().saturating_sub(self.position)
  }

  /// True when exactly one phase is left to execute.
  pub fn is_last_phase(&self) -> bool {
    self.remaining_phases() == 1
  }

  /// Structural fingerprint of the phase list.
  pub fn fingerprint(&self) -> Result<String, SnapshotError> {
    ChainSnapshot::of(self).compute_fingerprint()
  }

  /// Encode the chain definition, including the current position.
  pub fn encode(&self) -> Result<String, SnapshotError> {
    let mut snapshot = ChainSnapshot::of(self);
    snapshot.fingerprint = Some(snapshot.compute_fingerprint()?);
    snapshot.encode()
  }
}
