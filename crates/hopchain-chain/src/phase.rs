use crate::function::Function;

/// An ordered pipeline of functions executed within a single hop.
#[derive(Debug, Clone, Default)]
pub struct Phase {
  functions: Vec<Function>,
}

impl Phase {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append a function to the end of the pipeline.
  pub fn apply(mut self, function: impl Into<Function>) -> Self {
    self.push(function);
    self
  }

  pub fn push(&mut self, function: impl Into<Function>) {
    self.functions.push(function.into());
  }

  pub fn functions(&self) -> &[Function] {
    &self.functions
  }

  pub fn len(&self) -> usize {
    self.functions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.functions.is_empty()
  }
}
