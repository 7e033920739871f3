use crate::chain::Chain;
use crate::error::DefinitionError;

/// User-supplied callback that declares the phases of a chain.
///
/// It runs on every hop against a fresh chain shell and must produce the same
/// phases each time; only the position travels on the wire.
pub trait ChainDefinition: Send + Sync {
  fn define(&self, chain: &mut Chain) -> Result<(), DefinitionError>;
}

impl<F> ChainDefinition for F
where
  F: Fn(&mut Chain) -> Result<(), DefinitionError> + Send + Sync,
{
  fn define(&self, chain: &mut Chain) -> Result<(), DefinitionError> {
    self(chain)
  }
}
