//! Chain definition served by this function.

use hopchain_chain::{Chain, DefinitionError};

/// A single phase that echoes the request back.
pub fn define(chain: &mut Chain) -> Result<(), DefinitionError> {
  chain
    .apply_modifier(|data| Ok(data.to_vec()))
    .apply_modifier(|data| {
      let mut out = b"you said ".to_vec();
      out.extend_from_slice(data);
      Ok(out)
    });
  Ok(())
}
