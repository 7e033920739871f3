//! Hopchain Chain
//!
//! Data model for continuation-driven function chains. A [`Chain`] is an
//! ordered list of [`Phase`]s; each phase is a pipeline of [`Function`]s that
//! is executed within one hop. The chain definition is code (a
//! [`ChainDefinition`]) re-run on every hop, while the cursor travels between
//! hops inside a [`ChainSnapshot`].

mod chain;
mod definition;
mod error;
mod function;
mod phase;
mod snapshot;

pub use chain::Chain;
pub use definition::ChainDefinition;
pub use error::{DefinitionError, ModifierError, SnapshotError};
pub use function::{Function, Modifier, RemoteCall, Transform};
pub use phase::Phase;
pub use snapshot::{ChainSnapshot, FunctionRecord};
