//! Hopchain Engine
//!
//! Drives a chain one hop per invocation. Each hop is a fresh process with
//! no shared memory, so the state of a running chain travels inside the
//! request that starts the next hop.
//!
//! # Architecture
//!
//! ```text
//! inbound bytes
//!      │
//!      ▼
//! ┌──────────────────────────────────────────────┐
//! │ build_chain                                   │
//! │  - decode continuation, or start a new chain  │
//! │  - run the ChainDefinition, check for drift   │
//! └──────────────────────────────────────────────┘
//!      │
//!      ▼
//! ┌──────────────────────────────────────────────┐
//! │ PhaseExecutor                                 │
//! │  - pipe the payload through the current phase │
//! │  - advance the position on success            │
//! └──────────────────────────────────────────────┘
//!      │
//!      ▼
//! ┌──────────────────────────────────────────────┐
//! │ ContinuationDispatcher                        │
//! │  - return the result, or                      │
//! │  - POST the continuation to the gateway       │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use hopchain_chain::{Chain, DefinitionError};
//! use hopchain_engine::{Engine, EngineConfig};
//!
//! fn define(chain: &mut Chain) -> Result<(), DefinitionError> {
//!   chain.apply("resize").then().apply("upload");
//!   Ok(())
//! }
//!
//! let engine = Engine::new(EngineConfig::new("thumbnails"))?;
//! let outcome = engine.handle(&define, input).await?;
//! ```

mod builder;
mod config;
mod dispatcher;
mod engine;
mod error;
mod events;
mod executor;
mod request;
mod transport;

#[cfg(test)]
mod testing;

pub use builder::{Hop, build_chain, verify_definition};
pub use config::{DEFAULT_FUNCTION_PORT, DEFAULT_GATEWAY, EngineConfig};
pub use dispatcher::{ContinuationDispatcher, HopOutcome};
pub use engine::Engine;
pub use error::ExecutionError;
pub use events::{ChannelNotifier, HopEvent, HopNotifier, NoopNotifier};
pub use executor::PhaseExecutor;
pub use request::{CALLBACK_HEADER, query_string};
pub use transport::{HttpTransport, InboundResponse, OutboundRequest, Transport, TransportError};
