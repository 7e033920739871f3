//! Wire form of a chain definition.
//!
//! A snapshot carries the position and callback URL needed to resume a
//! chain, plus a structural record of the phases. Modifiers are recorded by
//! kind only since transforms are code, not data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chain::Chain;
use crate::error::SnapshotError;
use crate::function::Function;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FunctionRecord {
  Remote {
    function: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    header: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    param: BTreeMap<String, Vec<String>>,
  },
  Modifier,
}

impl From<&Function> for FunctionRecord {
  fn from(function: &Function) -> Self {
    match function {
      Function::RemoteCall(call) => FunctionRecord::Remote {
        function: call.name().to_string(),
        header: call.headers().clone(),
        param: call.params().clone(),
      },
      Function::LocalModifier(_) => FunctionRecord::Modifier,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSnapshot {
  pub position: usize,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub callback_url: Option<String>,
  /// Fingerprint of `phases` at encode time. Absent in snapshots that
  /// predate drift detection.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub fingerprint: Option<String>,
  #[serde(default)]
  pub phases: Vec<Vec<FunctionRecord>>,
}

impl ChainSnapshot {
  pub fn of(chain: &Chain) -> Self {
    Self {
      position: chain.position(),
      callback_url: chain.callback_url().map(str::to_string),
      fingerprint: None,
      phases: chain
        .phases()
        .iter()
        .map(|phase| phase.functions().iter().map(FunctionRecord::from).collect())
        .collect(),
    }
  }

  /// blake3 over the canonical JSON of the phase records, hex encoded.
  pub fn compute_fingerprint(&self) -> Result<String, SnapshotError> {
    let canonical = serde_json::to_vec(&self.phases).map_err(SnapshotError::Encode)?;
    Ok(blake3::hash(&canonical).to_hex().to_string())
  }

  pub fn encode(&self) -> Result<String, SnapshotError> {
    serde_json::to_string(self).map_err(SnapshotError::Encode)
  }

  pub fn decode(definition: &str) -> Result<Self, SnapshotError> {
    serde_json::from_str(definition).map_err(SnapshotError::Decode)
  }
}
