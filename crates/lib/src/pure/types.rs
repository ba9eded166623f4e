//! Error and statistics types for graph evaluation.

use thiserror::Error;

use super::node::BoxError;

/// Errors that abort a [`join`](super::join).
///
/// Every error stops the pass immediately. Resources registered before the
/// failure stay registered in the scope.
#[derive(Debug, Error)]
pub enum JoinError {
  /// Two distinct builders claim the same identity in one scope.
  #[error("identity '{identity}' is claimed by more than one builder in scope '{scope}'")]
  IdentityCollision { scope: String, identity: String },

  /// An explicit identity uses the marker reserved for generated identities.
  #[error("identity '{identity}' contains '{marker}', which is reserved for generated identities")]
  ReservedIdentity { identity: String, marker: char },

  /// The dependency graph loops back on itself.
  #[error("dependency cycle detected at {node}")]
  CycleDetected { node: String },

  /// A factory, continuation or effect callback failed.
  #[error("{node} failed: {source}")]
  Factory {
    node: String,
    #[source]
    source: BoxError,
  },

  /// A context combines two fields under the same name.
  #[error("context field '{field}' is combined more than once")]
  DuplicateField { field: String },

  /// The scope was already used by a previous join.
  #[error("scope '{scope}' has already been joined")]
  AlreadyJoined { scope: String },
}

/// Counters describing what a join actually ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
  /// Factories invoked (one per realized `Create` node).
  pub factories: usize,
  /// Chain continuations invoked.
  pub continuations: usize,
  /// Effect callbacks invoked.
  pub effects: usize,
  /// Memoized values served without re-running anything.
  pub memo_hits: usize,
}

impl JoinStats {
  /// Total number of user callbacks executed.
  pub fn total(&self) -> usize {
    self.factories + self.continuations + self.effects
  }
}
