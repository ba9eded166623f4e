//! Type-erased graph nodes backing every [`Builder`](super::Builder).
//!
//! A node is an immutable record: a process-unique [`NodeId`] plus a
//! [`NodeKind`] describing how its value is produced. Nodes never hold
//! realization state; memoized values live in the [`Scope`](super::Scope).

use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::scope::Scope;

/// Error type accepted from factories, continuations and effect callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A realized value with its concrete type erased.
pub(crate) type Value = Rc<dyn Any>;

pub(crate) type FactoryFn = dyn Fn(&mut Scope, &str) -> Result<Value, BoxError>;
pub(crate) type ContinueFn = dyn Fn(Value) -> Result<Rc<Node>, BoxError>;
pub(crate) type EffectFn = dyn Fn(&mut Scope, Value) -> Result<Value, BoxError>;
pub(crate) type DeferFn = dyn Fn() -> Rc<Node>;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a declared node.
///
/// Ids are handed out in declaration order. Clones of a builder share the
/// id, which is what memoization keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
  fn next() -> Self {
    NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
  }
}

impl fmt::Display for NodeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

pub(crate) enum NodeKind {
  /// Runs a factory against the scope and registers the result under an identity.
  Create {
    identity: Option<String>,
    factory: Rc<FactoryFn>,
  },
  /// A value that is already available.
  Unit(Value),
  /// Realizes `upstream`, feeds it to the continuation, realizes the result.
  Chain {
    upstream: Rc<Node>,
    continuation: Rc<ContinueFn>,
  },
  /// Realizes every field in order into a [`Context`].
  Combine { fields: Vec<(String, Rc<Node>)> },
  /// Runs a callback once `input` is realized.
  Effect { input: Rc<Node>, callback: Rc<EffectFn> },
  /// Resolves to another node when the graph is planned.
  Defer(Rc<DeferFn>),
}

pub(crate) struct Node {
  pub(crate) id: NodeId,
  pub(crate) kind: NodeKind,
}

impl Node {
  pub(crate) fn new(kind: NodeKind) -> Rc<Self> {
    Rc::new(Node { id: NodeId::next(), kind })
  }

  /// Human readable label used in errors and logs.
  pub(crate) fn label(&self) -> String {
    match &self.kind {
      NodeKind::Create {
        identity: Some(identity),
        ..
      } => identity.clone(),
      NodeKind::Create { identity: None, .. } => format!("create{}", self.id),
      NodeKind::Unit(_) => format!("unit{}", self.id),
      NodeKind::Chain { .. } => format!("chain{}", self.id),
      NodeKind::Combine { .. } => format!("combine{}", self.id),
      NodeKind::Effect { .. } => format!("effect{}", self.id),
      NodeKind::Defer(_) => format!("defer{}", self.id),
    }
  }

  /// Explicit identity of a `Create` node, if any.
  pub(crate) fn explicit_identity(&self) -> Option<&str> {
    match &self.kind {
      NodeKind::Create { identity, .. } => identity.as_deref(),
      _ => None,
    }
  }
}

impl fmt::Debug for Node {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Node").field("id", &self.id).field("label", &self.label()).finish()
  }
}

/// Downcast an erased value back to its concrete type.
pub(crate) fn downcast<T: 'static>(value: Value) -> Result<Rc<T>, BoxError> {
  value.downcast::<T>().map_err(|_| {
    Box::new(super::context::ContextError::TypeMismatch {
      field: String::from("<value>"),
      expected: std::any::type_name::<T>(),
    }) as BoxError
  })
}
