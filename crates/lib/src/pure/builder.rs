//! Lazy resource builders and the chain, effect and adapter combinators.
//!
//! A [`Builder`] is a typed handle around an immutable graph node. Declaring
//! and composing builders never runs a factory; only [`join`](super::join)
//! does. Cloning a builder is cheap and keeps its identity, so the same
//! builder referenced from several places is realized once per scope.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use super::node::{BoxError, Node, NodeId, NodeKind, Value, downcast};
use super::scope::Scope;

/// A deferred, memoizable description of how to produce a `T`.
pub struct Builder<T> {
  pub(crate) node: Rc<Node>,
  pub(crate) _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Builder<T> {
  fn clone(&self) -> Self {
    Builder {
      node: self.node.clone(),
      _marker: PhantomData,
    }
  }
}

impl<T> fmt::Debug for Builder<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Builder")
      .field("id", &self.node.id)
      .field("label", &self.node.label())
      .finish()
  }
}

impl<T: Any> Builder<T> {
  fn from_kind(kind: NodeKind) -> Self {
    Builder {
      node: Node::new(kind),
      _marker: PhantomData,
    }
  }

  fn create(identity: Option<String>, factory: impl Fn(&mut Scope, &str) -> Result<T, BoxError> + 'static) -> Self {
    Self::from_kind(NodeKind::Create {
      identity,
      factory: Rc::new(move |scope: &mut Scope, id: &str| -> Result<Value, BoxError> {
        let value: Value = Rc::new(factory(scope, id)?);
        Ok(value)
      }),
    })
  }

  /// Declare a resource whose identity is derived when the graph is joined.
  pub fn new(factory: impl Fn(&mut Scope, &str) -> Result<T, BoxError> + 'static) -> Self {
    Self::create(None, factory)
  }

  /// Declare a resource with an explicit identity.
  pub fn named(identity: impl Into<String>, factory: impl Fn(&mut Scope, &str) -> Result<T, BoxError> + 'static) -> Self {
    Self::create(Some(identity.into()), factory)
  }

  /// Lift an already-available value.
  pub fn unit(value: T) -> Self {
    Self::from_kind(NodeKind::Unit(Rc::new(value)))
  }

  /// Reference a builder that is only obtained when the graph is planned.
  ///
  /// This is how forward and self references are declared; the thunk must be
  /// pure declaration and is resolved once per join.
  pub fn defer(thunk: impl Fn() -> Builder<T> + 'static) -> Self {
    Self::from_kind(NodeKind::Defer(Rc::new(move || thunk().node)))
  }

  pub fn id(&self) -> NodeId {
    self.node.id
  }

  /// The explicit identity, if this builder was declared with [`Builder::named`].
  pub fn identity(&self) -> Option<&str> {
    self.node.explicit_identity()
  }

  /// Dependent composition: build the next resource from this one's realized value.
  pub fn chain<U: Any>(&self, continuation: impl Fn(Rc<T>) -> Result<Builder<U>, BoxError> + 'static) -> Builder<U> {
    Builder::from_kind(NodeKind::Chain {
      upstream: self.node.clone(),
      continuation: Rc::new(move |value: Value| -> Result<Rc<Node>, BoxError> {
        let next = continuation(downcast::<T>(value)?)?;
        Ok(next.node)
      }),
    })
  }

  /// Transform the realized value without touching the scope.
  pub fn map<U: Any>(&self, f: impl Fn(&T) -> Result<U, BoxError> + 'static) -> Builder<U> {
    self.chain(move |value| Ok(Builder::unit(f(&value)?)))
  }

  /// Run a side-effecting callback once this builder is realized.
  ///
  /// The callback's return value becomes the value of the resulting builder,
  /// so further effects can be chained off it.
  pub fn effect<U: Any>(&self, callback: impl Fn(&mut Scope, &T) -> Result<U, BoxError> + 'static) -> Builder<U> {
    Builder::from_kind(NodeKind::Effect {
      input: self.node.clone(),
      callback: Rc::new(move |scope: &mut Scope, value: Value| -> Result<Value, BoxError> {
        let input = downcast::<T>(value)?;
        let output: Value = Rc::new(callback(scope, &input)?);
        Ok(output)
      }),
    })
  }
}

/// Adapt a factory over realized values into a builder combinator.
///
/// ```
/// use purestack_lib::pure::{Builder, join, wrap, Scope};
///
/// let port = Builder::unit(8080u16);
/// let url = wrap(|port: &u16| Ok(format!("http://localhost:{port}")))(&port);
///
/// let mut scope = Scope::new("doc");
/// assert_eq!(*join(&mut scope, &url).unwrap(), "http://localhost:8080");
/// ```
pub fn wrap<A: Any, R: Any, F>(raw: F) -> impl Fn(&Builder<A>) -> Builder<R>
where
  F: Fn(&A) -> Result<R, BoxError> + 'static,
{
  let raw = Rc::new(raw);
  move |input: &Builder<A>| {
    let raw = raw.clone();
    input.map(move |value| raw(value))
  }
}
