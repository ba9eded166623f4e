//! Named-field contexts and the combinator that produces them.

use std::any::Any;
use std::marker::PhantomData;
use std::rc::Rc;

use thiserror::Error;

use super::builder::Builder;
use super::node::{Node, NodeKind, Value};

/// Errors raised when reading or extending a [`Context`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
  /// No field with this name was combined.
  #[error("context has no field '{0}'")]
  MissingField(String),

  /// The field exists but holds a different type.
  #[error("context field '{field}' is not a {expected}")]
  TypeMismatch { field: String, expected: &'static str },

  /// A field with this name is already present.
  #[error("context field '{0}' is already defined")]
  DuplicateField(String),
}

/// Realized values keyed by field name.
///
/// Field order follows declaration order.
#[derive(Clone, Default)]
pub struct Context {
  fields: Vec<(String, Value)>,
}

impl Context {
  pub fn new() -> Self {
    Self::default()
  }

  /// Typed access to a field.
  pub fn get<T: Any>(&self, name: &str) -> Result<Rc<T>, ContextError> {
    let value = self
      .fields
      .iter()
      .find(|(field, _)| field == name)
      .map(|(_, value)| value.clone())
      .ok_or_else(|| ContextError::MissingField(name.to_string()))?;

    value.downcast::<T>().map_err(|_| ContextError::TypeMismatch {
      field: name.to_string(),
      expected: std::any::type_name::<T>(),
    })
  }

  /// Add a field, rejecting duplicates.
  pub fn insert<T: Any>(&mut self, name: impl Into<String>, value: Rc<T>) -> Result<(), ContextError> {
    let name = name.into();
    if self.contains(&name) {
      return Err(ContextError::DuplicateField(name));
    }
    let value: Value = value;
    self.fields.push((name, value));
    Ok(())
  }

  /// Builder-style variant of [`Context::insert`].
  pub fn with<T: Any>(mut self, name: impl Into<String>, value: T) -> Result<Self, ContextError> {
    self.insert(name, Rc::new(value))?;
    Ok(self)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.fields.iter().any(|(field, _)| field == name)
  }

  /// Field names in declaration order.
  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.fields.iter().map(|(field, _)| field.as_str())
  }

  pub fn len(&self) -> usize {
    self.fields.len()
  }

  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
  }

  pub(crate) fn push_erased(&mut self, name: String, value: Value) {
    self.fields.push((name, value));
  }
}

impl std::fmt::Debug for Context {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Context").field("fields", &self.names().collect::<Vec<_>>()).finish()
  }
}

/// Collects named builders into a single `Builder<Context>`.
///
/// ```
/// use purestack_lib::pure::{Builder, combine, join, Scope};
///
/// let zone = Builder::unit("example.com".to_string());
/// let port = Builder::unit(443u16);
/// let ctx = combine().field("zone", &zone).field("port", &port).build();
///
/// let mut scope = Scope::new("doc");
/// let ctx = join(&mut scope, &ctx).unwrap();
/// assert_eq!(*ctx.get::<u16>("port").unwrap(), 443);
/// ```
#[derive(Default)]
pub struct Combine {
  fields: Vec<(String, Rc<Node>)>,
}

/// Start a context combinator.
pub fn combine() -> Combine {
  Combine::default()
}

impl Combine {
  /// Add a named builder. Duplicate names are reported when the graph is joined.
  pub fn field<T: Any>(mut self, name: impl Into<String>, builder: &Builder<T>) -> Self {
    self.fields.push((name.into(), builder.node.clone()));
    self
  }

  pub fn build(self) -> Builder<Context> {
    Builder {
      node: Node::new(NodeKind::Combine { fields: self.fields }),
      _marker: PhantomData,
    }
  }
}
