//! The root a builder graph is realized against.
//!
//! A scope is one deployable unit. It owns everything realized under it: the
//! identity registry, the memo table keyed by node, and the synthesized
//! [`Template`] factories declare their resources into.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use tracing::debug;

use crate::consts::{ANONYMOUS_IDENTITY_PREFIX, GENERATED_IDENTITY_MARKER};
use crate::stack::Template;

use super::node::{NodeId, Value};
use super::types::{JoinError, JoinStats};

struct Registration {
  owner: NodeId,
  value: Value,
}

pub struct Scope {
  name: String,
  registry: BTreeMap<String, Registration>,
  memo: HashMap<NodeId, Value>,
  anonymous: u64,
  joined: bool,
  stats: JoinStats,
  template: Template,
}

impl Scope {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      registry: BTreeMap::new(),
      memo: HashMap::new(),
      anonymous: 0,
      joined: false,
      stats: JoinStats::default(),
      template: Template::default(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Register a realized resource under `identity`.
  ///
  /// Fails if a different node already owns the identity. Registering the
  /// same node twice is a no-op that keeps the first value.
  pub fn register<T: Any>(&mut self, identity: &str, owner: NodeId, value: Rc<T>) -> Result<(), JoinError> {
    self.register_erased(identity, owner, value)
  }

  pub(crate) fn register_erased(&mut self, identity: &str, owner: NodeId, value: Value) -> Result<(), JoinError> {
    match self.registry.get(identity) {
      Some(existing) if existing.owner == owner => Ok(()),
      Some(_) => Err(self.collision(identity)),
      None => {
        debug!(scope = %self.name, identity, node = %owner, "registered resource");
        self.registry.insert(identity.to_string(), Registration { owner, value });
        Ok(())
      }
    }
  }

  /// Look up a realized resource by identity.
  ///
  /// Returns `None` when nothing is registered under the identity or when it
  /// holds a different type.
  pub fn lookup<T: Any>(&self, identity: &str) -> Option<Rc<T>> {
    self
      .registry
      .get(identity)
      .and_then(|registration| registration.value.clone().downcast::<T>().ok())
  }

  pub fn contains(&self, identity: &str) -> bool {
    self.registry.contains_key(identity)
  }

  /// Node that owns `identity`, if registered.
  pub fn owner(&self, identity: &str) -> Option<NodeId> {
    self.registry.get(identity).map(|registration| registration.owner)
  }

  /// Registered identities in sorted order.
  pub fn identities(&self) -> impl Iterator<Item = &str> {
    self.registry.keys().map(|identity| identity.as_str())
  }

  /// Whether a node has already been realized under this scope.
  pub fn is_realized(&self, node: NodeId) -> bool {
    self.memo.contains_key(&node)
  }

  pub fn stats(&self) -> JoinStats {
    self.stats
  }

  pub fn is_joined(&self) -> bool {
    self.joined
  }

  pub fn template(&self) -> &Template {
    &self.template
  }

  pub fn template_mut(&mut self) -> &mut Template {
    &mut self.template
  }

  pub fn into_template(self) -> Template {
    self.template
  }

  pub(crate) fn collision(&self, identity: &str) -> JoinError {
    JoinError::IdentityCollision {
      scope: self.name.clone(),
      identity: identity.to_string(),
    }
  }

  /// Next free generated identity, e.g. `Resource#1`.
  ///
  /// Explicit identities cannot contain the marker, so only names registered
  /// directly through [`Scope::register`] need skipping.
  pub(crate) fn next_anonymous(&mut self) -> String {
    loop {
      self.anonymous += 1;
      let candidate = format!("{ANONYMOUS_IDENTITY_PREFIX}{GENERATED_IDENTITY_MARKER}{}", self.anonymous);
      if !self.registry.contains_key(&candidate) {
        return candidate;
      }
    }
  }

  pub(crate) fn memoized(&self, node: NodeId) -> Option<Value> {
    self.memo.get(&node).cloned()
  }

  pub(crate) fn memoize(&mut self, node: NodeId, value: Value) {
    self.memo.insert(node, value);
  }

  pub(crate) fn mark_joined(&mut self) {
    self.joined = true;
  }

  pub(crate) fn stats_mut(&mut self) -> &mut JoinStats {
    &mut self.stats
  }
}

impl std::fmt::Debug for Scope {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Scope")
      .field("name", &self.name)
      .field("identities", &self.identities().collect::<Vec<_>>())
      .field("joined", &self.joined)
      .finish()
  }
}
