//! The evaluation engine.
//!
//! [`join`] is the only place where factories, continuations and effects run.
//! It plans the graph (see [`plan`](super::plan)), then walks it depth-first:
//! dependencies are realized before dependents, every node is realized at most
//! once per scope, and the first failure aborts the pass.

use std::any::Any;
use std::collections::HashSet;
use std::rc::Rc;

use tracing::{debug, info, warn};

use super::builder::Builder;
use super::context::Context;
use super::node::{Node, NodeId, NodeKind, Value, downcast};
use super::plan::Plan;
use super::scope::Scope;
use super::types::JoinError;

/// Attach `top` to `scope` and realize it.
///
/// A scope can be joined once. Returns the realized value of `top`; every
/// resource realized along the way stays registered in the scope, including
/// when the join fails part way through.
///
/// # Errors
///
/// - [`JoinError::AlreadyJoined`] if the scope was joined before
/// - [`JoinError::CycleDetected`] if the graph loops, before any factory in the loop runs
/// - [`JoinError::IdentityCollision`] if two builders claim one identity
/// - [`JoinError::ReservedIdentity`] if an explicit identity uses the generated-identity marker
/// - [`JoinError::DuplicateField`] if a context combines a name twice
/// - [`JoinError::Factory`] if a factory, continuation or effect fails
pub fn join<T: Any>(scope: &mut Scope, top: &Builder<T>) -> Result<Rc<T>, JoinError> {
  if scope.is_joined() {
    return Err(JoinError::AlreadyJoined {
      scope: scope.name().to_string(),
    });
  }
  scope.mark_joined();

  let name = scope.name().to_string();
  let result = realize_top(scope, &top.node);

  match &result {
    Ok(_) => {
      let stats = scope.stats();
      info!(
        scope = %name,
        factories = stats.factories,
        continuations = stats.continuations,
        effects = stats.effects,
        memo_hits = stats.memo_hits,
        "join complete"
      );
    }
    Err(e) => warn!(scope = %name, error = %e, "join aborted"),
  }

  let value = result?;
  downcast::<T>(value).map_err(|source| JoinError::Factory {
    node: top.node.label(),
    source,
  })
}

fn realize_top(scope: &mut Scope, top: &Rc<Node>) -> Result<Value, JoinError> {
  let mut plan = Plan::new(scope.name());
  plan.extend(top)?;

  info!(
    scope = %scope.name(),
    nodes = plan.node_count(),
    edges = plan.edge_count(),
    "planned builder graph"
  );

  let mut walker = Walker {
    scope,
    plan,
    realizing: HashSet::new(),
  };
  walker.realize(top)
}

struct Walker<'a> {
  scope: &'a mut Scope,
  plan: Plan,
  /// Nodes on the current realization path.
  realizing: HashSet<NodeId>,
}

impl Walker<'_> {
  fn realize(&mut self, node: &Rc<Node>) -> Result<Value, JoinError> {
    if let Some(value) = self.scope.memoized(node.id) {
      self.scope.stats_mut().memo_hits += 1;
      return Ok(value);
    }

    if !self.realizing.insert(node.id) {
      return Err(JoinError::CycleDetected { node: node.label() });
    }

    let value = self.evaluate(node)?;

    self.realizing.remove(&node.id);
    self.scope.memoize(node.id, value.clone());
    Ok(value)
  }

  fn evaluate(&mut self, node: &Rc<Node>) -> Result<Value, JoinError> {
    match &node.kind {
      NodeKind::Create { identity, factory } => {
        let identity = match identity {
          Some(identity) => identity.clone(),
          None => self.scope.next_anonymous(),
        };

        if let Some(owner) = self.scope.owner(&identity)
          && owner != node.id
        {
          return Err(self.scope.collision(&identity));
        }

        debug!(scope = %self.scope.name(), identity = %identity, "realizing resource");
        self.scope.stats_mut().factories += 1;
        let value = factory(&mut *self.scope, &identity).map_err(|source| JoinError::Factory {
          node: identity.clone(),
          source,
        })?;

        self.scope.register_erased(&identity, node.id, value.clone())?;
        Ok(value)
      }

      NodeKind::Unit(value) => Ok(value.clone()),

      NodeKind::Chain { upstream, continuation } => {
        let input = self.realize(upstream)?;

        self.scope.stats_mut().continuations += 1;
        let next = continuation(input).map_err(|source| JoinError::Factory {
          node: node.label(),
          source,
        })?;

        // The continuation may hand back any graph; check it before it runs.
        self.plan.extend(&next)?;
        self.plan.depend(&next, node)?;
        self.realize(&next)
      }

      NodeKind::Combine { fields } => {
        let mut ctx = Context::new();
        for (field, child) in fields {
          let value = self.realize(child)?;
          ctx.push_erased(field.clone(), value);
        }
        Ok(Rc::new(ctx))
      }

      NodeKind::Effect { input, callback } => {
        let value = self.realize(input)?;

        // Earlier effects on the same value run first, whatever the walk order.
        for sibling in self.plan.earlier_effects(input.id, node.id) {
          if !self.realizing.contains(&sibling.id) {
            self.realize(&sibling)?;
          }
        }

        debug!(scope = %self.scope.name(), node = %node.label(), "running effect");
        self.scope.stats_mut().effects += 1;
        callback(&mut *self.scope, value).map_err(|source| JoinError::Factory {
          node: node.label(),
          source,
        })
      }

      NodeKind::Defer(thunk) => {
        let target = self.plan.deferred(node.id).unwrap_or_else(|| thunk());
        self.realize(&target)
      }
    }
  }
}
