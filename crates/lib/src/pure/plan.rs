//! Static planning of a builder graph.
//!
//! Before any factory runs, the graph reachable from the top-level builder is
//! walked into a petgraph [`DiGraph`] with edges from dependency to dependent.
//! Planning resolves `defer` thunks, rejects cycles, duplicate context fields
//! and distinct builders sharing an explicit identity. Effects chained off the
//! same value are ordered by declaration with an edge from each to the next. Graphs produced later
//! by chain continuations are planned into the same graph and verified again
//! before they are realized.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::consts::GENERATED_IDENTITY_MARKER;

use super::node::{Node, NodeId, NodeKind};
use super::types::JoinError;

pub(crate) struct Plan {
  scope: String,

  /// Dependency graph over node ids.
  graph: DiGraph<NodeId, ()>,

  /// Map from node id to graph index.
  indices: HashMap<NodeId, NodeIndex>,

  /// Every planned node, kept alive for the duration of the join.
  nodes: HashMap<NodeId, Rc<Node>>,

  /// Nodes whose children have been walked.
  expanded: HashSet<NodeId>,

  /// Resolved targets of `Defer` nodes.
  deferred: HashMap<NodeId, Rc<Node>>,

  /// Explicit identities claimed so far.
  explicit: HashMap<String, NodeId>,

  /// Effects keyed by the node they are chained off, in declaration order.
  effects: HashMap<NodeId, Vec<Rc<Node>>>,
}

impl Plan {
  pub(crate) fn new(scope: impl Into<String>) -> Self {
    Self {
      scope: scope.into(),
      graph: DiGraph::new(),
      indices: HashMap::new(),
      nodes: HashMap::new(),
      expanded: HashSet::new(),
      deferred: HashMap::new(),
      explicit: HashMap::new(),
      effects: HashMap::new(),
    }
  }

  /// Plan everything reachable from `root` and verify the whole graph.
  pub(crate) fn extend(&mut self, root: &Rc<Node>) -> Result<(), JoinError> {
    let mut stack = vec![root.clone()];
    self.index_of(root);

    while let Some(node) = stack.pop() {
      if !self.expanded.insert(node.id) {
        continue;
      }

      if let Some(identity) = node.explicit_identity() {
        if identity.contains(GENERATED_IDENTITY_MARKER) {
          return Err(JoinError::ReservedIdentity {
            identity: identity.to_string(),
            marker: GENERATED_IDENTITY_MARKER,
          });
        }
        match self.explicit.get(identity) {
          Some(owner) if *owner != node.id => {
            return Err(JoinError::IdentityCollision {
              scope: self.scope.clone(),
              identity: identity.to_string(),
            });
          }
          Some(_) => {}
          None => {
            self.explicit.insert(identity.to_string(), node.id);
          }
        }
      }

      for child in self.children(&node)? {
        self.add_edge(&child, &node);
        if !self.expanded.contains(&child.id) {
          stack.push(child);
        }
      }

      if let NodeKind::Effect { input, .. } = &node.kind {
        self.add_effect(input.id, &node);
      }
    }

    self.verify_acyclic()
  }

  /// Record that `dependent` needs `dependency`, then verify the graph.
  pub(crate) fn depend(&mut self, dependency: &Rc<Node>, dependent: &Rc<Node>) -> Result<(), JoinError> {
    self.add_edge(dependency, dependent);
    self.verify_acyclic()
  }

  /// Target of a planned `Defer` node.
  pub(crate) fn deferred(&self, id: NodeId) -> Option<Rc<Node>> {
    self.deferred.get(&id).cloned()
  }

  /// Effects on `input` declared before `effect`, oldest first.
  pub(crate) fn earlier_effects(&self, input: NodeId, effect: NodeId) -> Vec<Rc<Node>> {
    self
      .effects
      .get(&input)
      .map(|siblings| siblings.iter().take_while(|sibling| sibling.id < effect).cloned().collect())
      .unwrap_or_default()
  }

  pub(crate) fn node_count(&self) -> usize {
    self.graph.node_count()
  }

  pub(crate) fn edge_count(&self) -> usize {
    self.graph.edge_count()
  }

  /// Node ids with dependencies before dependents.
  pub(crate) fn order(&self) -> Result<Vec<NodeId>, JoinError> {
    let sorted = toposort(&self.graph, None).map_err(|cycle| self.cycle_error(cycle.node_id()))?;
    Ok(sorted.into_iter().map(|idx| self.graph[idx]).collect())
  }

  fn verify_acyclic(&self) -> Result<(), JoinError> {
    self.order().map(|_| ())
  }

  fn cycle_error(&self, idx: NodeIndex) -> JoinError {
    let id = self.graph[idx];
    let node = self.nodes.get(&id).map(|node| node.label()).unwrap_or_else(|| id.to_string());
    JoinError::CycleDetected { node }
  }

  fn index_of(&mut self, node: &Rc<Node>) -> NodeIndex {
    if let Some(&idx) = self.indices.get(&node.id) {
      return idx;
    }
    let idx = self.graph.add_node(node.id);
    self.indices.insert(node.id, idx);
    self.nodes.insert(node.id, node.clone());
    idx
  }

  /// Insert `effect` among the effects on `input` by node id and link it to
  /// its neighbours so the graph order matches declaration order.
  fn add_effect(&mut self, input: NodeId, effect: &Rc<Node>) {
    let siblings = self.effects.entry(input).or_default();
    let pos = siblings.partition_point(|sibling| sibling.id < effect.id);
    siblings.insert(pos, effect.clone());

    let before = pos.checked_sub(1).map(|i| siblings[i].clone());
    let after = siblings.get(pos + 1).cloned();
    if let Some(before) = before {
      self.add_edge(&before, effect);
    }
    if let Some(after) = after {
      self.add_edge(effect, &after);
    }
  }

  fn add_edge(&mut self, dependency: &Rc<Node>, dependent: &Rc<Node>) {
    let from = self.index_of(dependency);
    let to = self.index_of(dependent);
    self.graph.update_edge(from, to, ());
  }

  /// Direct dependencies known before realization.
  ///
  /// A chain's continuation result is unknown until its upstream is realized,
  /// so only the upstream is listed here.
  fn children(&mut self, node: &Rc<Node>) -> Result<Vec<Rc<Node>>, JoinError> {
    match &node.kind {
      NodeKind::Create { .. } | NodeKind::Unit(_) => Ok(Vec::new()),
      NodeKind::Chain { upstream, .. } => Ok(vec![upstream.clone()]),
      NodeKind::Effect { input, .. } => Ok(vec![input.clone()]),
      NodeKind::Combine { fields } => {
        let mut seen = HashSet::new();
        for (field, _) in fields {
          if !seen.insert(field.as_str()) {
            return Err(JoinError::DuplicateField { field: field.clone() });
          }
        }
        Ok(fields.iter().map(|(_, child)| child.clone()).collect())
      }
      NodeKind::Defer(thunk) => {
        let target = match self.deferred.get(&node.id) {
          Some(target) => target.clone(),
          None => {
            let target = thunk();
            self.deferred.insert(node.id, target.clone());
            target
          }
        };
        Ok(vec![target])
      }
    }
  }
}
