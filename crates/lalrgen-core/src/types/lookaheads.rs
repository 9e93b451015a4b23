use super::{symbol::TerminalId, terminal_set::TerminalSet};
use crate::Array;
use std::collections::VecDeque;

/// Index of a [`Lookaheads`] node within a [`LookaheadArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LookaheadId(pub u32);

/// One node of the lookahead-propagation graph: a terminal set plus the
/// indices of nodes that must be re-unioned whenever this one grows.
///
/// The graph this forms is cyclic in general (a lookahead can end up
/// listening to a node that transitively listens back to it, via recursive
/// non-terminals), so propagation is driven from an explicit worklist rather
/// than recursion — see [`LookaheadArena::propagate`].
#[derive(Debug, Clone)]
pub struct Lookaheads {
  pub set: TerminalSet,
  pub listeners: Array<LookaheadId>,
}

impl Lookaheads {
  fn new(terminal_count: usize) -> Self {
    Self { set: TerminalSet::new(terminal_count), listeners: Array::new() }
  }
}

/// Owns every [`Lookaheads`] node created while building one LALR machine.
///
/// Scoped to the lifetime of a single `build_machine()` call: nothing here
/// is global state.
#[derive(Debug)]
pub struct LookaheadArena {
  terminal_count: usize,
  nodes: Array<Lookaheads>,
}

impl LookaheadArena {
  pub fn new(terminal_count: usize) -> Self {
    Self { terminal_count, nodes: Array::new() }
  }

  pub fn alloc(&mut self) -> LookaheadId {
    self.nodes.push(Lookaheads::new(self.terminal_count));
    LookaheadId((self.nodes.len() - 1) as u32)
  }

  pub fn alloc_with(&mut self, seed: &TerminalSet) -> LookaheadId {
    let id = self.alloc();
    self.nodes[id.0 as usize].set.union_with(seed);
    id
  }

  pub fn get(&self, id: LookaheadId) -> &Lookaheads {
    &self.nodes[id.0 as usize]
  }

  /// Registers `listener` to be re-unioned whenever `source` grows.
  pub fn add_listener(&mut self, source: LookaheadId, listener: LookaheadId) {
    let node = &mut self.nodes[source.0 as usize];
    if !node.listeners.contains(&listener) {
      node.listeners.push(listener);
    }
  }

  /// Unions `terminal` into `target`, propagating growth to its listeners
  /// (and transitively to theirs) via an explicit worklist.
  pub fn union_terminal(&mut self, target: LookaheadId, terminal: TerminalId) {
    let grew = self.nodes[target.0 as usize].set.insert(terminal);
    if grew {
      self.propagate_from(target);
    }
  }

  /// Unions `addition` into `target`, propagating growth as above.
  pub fn union_set(&mut self, target: LookaheadId, addition: &TerminalSet) {
    let grew = self.nodes[target.0 as usize].set.union_with(addition);
    if grew {
      self.propagate_from(target);
    }
  }

  fn propagate_from(&mut self, start: LookaheadId) {
    let seed = self.nodes[start.0 as usize].set.clone();
    let mut worklist: VecDeque<(TerminalSet, LookaheadId)> =
      self.nodes[start.0 as usize].listeners.iter().map(|&l| (seed.clone(), l)).collect();
    while let Some((addition, id)) = worklist.pop_front() {
      let grew = self.nodes[id.0 as usize].set.union_with(&addition);
      if grew {
        let grown = self.nodes[id.0 as usize].set.clone();
        worklist.extend(self.nodes[id.0 as usize].listeners.iter().map(|&l| (grown.clone(), l)));
      }
    }
  }
}
