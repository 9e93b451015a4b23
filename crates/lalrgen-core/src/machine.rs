//! LALR(1) viable-prefix automaton construction (§4.4).
//!
//! Kernel-hashed state construction with closure, successor transitions and
//! lookahead propagation via an explicit worklist — never recursion, since
//! the listener graph built by closure can be cyclic (recursive
//! non-terminals propagate lookaheads back into their own derivations).
//!
//! The chain-production "proxy" optimization (folding a no-op single-symbol
//! reduction directly into the transition that would otherwise require a
//! detour through its own state) is not implemented here: this builds the
//! standard LALR(1) automaton, treating proxy productions like any other
//! production. See DESIGN.md for the scoping rationale.

use crate::{
  error::LalrError,
  types::{
    grammar::Grammar,
    item::LrItem,
    lookaheads::LookaheadId,
    production::ProductionId,
    state::StateId,
    symbol::{GrammarSymbol, EOF_TERMINAL},
    terminal_set::TerminalSet,
  },
  OrderedMap, OrderedSet,
};
use std::collections::VecDeque;

impl Grammar {
  /// Builds the LALR(1) automaton from the start production. Requires
  /// [`Grammar::compute_nullability`] and [`Grammar::compute_firsts`] to
  /// have already run, and [`Grammar::set_start_symbol`] to have been
  /// called.
  pub fn build_machine(&mut self) -> Result<(), LalrError> {
    self.lookaheads = crate::types::lookaheads::LookaheadArena::new(self.terminal_count());
    self.states.clear();
    self.kernel_index.clear();

    let start_item = LrItem::start(self.start_production());
    let mut seed = TerminalSet::new(self.terminal_count());
    seed.insert(EOF_TERMINAL);
    let seed_id = self.lookaheads.alloc_with(&seed);
    let mut kernel = OrderedMap::new();
    kernel.insert(start_item, seed_id);
    self.new_state(kernel);

    let mut index = 0usize;
    while index < self.states.len() {
      let state_id = StateId(index as u32);
      self.closure(state_id);
      self.compute_successors(state_id);
      index += 1;
    }
    Ok(())
  }

  fn new_state(&mut self, kernel: OrderedMap<LrItem, LookaheadId>) -> StateId {
    let key: OrderedSet<LrItem> = kernel.keys().copied().collect();
    let id = StateId(self.states.len() as u32);
    self.states.push(crate::types::state::LalrState::new(id, kernel));
    self.kernel_index.insert(key, id);
    id
  }

  /// Returns the state for `kernel_seed`, creating it if its kernel is new,
  /// or merging the seeded lookaheads into the existing state if a state
  /// with this exact kernel already exists. Merging is what drives
  /// cross-state lookahead propagation (§4.4.3): growing an existing
  /// state's lookaheads wakes up everything listening to them.
  fn get_or_create_state(&mut self, kernel_seed: Vec<(LrItem, TerminalSet)>) -> StateId {
    let key: OrderedSet<LrItem> = kernel_seed.iter().map(|(item, _)| *item).collect();
    if let Some(&existing) = self.kernel_index.get(&key) {
      for (item, new_la) in &kernel_seed {
        let la_id = *self.states[usize::from(existing)].kernel.get(item).unwrap();
        self.lookaheads.union_set(la_id, new_la);
      }
      existing
    } else {
      let mut kernel = OrderedMap::new();
      for (item, new_la) in kernel_seed {
        let la_id = self.lookaheads.alloc_with(&new_la);
        kernel.insert(item, la_id);
      }
      self.new_state(kernel)
    }
  }

  /// Expands a state's kernel into its full item set (§4.4.1).
  fn closure(&mut self, state_id: StateId) {
    let mut items = std::mem::take(&mut self.states[usize::from(state_id)].items);
    let mut worklist: VecDeque<LrItem> = items.keys().copied().collect();

    while let Some(item) = worklist.pop_front() {
      let Some(GrammarSymbol::NonTerminal(nt)) = item.next_symbol(self) else { continue };
      let new_la = item.calc_lookahead(self);
      let propagate_own = item.is_nullable_tail(self);
      let item_la_id = *items.get(&item).unwrap();
      let productions = self.non_terminal(nt).productions.clone();

      for prod_id in productions {
        let new_item = LrItem::start(ProductionId(prod_id));
        if let Some(&existing_la_id) = items.get(&new_item) {
          self.lookaheads.union_set(existing_la_id, &new_la);
          if propagate_own {
            self.lookaheads.add_listener(item_la_id, existing_la_id);
            let current = self.lookaheads.get(item_la_id).set.clone();
            self.lookaheads.union_set(existing_la_id, &current);
          }
        } else {
          let la_id = self.lookaheads.alloc_with(&new_la);
          if propagate_own {
            self.lookaheads.add_listener(item_la_id, la_id);
            let current = self.lookaheads.get(item_la_id).set.clone();
            self.lookaheads.union_set(la_id, &current);
          }
          items.insert(new_item, la_id);
          worklist.push_back(new_item);
        }
      }
    }

    self.states[usize::from(state_id)].items = items;
  }

  /// Builds outgoing transitions for every symbol that appears after a dot
  /// in the state's (closed) item set (§4.4.2). Iterates symbols in their
  /// total order, which `OrderedMap` gives for free.
  fn compute_successors(&mut self, state_id: StateId) {
    let items: Vec<(LrItem, LookaheadId)> = self.states[usize::from(state_id)].items.iter().map(|(&i, &l)| (i, l)).collect();

    let mut by_symbol: OrderedMap<GrammarSymbol, Vec<(LrItem, LookaheadId)>> = OrderedMap::new();
    for (item, la_id) in items {
      if let Some(symbol) = item.next_symbol(self) {
        by_symbol.entry(symbol).or_default().push((item, la_id));
      }
    }

    for (symbol, group) in by_symbol {
      let kernel_seed: Vec<(LrItem, TerminalSet)> =
        group.iter().map(|(item, la_id)| (item.shifted(), self.lookaheads.get(*la_id).set.clone())).collect();
      let successor_id = self.get_or_create_state(kernel_seed);

      for (item, la_id) in &group {
        let shifted = item.shifted();
        if let Some(&succ_la_id) = self.states[usize::from(successor_id)].kernel.get(&shifted) {
          self.lookaheads.add_listener(*la_id, succ_la_id);
        }
      }

      self.states[usize::from(state_id)].transitions.insert(symbol, successor_id);
    }
  }
}
