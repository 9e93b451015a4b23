use super::{indexed_id_implementations, item::LrItem, lookaheads::LookaheadId, symbol::GrammarSymbol};
use crate::OrderedMap;

/// Index of a [`LalrState`] within [`crate::Grammar`]'s state table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(pub u32);
indexed_id_implementations!(StateId);

/// A node of the LALR(1) viable-prefix automaton.
///
/// Identity is determined entirely by `kernel` (see
/// [`crate::machine::kernel_key`]) — two states with the same kernel items
/// are the same state, regardless of what their lookaheads end up holding.
#[derive(Debug, Clone)]
pub struct LalrState {
  pub index: StateId,
  /// Items present before closure, i.e. inherited from a predecessor
  /// transition (or, for the start state, the seed item). Determines the
  /// state's identity.
  pub kernel: OrderedMap<LrItem, LookaheadId>,
  /// Every item reachable from the kernel by closure, including the kernel
  /// items themselves. Iteration order follows [`LrItem`]'s total order.
  pub items: OrderedMap<LrItem, LookaheadId>,
  pub transitions: OrderedMap<GrammarSymbol, StateId>,
}

impl LalrState {
  pub fn new(index: StateId, kernel: OrderedMap<LrItem, LookaheadId>) -> Self {
    let items = kernel.clone();
    Self { index, kernel, items, transitions: OrderedMap::new() }
  }
}
