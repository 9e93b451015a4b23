use super::{
  production::ProductionId,
  symbol::GrammarSymbol,
  terminal_set::TerminalSet,
};
use crate::Grammar;

/// An LR(0) item: a production paired with a dot position.
///
/// Total order is `(production, dot_position)`, which is the order the rest
/// of the crate relies on for deterministic item iteration within a state.
/// Immutable and `Copy` — the "shifted" form of an item is cheap to
/// recompute, so unlike a lookahead set it is never memoized as a mutable
/// field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LrItem {
  pub production: ProductionId,
  pub dot_position: u16,
}

impl LrItem {
  pub fn start(production: ProductionId) -> Self {
    Self { production, dot_position: 0 }
  }

  pub fn rhs_len(&self, g: &Grammar) -> usize {
    g.production(self.production).rhs.len()
  }

  pub fn is_complete(&self, g: &Grammar) -> bool {
    self.dot_position as usize >= self.rhs_len(g)
  }

  /// The symbol immediately after the dot, or `None` if the item is
  /// complete.
  pub fn next_symbol(&self, g: &Grammar) -> Option<GrammarSymbol> {
    g.production(self.production).rhs.get(self.dot_position as usize).map(|p| p.symbol)
  }

  /// The item with the dot advanced one position. Panics if already
  /// complete; callers are expected to check `is_complete` first, since a
  /// shift is only ever computed for items with a symbol after the dot.
  pub fn shifted(&self) -> Self {
    Self { production: self.production, dot_position: self.dot_position + 1 }
  }

  /// True if every symbol after the *shifted* dot position is a nullable
  /// non-terminal (including the trivial case where none remain) — i.e.
  /// whether the item's own lookahead must also propagate into whatever
  /// lookahead is computed for a closure taken at its current dot.
  pub fn is_nullable_tail(&self, g: &Grammar) -> bool {
    let rhs = &g.production(self.production).rhs;
    rhs[self.dot_position as usize + 1..].iter().all(|part| match part.symbol {
      GrammarSymbol::Terminal(_) => false,
      GrammarSymbol::NonTerminal(nt) => g.non_terminal(nt).nullable,
    })
  }

  /// `FIRST` of the symbols strictly after the dot, per §4.3: scan left to
  /// right, stop at the first non-nullable symbol.
  pub fn calc_lookahead(&self, g: &Grammar) -> TerminalSet {
    let mut out = TerminalSet::new(g.terminal_count());
    let rhs = &g.production(self.production).rhs;
    for part in &rhs[self.dot_position as usize + 1..] {
      match part.symbol {
        GrammarSymbol::Terminal(t) => {
          out.insert(t);
          break;
        }
        GrammarSymbol::NonTerminal(nt) => {
          let nt = g.non_terminal(nt);
          out.union_with(&nt.first_set);
          if !nt.nullable {
            break;
          }
        }
      }
    }
    out
  }
}
