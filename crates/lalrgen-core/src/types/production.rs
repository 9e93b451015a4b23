use super::{
  indexed_id_implementations,
  symbol::{Associativity, GrammarSymbol, NonTerminalId, NO_PREC},
};
use crate::Array;

/// Index of a [`Production`] within [`crate::Grammar`]'s production table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductionId(pub u32);
indexed_id_implementations!(ProductionId);

/// Production id reserved for the synthesized `$START ::= start_symbol EOF`
/// production every grammar is given.
pub const START_PRODUCTION: ProductionId = ProductionId(0);

/// A single element of a production's right-hand side.
#[derive(Debug, Clone)]
pub struct SymbolPart {
  pub symbol: GrammarSymbol,
  pub label: Option<String>,
}

impl SymbolPart {
  pub fn new(symbol: GrammarSymbol) -> Self {
    Self { symbol, label: None }
  }

  pub fn labeled(symbol: GrammarSymbol, label: impl Into<String>) -> Self {
    Self { symbol, label: Some(label.into()) }
  }

  /// Structural equality used for action-index deduplication: same symbol,
  /// same label. Deliberately ignores nothing — a differing label changes
  /// the emitted binding and therefore the production's identity.
  fn same_signature(&self, other: &SymbolPart) -> bool {
    self.symbol == other.symbol && self.label == other.label
  }
}

/// One grammar rule: `lhs ::= rhs`, with an optional semantic action.
#[derive(Debug, Clone)]
pub struct Production {
  pub index: ProductionId,
  /// Shared by structurally identical productions carrying the same action
  /// code; `-1` for proxy productions (no action, single-symbol RHS).
  pub action_index: i32,
  pub lhs: NonTerminalId,
  pub rhs: Array<SymbolPart>,
  pub action: Option<String>,
  pub precedence_level: i32,
  pub associativity: Associativity,
  pub nullable_known: bool,
  pub nullable: bool,
  /// Position within `rhs` of the most recent mid-rule action that was
  /// factored out into an [`ActionProduction`], or `-1` if none.
  pub index_of_intermediate_result: i32,
}

impl Production {
  pub fn new(index: ProductionId, lhs: NonTerminalId, rhs: Array<SymbolPart>, action: Option<String>) -> Self {
    Self {
      index,
      action_index: 0,
      lhs,
      rhs,
      action,
      precedence_level: NO_PREC,
      associativity: Associativity::NoPrec,
      nullable_known: false,
      nullable: false,
      index_of_intermediate_result: -1,
    }
  }

  pub fn is_proxy(&self) -> bool {
    self.rhs.len() == 1 && self.action.is_none()
  }

  pub fn has_same_signature(&self, other: &Production) -> bool {
    self.lhs == other.lhs
      && self.rhs.len() == other.rhs.len()
      && self.rhs.iter().zip(other.rhs.iter()).all(|(a, b)| a.same_signature(b))
      && self.action == other.action
  }
}

/// A production synthesized to host a factored-out mid-rule action.
///
/// Its RHS is always empty: it exists purely so the emitter has a reduction
/// point at which to run the embedded action code, at the RHS position the
/// action originally occupied in `base_production`.
#[derive(Debug, Clone)]
pub struct ActionProduction {
  pub production: ProductionId,
  pub base_production: ProductionId,
  pub action_rhs_position: usize,
}
