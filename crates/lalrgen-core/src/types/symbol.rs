use super::{indexed_id_implementations, terminal_set::TerminalSet};
use crate::Array;

/// Index of a [`Terminal`] within [`crate::Grammar`]'s terminal table.
///
/// Index 0 is always the reserved `error` terminal; index 1 is always `EOF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TerminalId(pub u32);
indexed_id_implementations!(TerminalId);

/// Index of a [`NonTerminal`] within [`crate::Grammar`]'s non-terminal table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonTerminalId(pub u32);
indexed_id_implementations!(NonTerminalId);

pub const ERROR_TERMINAL: TerminalId = TerminalId(0);
pub const EOF_TERMINAL: TerminalId = TerminalId(1);

/// A symbol appearing on the right-hand side of a production, or as a
/// grammar's start symbol.
///
/// Ordering places all terminals before all non-terminals, and within a
/// variant orders by index — this is the total order the rest of the crate
/// relies on for deterministic iteration (see the machine construction
/// pass), and it falls out for free from the derive because `Terminal` is
/// declared before `NonTerminal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GrammarSymbol {
  Terminal(TerminalId),
  NonTerminal(NonTerminalId),
}

impl GrammarSymbol {
  pub fn as_terminal(&self) -> Option<TerminalId> {
    match self {
      GrammarSymbol::Terminal(id) => Some(*id),
      _ => None,
    }
  }

  pub fn as_non_terminal(&self) -> Option<NonTerminalId> {
    match self {
      GrammarSymbol::NonTerminal(id) => Some(*id),
      _ => None,
    }
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, GrammarSymbol::Terminal(..))
  }
}

/// Associativity of a terminal's precedence declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Associativity {
  #[default]
  NoPrec,
  Left,
  Right,
  NonAssoc,
}

/// Sentinel precedence level meaning "no precedence declared."
pub const NO_PREC: i32 = -1;

#[derive(Debug, Clone)]
pub struct Terminal {
  pub index: TerminalId,
  pub name: String,
  pub ty: Option<String>,
  pub use_count: u32,
  pub precedence_level: i32,
  pub associativity: Associativity,
}

impl Terminal {
  pub fn new(index: TerminalId, name: impl Into<String>, ty: Option<String>) -> Self {
    Self { index, name: name.into(), ty, use_count: 0, precedence_level: NO_PREC, associativity: Associativity::NoPrec }
  }

  pub fn has_precedence(&self) -> bool {
    self.precedence_level > NO_PREC
  }
}

#[derive(Debug, Clone, Default)]
pub struct NonTerminal {
  pub index: NonTerminalId,
  pub name: String,
  pub ty: Option<String>,
  pub use_count: u32,
  pub nullable_known: bool,
  pub nullable: bool,
  pub first_set: TerminalSet,
  /// Production indices whose `lhs` is this non-terminal, in declaration
  /// order.
  pub productions: Array<u32>,
  pub star_symbol: Option<NonTerminalId>,
  pub plus_symbol: Option<NonTerminalId>,
  pub opt_symbol: Option<NonTerminalId>,
}

impl NonTerminal {
  pub fn new(index: NonTerminalId, name: impl Into<String>, ty: Option<String>) -> Self {
    Self { index, name: name.into(), ty, ..Default::default() }
  }
}
