use crate::types::symbol::{NonTerminalId, TerminalId};
use thiserror::Error;

/// The seven diagnostic kinds the analysis pipeline can produce.
///
/// Variants that carry `severity::Warning` accumulate in an [`ErrorManager`]
/// and never stop the pipeline by themselves; `severity::Fatal` variants are
/// returned directly from the call that detected them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LalrErrorKind {
  #[error("undeclared symbol at position {rhs_position} of production for non-terminal {lhs:?}")]
  UndeclaredSymbol { lhs: NonTerminalId, rhs_position: usize },

  #[error("production for non-terminal {lhs:?} declares precedence more than once")]
  MultiplePrecedenceSources { lhs: NonTerminalId },

  #[error("reduce/reduce conflict in state {state} on terminal {terminal:?}: production {kept} kept over {dropped}")]
  ReduceReduceConflict { state: u32, terminal: TerminalId, kept: u32, dropped: u32 },

  #[error("unresolved shift/reduce conflict in state {state} on terminal {terminal:?}: resolved to shift")]
  ShiftReduceConflict { state: u32, terminal: TerminalId },

  #[error("production {production} is never reduced to by any table entry")]
  UnreducedProduction { production: u32 },

  #[error("conflict count {actual} does not match expected count {expected}")]
  ConflictExpectationMismatch { expected: i64, actual: i64 },

  #[error("internal invariant violated: {message}")]
  InvariantViolation { message: String },
}

/// Severity classification used by [`ErrorManager`] to decide whether a
/// diagnostic halts the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
  Warning,
  Error,
  Fatal,
}

impl LalrErrorKind {
  pub fn severity(&self) -> Severity {
    use LalrErrorKind::*;
    match self {
      UndeclaredSymbol { .. } => Severity::Fatal,
      MultiplePrecedenceSources { .. } => Severity::Error,
      ReduceReduceConflict { .. } => Severity::Error,
      ShiftReduceConflict { .. } => Severity::Warning,
      UnreducedProduction { .. } => Severity::Warning,
      ConflictExpectationMismatch { .. } => Severity::Fatal,
      InvariantViolation { .. } => Severity::Fatal,
    }
  }
}

/// Top-level error type returned by fallible driver calls.
///
/// Wraps a single [`LalrErrorKind`]; non-fatal diagnostics of the same kinds
/// are instead recorded into an [`ErrorManager`] and inspected after the
/// fact, mirroring the distinction the rest of the pipeline draws between
/// "stop now" and "keep going, but remember this."
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(transparent)]
pub struct LalrError(#[from] pub LalrErrorKind);

/// Accumulates non-fatal diagnostics over the lifetime of a single grammar
/// compilation. Owned by [`crate::Grammar`] and threaded by `&mut` reference;
/// it is never a global or `static` — each `Grammar` carries its own, so
/// independent grammars compiled on independent threads never share state.
#[derive(Debug, Default, Clone)]
pub struct ErrorManager {
  warnings: Vec<LalrErrorKind>,
  errors: Vec<LalrErrorKind>,
}

impl ErrorManager {
  pub fn new() -> Self {
    Self::default()
  }

  /// Records a diagnostic, routing it to the warning or error bucket by its
  /// own [`Severity`]. Fatal kinds should not be passed here — return them
  /// directly as an `Err` instead.
  pub fn record(&mut self, kind: LalrErrorKind) {
    match kind.severity() {
      Severity::Warning => {
        log::warn!("{kind}");
        self.warnings.push(kind);
      }
      Severity::Error | Severity::Fatal => {
        log::error!("{kind}");
        self.errors.push(kind);
      }
    }
  }

  pub fn warnings(&self) -> &[LalrErrorKind] {
    &self.warnings
  }

  pub fn errors(&self) -> &[LalrErrorKind] {
    &self.errors
  }

  pub fn has_errors(&self) -> bool {
    !self.errors.is_empty()
  }

  pub fn conflict_count(&self) -> i64 {
    self
      .errors
      .iter()
      .chain(self.warnings.iter())
      .filter(|k| matches!(k, LalrErrorKind::ReduceReduceConflict { .. } | LalrErrorKind::ShiftReduceConflict { .. }))
      .count() as i64
  }
}
