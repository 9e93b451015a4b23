use super::{
  item::LrItem,
  lookaheads::LookaheadArena,
  production::{ActionProduction, Production, ProductionId, SymbolPart, START_PRODUCTION},
  state::{LalrState, StateId},
  symbol::{Associativity, GrammarSymbol, NonTerminal, NonTerminalId, Terminal, TerminalId, EOF_TERMINAL, ERROR_TERMINAL},
};
use crate::{
  error::{ErrorManager, LalrErrorKind},
  Array, BuildConfig, LalrError, OrderedMap, OrderedSet,
};

/// One element of the sequence passed to [`Grammar::build_production`]: a
/// labeled/unlabeled RHS symbol, or an embedded mid-rule action's code.
#[derive(Debug, Clone)]
pub enum RhsPart {
  Symbol(GrammarSymbol),
  LabeledSymbol(GrammarSymbol, String),
  Action(String),
}

/// The owning root of a grammar under construction and, after `compile`,
/// of its finished LALR(1) tables.
///
/// Holds terminals, non-terminals and productions in dense `Array`s,
/// referenced by index rather than by pointer, so every other component can
/// borrow it for the span of a single call without fighting the borrow
/// checker over a web of `Rc`s.
#[derive(Debug)]
pub struct Grammar {
  pub(crate) terminals: Array<Terminal>,
  pub(crate) non_terminals: Array<NonTerminal>,
  pub(crate) productions: Array<Production>,
  pub(crate) action_productions: Array<ActionProduction>,
  pub(crate) start_non_terminal: Option<NonTerminalId>,
  next_precedence_level: i32,
  next_action_index: i32,
  pub(crate) conflict_count: i64,
  pub errors: ErrorManager,

  pub(crate) states: Array<LalrState>,
  pub(crate) kernel_index: OrderedMap<OrderedSet<LrItem>, StateId>,
  pub(crate) lookaheads: LookaheadArena,
  pub(crate) action_table: Array<Array<i32>>,
  pub(crate) goto_table: Array<Array<i32>>,
  pub(crate) default_actions: Array<i32>,
}

impl Default for Grammar {
  fn default() -> Self {
    Self::new()
  }
}

impl Grammar {
  pub fn new() -> Self {
    let mut g = Self {
      terminals: Array::new(),
      non_terminals: Array::new(),
      productions: Array::new(),
      action_productions: Array::new(),
      start_non_terminal: None,
      next_precedence_level: 0,
      next_action_index: 1,
      conflict_count: 0,
      errors: ErrorManager::new(),
      states: Array::new(),
      kernel_index: OrderedMap::new(),
      lookaheads: LookaheadArena::new(0),
      action_table: Array::new(),
      goto_table: Array::new(),
      default_actions: Array::new(),
    };
    g.terminals.push(Terminal::new(ERROR_TERMINAL, "error", None));
    g.terminals.push(Terminal::new(EOF_TERMINAL, "$EOF", None));
    g
  }

  pub fn terminal_count(&self) -> usize {
    self.terminals.len()
  }

  pub fn non_terminal_count(&self) -> usize {
    self.non_terminals.len()
  }

  pub fn production_count(&self) -> usize {
    self.productions.len()
  }

  pub fn terminal(&self, id: TerminalId) -> &Terminal {
    &self.terminals[usize::from(id)]
  }

  pub fn non_terminal(&self, id: NonTerminalId) -> &NonTerminal {
    &self.non_terminals[usize::from(id)]
  }

  pub fn non_terminal_mut(&mut self, id: NonTerminalId) -> &mut NonTerminal {
    &mut self.non_terminals[usize::from(id)]
  }

  pub fn production(&self, id: ProductionId) -> &Production {
    &self.productions[usize::from(id)]
  }

  pub fn production_mut(&mut self, id: ProductionId) -> &mut Production {
    &mut self.productions[usize::from(id)]
  }

  pub fn productions(&self) -> &[Production] {
    &self.productions
  }

  pub fn symbol_name(&self, symbol: GrammarSymbol) -> &str {
    match symbol {
      GrammarSymbol::Terminal(t) => &self.terminal(t).name,
      GrammarSymbol::NonTerminal(nt) => &self.non_terminal(nt).name,
    }
  }

  // ---- symbol registry -------------------------------------------------

  pub fn add_terminal(&mut self, name: impl Into<String>, ty: Option<String>) -> TerminalId {
    let id = TerminalId(self.terminals.len() as u32);
    self.terminals.push(Terminal::new(id, name, ty));
    id
  }

  pub fn add_non_terminal(&mut self, name: impl Into<String>, ty: Option<String>) -> NonTerminalId {
    let id = NonTerminalId(self.non_terminals.len() as u32);
    self.non_terminals.push(NonTerminal::new(id, name, ty));
    id
  }

  pub fn set_precedence_group(&mut self, terminals: &[TerminalId], associativity: Associativity) {
    let level = self.next_precedence_level;
    self.next_precedence_level += 1;
    for &t in terminals {
      let terminal = &mut self.terminals[usize::from(t)];
      terminal.precedence_level = level;
      terminal.associativity = associativity;
    }
  }

  pub fn set_start_symbol(&mut self, nt: NonTerminalId) -> Result<(), LalrError> {
    if self.start_non_terminal.is_some() {
      return Err(LalrErrorKind::InvariantViolation { message: "start symbol already set".into() }.into());
    }
    self.start_non_terminal = Some(nt);
    let start_id = self.add_non_terminal("$START", None);
    let rhs = vec![SymbolPart::new(GrammarSymbol::NonTerminal(nt)), SymbolPart::new(GrammarSymbol::Terminal(EOF_TERMINAL))];
    let mut production = Production::new(START_PRODUCTION, start_id, rhs, None);
    production.action_index = 0;
    self.productions.push(production);
    self.non_terminals[usize::from(start_id)].productions.push(0);
    self.non_terminals[usize::from(nt)].use_count += 1;
    Ok(())
  }

  pub fn start_production(&self) -> ProductionId {
    START_PRODUCTION
  }

  pub fn start_non_terminal(&self) -> Option<NonTerminalId> {
    self.start_non_terminal
  }

  // ---- EBNF wildcard symbols --------------------------------------------

  pub fn get_opt_symbol(&mut self, base: GrammarSymbol) -> NonTerminalId {
    if let Some(existing) = self.wildcard_of(base, WildcardKind::Opt) {
      return existing;
    }
    let ty = self.symbol_type(base);
    let name = format!("{}$opt", self.symbol_name(base));
    let nt = self.add_non_terminal(name, ty);
    self.set_wildcard_of(base, WildcardKind::Opt, nt);
    nt
  }

  pub fn get_plus_symbol(&mut self, base: GrammarSymbol) -> NonTerminalId {
    if let Some(existing) = self.wildcard_of(base, WildcardKind::Plus) {
      return existing;
    }
    let ty = self.symbol_type(base).map(|t| format!("{t}[]")).or(Some("[]".to_string()));
    let name = format!("{}$plus", self.symbol_name(base));
    let nt = self.add_non_terminal(name, ty);
    self.set_wildcard_of(base, WildcardKind::Plus, nt);
    nt
  }

  pub fn get_star_symbol(&mut self, base: GrammarSymbol) -> NonTerminalId {
    if let Some(existing) = self.wildcard_of(base, WildcardKind::Star) {
      return existing;
    }
    // Ensure the backing `plus` symbol exists; `star` is built in terms of it.
    self.get_plus_symbol(base);
    let ty = self.symbol_type(base).map(|t| format!("{t}[]")).or(Some("[]".to_string()));
    let name = format!("{}$star", self.symbol_name(base));
    let nt = self.add_non_terminal(name, ty);
    self.set_wildcard_of(base, WildcardKind::Star, nt);
    nt
  }

  fn symbol_type(&self, symbol: GrammarSymbol) -> Option<String> {
    match symbol {
      GrammarSymbol::Terminal(t) => self.terminal(t).ty.clone(),
      GrammarSymbol::NonTerminal(nt) => self.non_terminal(nt).ty.clone(),
    }
  }

  fn wildcard_of(&self, base: GrammarSymbol, kind: WildcardKind) -> Option<NonTerminalId> {
    let GrammarSymbol::NonTerminal(base_nt) = base else { return None };
    let nt = self.non_terminal(base_nt);
    match kind {
      WildcardKind::Opt => nt.opt_symbol,
      WildcardKind::Plus => nt.plus_symbol,
      WildcardKind::Star => nt.star_symbol,
    }
  }

  fn set_wildcard_of(&mut self, base: GrammarSymbol, kind: WildcardKind, value: NonTerminalId) {
    let GrammarSymbol::NonTerminal(base_nt) = base else { return };
    let nt = self.non_terminal_mut(base_nt);
    match kind {
      WildcardKind::Opt => nt.opt_symbol = Some(value),
      WildcardKind::Plus => nt.plus_symbol = Some(value),
      WildcardKind::Star => nt.star_symbol = Some(value),
    }
  }

  /// Emits the backing productions for every `opt`/`plus`/`star` symbol
  /// created so far via `get_*_symbol`. Idempotent would require tracking
  /// which symbols already have backing productions; callers are expected
  /// to invoke this exactly once, after all `get_*_symbol` calls and before
  /// `compile`, per the builder-phase/analysis-phase split the rest of the
  /// pipeline assumes.
  pub fn expand_wildcard_rules(&mut self) -> Result<(), LalrError> {
    for nt in self.non_terminals.clone().iter() {
      let base_symbol = GrammarSymbol::NonTerminal(nt.index);
      if let Some(plus) = nt.plus_symbol {
        // plus(X) ::= X | plus(X) X
        self.build_production(plus, vec![RhsPart::Symbol(base_symbol)], None, Some("STAR1".into()))?;
        self.build_production(
          plus,
          vec![RhsPart::Symbol(GrammarSymbol::NonTerminal(plus)), RhsPart::Symbol(base_symbol)],
          None,
          Some("STAR2".into()),
        )?;
      }
      if let Some(star) = nt.star_symbol {
        let plus = nt.plus_symbol.expect("star symbol always creates its backing plus symbol");
        // star(X) ::= ε | plus(X)
        self.build_production(star, vec![], None, Some("STAR0".into()))?;
        self.build_production(star, vec![RhsPart::Symbol(GrammarSymbol::NonTerminal(plus))], None, None)?;
      }
      if let Some(opt) = nt.opt_symbol {
        // opt(X) ::= ε | X
        self.build_production(opt, vec![], None, Some("STAR0".into()))?;
        self.build_production(opt, vec![RhsPart::Symbol(base_symbol)], None, None)?;
      }
    }
    Ok(())
  }

  // ---- production builder ------------------------------------------------

  /// Builds a production from a mixed sequence of symbols and embedded
  /// actions, per §4.1: merges adjacent action parts, strips a trailing
  /// action as the production's own, factors any remaining mid-rule action
  /// into a synthesized `NT$k` non-terminal, resolves precedence, and
  /// deduplicates the `action_index` against existing productions of the
  /// same `lhs`.
  pub fn build_production(
    &mut self,
    lhs: NonTerminalId,
    parts: Vec<RhsPart>,
    explicit_prec: Option<TerminalId>,
    action_tag: Option<String>,
  ) -> Result<ProductionId, LalrError> {
    let merged = merge_adjacent_actions(parts);
    let (mut rhs_parts, trailing_action) = split_trailing_action(merged);
    let action = action_tag.or(trailing_action);

    let action_productions_start = self.action_productions.len();
    let mut rhs = Array::new();
    for part in rhs_parts.drain(..) {
      match part {
        RhsPart::Action(code) => {
          // Mid-rule action: factor into a synthesized non-terminal.
          let host_ty = self.non_terminal(lhs).ty.clone();
          let anon_name = format!("{}$k{}", self.non_terminal(lhs).name, self.productions.len());
          let anon_nt = self.add_non_terminal(anon_name, host_ty);
          let action_production_index = ProductionId(self.productions.len() as u32);
          let mut production = Production::new(action_production_index, anon_nt, Array::new(), Some(code));
          production.action_index = self.next_action_index;
          self.next_action_index += 1;
          self.productions.push(production);
          self.non_terminals[usize::from(anon_nt)].productions.push(action_production_index.0);
          self.action_productions.push(ActionProduction {
            production: action_production_index,
            base_production: START_PRODUCTION, // patched below once the base production's index is known
            action_rhs_position: rhs.len(),
          });
          rhs.push(SymbolPart::new(GrammarSymbol::NonTerminal(anon_nt)));
          self.bump_use_count(GrammarSymbol::NonTerminal(anon_nt));
        }
        RhsPart::Symbol(symbol) => {
          self.check_symbol_declared(lhs, symbol, rhs.len())?;
          self.bump_use_count(symbol);
          rhs.push(SymbolPart::new(symbol));
        }
        RhsPart::LabeledSymbol(symbol, label) => {
          self.check_symbol_declared(lhs, symbol, rhs.len())?;
          self.bump_use_count(symbol);
          rhs.push(SymbolPart::labeled(symbol, label));
        }
      }
    }

    let production_index = ProductionId(self.productions.len() as u32);
    let mut production = Production::new(production_index, lhs, rhs, action);
    if let Some(last_action) = self.action_productions[action_productions_start..].last() {
      production.index_of_intermediate_result = last_action.action_rhs_position as i32;
    }
    self.resolve_precedence(&mut production, explicit_prec)?;

    for ap in &mut self.action_productions[action_productions_start..] {
      ap.base_production = production_index;
    }

    if production.is_proxy() {
      production.action_index = -1;
    } else if let Some(sibling) = self.find_dedup_candidate(&production) {
      production.action_index = sibling;
    } else {
      production.action_index = self.next_action_index;
      self.next_action_index += 1;
    }

    self.productions.push(production);
    self.non_terminals[usize::from(lhs)].productions.push(production_index.0);
    Ok(production_index)
  }

  fn check_symbol_declared(&mut self, lhs: NonTerminalId, symbol: GrammarSymbol, rhs_position: usize) -> Result<(), LalrError> {
    let in_bounds = match symbol {
      GrammarSymbol::Terminal(t) => usize::from(t) < self.terminals.len(),
      GrammarSymbol::NonTerminal(nt) => usize::from(nt) < self.non_terminals.len(),
    };
    if !in_bounds {
      // See DESIGN.md: rejecting outright rather than admitting a null
      // placeholder that could reach the LALR machine.
      return Err(LalrErrorKind::UndeclaredSymbol { lhs, rhs_position }.into());
    }
    Ok(())
  }

  fn bump_use_count(&mut self, symbol: GrammarSymbol) {
    match symbol {
      GrammarSymbol::Terminal(t) => self.terminals[usize::from(t)].use_count += 1,
      GrammarSymbol::NonTerminal(nt) => self.non_terminals[usize::from(nt)].use_count += 1,
    }
  }

  fn resolve_precedence(&mut self, production: &mut Production, explicit_prec: Option<TerminalId>) -> Result<(), LalrError> {
    if let Some(t) = explicit_prec {
      let terminal = self.terminal(t);
      production.precedence_level = terminal.precedence_level;
      production.associativity = terminal.associativity;
      return Ok(());
    }
    let mut found: Option<TerminalId> = None;
    for part in production.rhs.iter().rev() {
      if let GrammarSymbol::Terminal(t) = part.symbol {
        if self.terminal(t).has_precedence() {
          if let Some(prior) = found {
            if prior != t {
              self.errors.record(LalrErrorKind::MultiplePrecedenceSources { lhs: production.lhs });
            }
          }
          found = Some(t);
        }
      }
    }
    if let Some(t) = found {
      let terminal = self.terminal(t);
      production.precedence_level = terminal.precedence_level;
      production.associativity = terminal.associativity;
    }
    Ok(())
  }

  fn find_dedup_candidate(&self, production: &Production) -> Option<i32> {
    for &other_idx in &self.non_terminals[usize::from(production.lhs)].productions {
      let other = &self.productions[other_idx as usize];
      if other.has_same_signature(production) && other.action_index >= 0 {
        return Some(other.action_index);
      }
    }
    None
  }

  // ---- end-to-end driver --------------------------------------------------

  /// Runs the full analysis/construction pipeline: nullability, FIRST,
  /// LALR(1) machine, tables, and the post-build unreduced-production
  /// check. Bails out on the first fatal error; non-fatal diagnostics
  /// accumulate in `self.errors` for the caller to inspect afterward.
  pub fn compile(&mut self, config: BuildConfig) -> Result<(), LalrError> {
    self.compute_nullability();
    self.compute_firsts();
    self.build_machine()?;
    self.build_tables(config.compact_reduces)?;
    self.check_tables();
    if !config.expectation_disabled() && self.conflict_count != config.expect {
      return Err(
        LalrErrorKind::ConflictExpectationMismatch { expected: config.expect, actual: self.conflict_count }.into(),
      );
    }
    Ok(())
  }

  pub fn conflict_count(&self) -> i64 {
    self.conflict_count
  }

  pub fn states(&self) -> &[LalrState] {
    &self.states
  }

  pub fn state(&self, id: StateId) -> &LalrState {
    &self.states[usize::from(id)]
  }

  pub fn action_table(&self) -> &[Array<i32>] {
    &self.action_table
  }

  pub fn goto_table(&self) -> &[Array<i32>] {
    &self.goto_table
  }

  pub fn default_actions(&self) -> &[i32] {
    &self.default_actions
  }

  /// Compresses the action table against the per-state defaults chosen
  /// during `build_tables` (all-`ERROR` if `compact_reduces` was off).
  pub fn compressed_action_table(&self) -> crate::compress::CompressedTable {
    crate::compress::compress_rows(&self.action_table, &self.default_actions)
  }

  /// Compresses the goto table. Gotos have no row-level default action to
  /// compact against, so every row defaults to `-1` ("no goto").
  pub fn compressed_goto_table(&self) -> crate::compress::CompressedTable {
    let defaults = vec![-1; self.goto_table.len()];
    crate::compress::compress_rows(&self.goto_table, &defaults)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WildcardKind {
  Opt,
  Plus,
  Star,
}

fn merge_adjacent_actions(parts: Vec<RhsPart>) -> Vec<RhsPart> {
  let mut out: Vec<RhsPart> = Vec::with_capacity(parts.len());
  for part in parts {
    match (out.last_mut(), &part) {
      (Some(RhsPart::Action(prev)), RhsPart::Action(next)) => {
        prev.push_str(next);
      }
      _ => out.push(part),
    }
  }
  out
}

fn split_trailing_action(mut parts: Vec<RhsPart>) -> (Vec<RhsPart>, Option<String>) {
  if let Some(RhsPart::Action(_)) = parts.last() {
    if let Some(RhsPart::Action(code)) = parts.pop() {
      return (parts, Some(code));
    }
  }
  (parts, None)
}
