//! Action/goto table construction and conflict resolution (§4.5).

use crate::{
  error::LalrError,
  types::symbol::{Associativity, GrammarSymbol, NO_PREC},
  Array, LalrErrorKind,
};

const ERROR: i32 = 0;

fn encode_shift(state: usize) -> i32 {
  2 * state as i32 + 1
}

fn encode_reduce(production: u32) -> i32 {
  2 * production as i32 + 2
}

/// Decodes a single action-table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Error,
  Shift(usize),
  Reduce(u32),
}

pub fn decode(cell: i32) -> Action {
  if cell == ERROR {
    Action::Error
  } else if cell % 2 == 1 {
    Action::Shift(((cell - 1) / 2) as usize)
  } else {
    Action::Reduce(((cell - 2) / 2) as u32)
  }
}

impl crate::Grammar {
  /// Populates the action and goto tables from the finished LALR(1)
  /// automaton, resolving shift/reduce and reduce/reduce conflicts per
  /// §4.5. Requires [`Grammar::build_machine`] to have already run.
  pub fn build_tables(&mut self, compact_reduces: bool) -> Result<(), LalrError> {
    let num_states = self.states().len();
    let num_terminals = self.terminal_count();
    let num_non_terminals = self.non_terminal_count();

    let mut action_table: Array<Array<i32>> = vec![vec![ERROR; num_terminals]; num_states];
    let mut goto_table: Array<Array<i32>> = vec![vec![-1; num_non_terminals]; num_states];

    for state_idx in 0..num_states {
      let state_id = crate::types::state::StateId(state_idx as u32);

      // Reduces first, so shifts can detect the conflict when they land on
      // an already-populated cell.
      let complete_items: Vec<_> =
        self.state(state_id).items.iter().map(|(&item, &la_id)| (item, la_id)).filter(|(item, _)| item.is_complete(self)).collect();

      for (item, la_id) in complete_items {
        let production_index = item.production;
        let terminals: Vec<_> = self.lookaheads_of(la_id).iter().collect();
        for terminal in terminals {
          let col = usize::from(terminal);
          let cell = &mut action_table[state_idx][col];
          if *cell == ERROR {
            *cell = encode_reduce(production_index.0);
          } else if let Action::Reduce(existing) = decode(*cell) {
            if existing != production_index.0 {
              let (kept, dropped) = if existing < production_index.0 { (existing, production_index.0) } else { (production_index.0, existing) };
              if kept != existing {
                *cell = encode_reduce(kept);
              }
              self.errors.record(LalrErrorKind::ReduceReduceConflict { state: state_idx as u32, terminal, kept, dropped });
              self.conflict_count += 1;
            }
          }
          // A shift already occupying the cell is handled by the shift pass
          // below (which runs after reduces and decides the winner).
        }
      }

      // Shifts and gotos.
      let transitions: Vec<_> = self.state(state_id).transitions.iter().map(|(&s, &d)| (s, d)).collect();
      for (symbol, dest) in transitions {
        match symbol {
          GrammarSymbol::NonTerminal(nt) => {
            goto_table[state_idx][usize::from(nt)] = i32::from(dest.0);
          }
          GrammarSymbol::Terminal(t) => {
            let col = usize::from(t);
            let cell = &mut action_table[state_idx][col];
            if *cell == ERROR {
              *cell = encode_shift(usize::from(dest.0));
              continue;
            }
            match decode(*cell) {
              Action::Reduce(production_index) => {
                let production = self.production(crate::types::production::ProductionId(production_index));
                let terminal = self.terminal(t);
                if production.precedence_level > NO_PREC && terminal.precedence_level > NO_PREC {
                  if terminal.precedence_level > production.precedence_level {
                    *cell = encode_shift(usize::from(dest.0));
                  } else if terminal.precedence_level < production.precedence_level {
                    // keep the reduce
                  } else {
                    match terminal.associativity {
                      Associativity::Left => { /* keep the reduce */ }
                      Associativity::Right => *cell = encode_shift(usize::from(dest.0)),
                      Associativity::NonAssoc | Associativity::NoPrec => *cell = ERROR,
                    }
                  }
                } else {
                  *cell = encode_shift(usize::from(dest.0));
                  self.errors.record(LalrErrorKind::ShiftReduceConflict { state: state_idx as u32, terminal: t });
                  self.conflict_count += 1;
                }
              }
              Action::Shift(_) | Action::Error => {
                *cell = encode_shift(usize::from(dest.0));
              }
            }
          }
        }
      }
    }

    let empty_rhs: Vec<bool> = self.productions().iter().map(|p| p.rhs.is_empty()).collect();
    let default_actions = if compact_reduces {
      compute_default_actions(&mut action_table, num_terminals, &empty_rhs)
    } else {
      vec![ERROR; num_states]
    };

    self.action_table = action_table;
    self.goto_table = goto_table;
    self.default_actions = default_actions;
    Ok(())
  }

  fn lookaheads_of(&self, id: crate::types::lookaheads::LookaheadId) -> crate::TerminalSet {
    self.lookaheads.get(id).set.clone()
  }

  /// Warns for every production whose `action_index` never appears as a
  /// reduce target in the final action table (§4.5, unreduced-production
  /// check).
  pub fn check_tables(&mut self) {
    use std::collections::HashSet;
    let mut reduced: HashSet<u32> = HashSet::new();
    for row in &self.action_table {
      for &cell in row {
        if let Action::Reduce(p) = decode(cell) {
          reduced.insert(p);
        }
      }
    }
    let unreduced: Vec<u32> =
      self.productions().iter().map(|p| p.index.0).filter(|p| !reduced.contains(p)).collect();
    for production in unreduced {
      self.errors.record(LalrErrorKind::UnreducedProduction { production });
    }
  }
}

/// Chooses a per-row default action and rewrites covered `ERROR` cells to
/// it, per the two caveats in §4.5 step 4: never default to an empty-RHS
/// reduce with coverage below 2, and force the `error`-terminal's reduce
/// (if any) to be the default when present.
fn compute_default_actions(action_table: &mut [Array<i32>], num_terminals: usize, empty_rhs: &[bool]) -> Array<i32> {
  use std::collections::HashMap;
  let error_col = usize::from(crate::types::symbol::ERROR_TERMINAL);
  let mut defaults = vec![ERROR; action_table.len()];

  for (state_idx, row) in action_table.iter_mut().enumerate() {
    if let Action::Reduce(p) = decode(row[error_col]) {
      defaults[state_idx] = encode_reduce(p);
    } else {
      let mut coverage: HashMap<i32, u32> = HashMap::new();
      for &cell in row.iter() {
        if matches!(decode(cell), Action::Reduce(_)) {
          *coverage.entry(cell).or_insert(0) += 1;
        }
      }
      let best = coverage
        .into_iter()
        .filter(|&(value, count)| {
          let Action::Reduce(p) = decode(value) else { unreachable!() };
          !empty_rhs[p as usize] || count >= 2
        })
        .max_by_key(|&(_, count)| count);
      if let Some((value, _)) = best {
        defaults[state_idx] = value;
      }
    }

    let default = defaults[state_idx];
    if default == ERROR {
      continue;
    }
    let default_is_empty_reduce = matches!(decode(default), Action::Reduce(p) if empty_rhs[p as usize]);
    for col in 0..num_terminals {
      if row[col] != ERROR {
        continue;
      }
      if col == error_col && default_is_empty_reduce {
        // Leave the error column untouched: defaulting it to an
        // empty-RHS reduce would loop forever on malformed input.
        continue;
      }
      row[col] = default;
    }
  }

  defaults
}
