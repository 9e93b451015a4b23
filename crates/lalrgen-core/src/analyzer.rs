//! Nullability and FIRST-set fixpoints (§4.2).

use crate::types::{grammar::Grammar, symbol::GrammarSymbol};

impl Grammar {
  /// Computes, for every non-terminal, whether it can derive the empty
  /// string. Idempotent: a second call is a cheap no-op pass that reaches
  /// the same fixpoint immediately.
  pub fn compute_nullability(&mut self) {
    let mut changed = true;
    while changed {
      changed = false;
      for production in &mut self.productions {
        if production.nullable {
          continue;
        }
        let nullable = production.rhs.iter().all(|part| match part.symbol {
          GrammarSymbol::Terminal(_) => false,
          GrammarSymbol::NonTerminal(nt) => self.non_terminals[usize::from(nt)].nullable,
        });
        if nullable {
          production.nullable = true;
          production.nullable_known = true;
          let nt = &mut self.non_terminals[usize::from(production.lhs)];
          if !nt.nullable {
            nt.nullable = true;
            changed = true;
          }
        }
      }
    }
    for production in &mut self.productions {
      production.nullable_known = true;
    }
  }

  /// Computes FIRST sets for every non-terminal. Requires
  /// [`Grammar::compute_nullability`] to have already run.
  pub fn compute_firsts(&mut self) {
    let terminal_count = self.terminal_count();
    for nt in &mut self.non_terminals {
      nt.first_set.resize(terminal_count);
    }

    let mut changed = true;
    while changed {
      changed = false;
      for production in &self.productions {
        let mut addition = self.non_terminals[usize::from(production.lhs)].first_set.clone();
        let before = addition.clone();
        for part in &production.rhs {
          match part.symbol {
            GrammarSymbol::Terminal(t) => {
              addition.insert(t);
              break;
            }
            GrammarSymbol::NonTerminal(nt) => {
              let nt = &self.non_terminals[usize::from(nt)];
              addition.union_with(&nt.first_set);
              if !nt.nullable {
                break;
              }
            }
          }
        }
        if addition != before {
          self.non_terminals[usize::from(production.lhs)].first_set = addition;
          changed = true;
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::{types::grammar::RhsPart, Grammar};

  // A ::= 'a' B | ; B ::= 'b' ;
  fn build_nullable_grammar() -> Grammar {
    let mut g = Grammar::new();
    let a_sym = g.add_terminal("a", None);
    let b_sym = g.add_terminal("b", None);
    let a = g.add_non_terminal("A", None);
    let b = g.add_non_terminal("B", None);
    g.build_production(a, vec![RhsPart::Symbol(crate::GrammarSymbol::Terminal(a_sym)), RhsPart::Symbol(crate::GrammarSymbol::NonTerminal(b))], None, None).unwrap();
    g.build_production(a, vec![], None, None).unwrap();
    g.build_production(b, vec![RhsPart::Symbol(crate::GrammarSymbol::Terminal(b_sym))], None, None).unwrap();
    g
  }

  #[test]
  fn nullability_follows_epsilon_productions() {
    let mut g = build_nullable_grammar();
    g.compute_nullability();
    let a = crate::NonTerminalId(g.non_terminal_count() as u32 - 2);
    let b = crate::NonTerminalId(g.non_terminal_count() as u32 - 1);
    assert!(g.non_terminal(a).nullable);
    assert!(!g.non_terminal(b).nullable);
  }

  #[test]
  fn first_set_includes_rhs_terminal_and_follow_through_nullable_lead() {
    let mut g = build_nullable_grammar();
    g.compute_nullability();
    g.compute_firsts();
    let a = crate::NonTerminalId(g.non_terminal_count() as u32 - 2);
    let first_a = &g.non_terminal(a).first_set;
    assert!(first_a.contains(crate::TerminalId(2))); // 'a'
  }
}
