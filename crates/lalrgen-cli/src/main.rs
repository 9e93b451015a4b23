//! Drives [`lalrgen_core`] end to end from a minimal, non-normative text
//! format and reports table statistics. This binary carries no grammar
//! analysis logic of its own.
//!
//! Grammar text format (one declaration per line):
//!
//! ```text
//! token IF
//! token ELSE
//! left PLUS TIMES
//! start S
//! S -> IF E ELSE S
//! S -> IF E
//! E -> S
//! ```

use clap::Parser;
use lalrgen_core::{Associativity, BuildConfig, Grammar, GrammarSymbol, RhsPart};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lalrgen", about = "Builds LALR(1) tables from a grammar text file")]
struct Args {
  /// Path to a grammar file in the line-oriented format documented on `main.rs`.
  grammar: PathBuf,

  /// Prefer a smaller default-reduce table over a faster decode path.
  #[arg(long)]
  compact_reduces: bool,

  /// Fail if the number of unresolved conflicts exceeds this count.
  #[arg(long, default_value_t = -1)]
  expect: i64,
}

fn main() {
  env_logger::init();
  let args = Args::parse();

  let source = match std::fs::read_to_string(&args.grammar) {
    Ok(s) => s,
    Err(e) => {
      eprintln!("failed to read {}: {e}", args.grammar.display());
      std::process::exit(1);
    }
  };

  let mut g = Grammar::new();
  let mut terminals: HashMap<String, GrammarSymbol> = HashMap::new();
  let mut non_terminals: HashMap<String, GrammarSymbol> = HashMap::new();
  let mut start: Option<String> = None;
  let mut rules: Vec<(String, Vec<String>)> = Vec::new();

  for (lineno, raw) in source.lines().enumerate() {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
      ["token", name] => {
        let id = g.add_terminal(*name, None);
        terminals.insert(name.to_string(), GrammarSymbol::Terminal(id));
      }
      ["left", names @ ..] | ["right", names @ ..] | ["nonassoc", names @ ..] => {
        let assoc = match words[0] {
          "left" => Associativity::Left,
          "right" => Associativity::Right,
          _ => Associativity::NonAssoc,
        };
        let ids: Vec<_> = names
          .iter()
          .map(|n| match terminals.get(*n) {
            Some(GrammarSymbol::Terminal(t)) => *t,
            _ => {
              eprintln!("line {}: unknown terminal {n} in precedence group", lineno + 1);
              std::process::exit(1);
            }
          })
          .collect();
        g.set_precedence_group(&ids, assoc);
      }
      ["start", name] => start = Some(name.to_string()),
      [lhs, "->", rhs @ ..] => {
        rules.push((lhs.to_string(), rhs.iter().map(|s| s.to_string()).collect()));
      }
      _ => {
        eprintln!("line {}: unrecognized declaration: {line}", lineno + 1);
        std::process::exit(1);
      }
    }
  }

  for (lhs, _) in &rules {
    non_terminals.entry(lhs.clone()).or_insert_with(|| GrammarSymbol::NonTerminal(g.add_non_terminal(lhs.clone(), None)));
  }

  let resolve = |g: &mut Grammar, name: &str, non_terminals: &mut HashMap<String, GrammarSymbol>| -> GrammarSymbol {
    if let Some(sym) = terminals.get(name) {
      return *sym;
    }
    *non_terminals.entry(name.to_string()).or_insert_with(|| GrammarSymbol::NonTerminal(g.add_non_terminal(name.to_string(), None)))
  };

  for (lhs, rhs) in &rules {
    let lhs_sym = *non_terminals.get(lhs).unwrap();
    let GrammarSymbol::NonTerminal(lhs_id) = lhs_sym else { unreachable!() };
    let parts: Vec<RhsPart> = rhs.iter().map(|name| RhsPart::Symbol(resolve(&mut g, name, &mut non_terminals))).collect();
    if let Err(e) = g.build_production(lhs_id, parts, None, None) {
      eprintln!("error building production {lhs} -> {}: {e}", rhs.join(" "));
      std::process::exit(1);
    }
  }

  let Some(start_name) = start else {
    eprintln!("grammar file declares no start symbol");
    std::process::exit(1);
  };
  let GrammarSymbol::NonTerminal(start_id) = resolve(&mut g, &start_name, &mut non_terminals) else {
    eprintln!("start symbol {start_name} resolved to a terminal");
    std::process::exit(1);
  };
  if let Err(e) = g.set_start_symbol(start_id) {
    eprintln!("failed to set start symbol: {e}");
    std::process::exit(1);
  }

  let config = BuildConfig::new().compact_reduces(args.compact_reduces).expect(args.expect);
  if let Err(e) = g.compile(config) {
    eprintln!("grammar build failed: {e}");
    std::process::exit(1);
  }

  println!("states:      {}", g.states().len());
  println!("productions: {}", g.production_count());
  println!("conflicts:   {}", g.conflict_count());
  for warning in g.errors.warnings() {
    println!("warning: {warning}");
  }
}
