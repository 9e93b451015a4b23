//! Grammar analysis and LALR(1) table construction.
//!
//! Consumes a context-free grammar (built through the [`types::grammar::Grammar`]
//! builder API) and produces a compressed, deterministic set of action and
//! goto tables suitable for driving a shift-reduce parser.

pub mod compress;
pub mod config;
pub mod error;
pub mod machine;
pub mod tables;
pub mod types;

mod analyzer;

pub use config::BuildConfig;
pub use error::{ErrorManager, LalrError, LalrErrorKind};
pub use types::grammar::{Grammar, RhsPart};
pub use tables::{decode, Action};
pub use types::item::LrItem;
pub use types::production::{ActionProduction, Production, ProductionId, SymbolPart};
pub use types::state::{LalrState, StateId};
pub use types::symbol::{Associativity, GrammarSymbol, NonTerminal, NonTerminalId, Terminal, TerminalId};
pub use types::terminal_set::TerminalSet;

/// General purpose ordered sequence; mirrors how the rest of the crate names
/// its container aliases.
pub type Array<T> = Vec<T>;
/// Deterministic-order map, used wherever iteration order feeds into the
/// tables (see the determinism guarantees in the machine construction pass).
pub type OrderedMap<K, V> = std::collections::BTreeMap<K, V>;
/// Deterministic-order set, same rationale as [`OrderedMap`].
pub type OrderedSet<T> = std::collections::BTreeSet<T>;
