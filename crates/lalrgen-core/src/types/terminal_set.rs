use super::symbol::TerminalId;
use bit_vec::BitVec;
use std::hash::{Hash, Hasher};

/// A bitset over the grammar's terminal vocabulary.
///
/// Used both as a plain FIRST-set representation and as the payload of a
/// [`super::lookaheads::Lookaheads`] node.
#[derive(Debug, Clone)]
pub struct TerminalSet {
  bits: BitVec,
}

impl Default for TerminalSet {
  fn default() -> Self {
    Self { bits: BitVec::new() }
  }
}

impl TerminalSet {
  pub fn new(terminal_count: usize) -> Self {
    Self { bits: BitVec::from_elem(terminal_count, false) }
  }

  /// Grows the set to `terminal_count` bits, preserving existing bits. Used
  /// to materialize a `Default`-constructed, zero-length set once the
  /// terminal registry is final (after which its length never changes
  /// again, per the invariant that symbols are only added during the
  /// builder phase).
  pub fn resize(&mut self, terminal_count: usize) {
    if self.bits.len() < terminal_count {
      self.bits.grow(terminal_count - self.bits.len(), false);
    }
  }

  pub fn len(&self) -> usize {
    self.bits.len()
  }

  pub fn is_empty(&self) -> bool {
    !self.bits.any()
  }

  pub fn contains(&self, terminal: TerminalId) -> bool {
    self.bits.get(usize::from(terminal)).unwrap_or(false)
  }

  pub fn insert(&mut self, terminal: TerminalId) -> bool {
    let idx = usize::from(terminal);
    let was_set = self.bits.get(idx).unwrap_or(false);
    self.bits.set(idx, true);
    !was_set
  }

  /// Unions `other` into `self`, returning whether `self` grew as a result.
  pub fn union_with(&mut self, other: &TerminalSet) -> bool {
    let before = self.bits.clone();
    self.bits.or(&other.bits);
    before != self.bits
  }

  pub fn intersects(&self, other: &TerminalSet) -> bool {
    let mut scratch = self.bits.clone();
    scratch.and(&other.bits);
    scratch.any()
  }

  pub fn iter(&self) -> impl Iterator<Item = TerminalId> + '_ {
    self.bits.iter().enumerate().filter_map(|(i, set)| set.then(|| TerminalId(i as u32)))
  }
}

impl PartialEq for TerminalSet {
  fn eq(&self, other: &Self) -> bool {
    self.bits == other.bits
  }
}
impl Eq for TerminalSet {}

impl Hash for TerminalSet {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.bits.blocks().for_each(|b| b.hash(state));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn insert_reports_growth() {
    let mut set = TerminalSet::new(4);
    assert!(set.insert(TerminalId(2)));
    assert!(!set.insert(TerminalId(2)));
    assert!(set.contains(TerminalId(2)));
    assert!(!set.contains(TerminalId(0)));
  }

  #[test]
  fn union_with_reports_growth_only_when_set_changes() {
    let mut a = TerminalSet::new(4);
    let mut b = TerminalSet::new(4);
    b.insert(TerminalId(1));
    assert!(a.union_with(&b));
    assert!(!a.union_with(&b));
  }

  #[test]
  fn intersects_detects_overlap() {
    let mut a = TerminalSet::new(4);
    let mut b = TerminalSet::new(4);
    a.insert(TerminalId(1));
    b.insert(TerminalId(2));
    assert!(!a.intersects(&b));
    b.insert(TerminalId(1));
    assert!(a.intersects(&b));
  }
}
