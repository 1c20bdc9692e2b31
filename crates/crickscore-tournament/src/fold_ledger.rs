//! Fold ledger: prevents a match from entering the points table twice.
//!
//! Every completed league match is folded into the standings exactly once.
//! The ledger keeps the ids in fold order so a table can be audited or
//! rebuilt from the same match set. Unlike a settlement cache it never
//! evicts: a tournament's match set is small and must stay complete.

use std::collections::HashSet;

use crickscore_types::MatchId;

/// Set of folded match ids, with insertion order preserved.
#[derive(Debug, Clone, Default)]
pub struct FoldLedger {
    folded: HashSet<MatchId>,
    order: Vec<MatchId>,
}

impl FoldLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `match_id` as folded. Returns `false` (and changes nothing)
    /// if it was already present.
    pub fn mark_folded(&mut self, match_id: MatchId) -> bool {
        if !self.folded.insert(match_id) {
            return false;
        }
        self.order.push(match_id);
        true
    }

    #[must_use]
    pub fn is_folded(&self, match_id: &MatchId) -> bool {
        self.folded.contains(match_id)
    }

    /// Folded ids, oldest first.
    #[must_use]
    pub fn folded(&self) -> &[MatchId] {
        &self.order
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
