//! Append-only log of state changes, used for exact rollback. The record
//! kind is a small closed set, modelled as a tagged variant with a payload
//! rather than an untyped tag/data pair.

use crate::direction::Direction;
use crate::PointId;

/// One atomic change [`crate::state::State::step`] can make. A single `step()`
/// call produces one or more of these, grouped together as one user-level
/// half-move (see [`History::push_group`]).
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Change {
    /// An edge was drawn from `from` to `to` in direction `dir`; `bounced`
    /// records whether `to` was already touched (so the turn didn't pass).
    /// `touched` is every `(point, previous_mask)` the draw wrote to (the
    /// primary edge plus, under the advanced ruleset, `mark_diag`/`mark_occupied`
    /// side effects), in write order, so rollback can restore them exactly.
    Move { from: PointId, dir: Direction, to: PointId, bounced: bool, touched: Vec<(PointId, u8)> },
    /// The active player flipped (basic ruleset turn-pass, or an advanced-ruleset
    /// 3-leg sequence closing with a legal reply available).
    ActiveFlip,
    /// The ball crossed a goal line; `previous_ball` is where it was before.
    BallTeleport { previous_ball: PointId },
    /// First leg of an advanced-ruleset 3-leg sequence.
    FirstLeg { dir: Direction },
    /// Second leg of an advanced-ruleset 3-leg sequence.
    SecondLeg { dir: Direction },
    /// Third leg closed the sequence; carries the pre-closure step1/step2/step12
    /// so rollback can restore them exactly.
    ThirdLegClose { prev_step1: Option<Direction>, prev_step2: Option<Direction>, prev_step12: u64 },
    /// A free kick was taken (advanced ruleset, no ordinary move available).
    FreeKick { dir: Direction, from: PointId, to: PointId },
}

/// An append-only, grouped log of [`Change`]s. Each group is the set of
/// changes produced by one user-level half-move (one `step()`/free-kick call),
/// and is the unit [`History::undo_last_group`] reverts.
#[derive(Clone, Debug, Default)]
pub struct History {
    entries: Vec<Change>,
    group_lens: Vec<usize>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed half-move groups recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.group_lens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.group_lens.is_empty()
    }

    /// Append one user-level half-move's changes as a single group.
    ///
    /// Capacity grows geometrically (`2*capacity + 128`) so amortised push is
    /// O(1); `Vec` already does this for us, so this is mostly documentation
    /// of the chosen growth policy — we reserve explicitly to make the
    /// amortised bound observable in tests.
    pub fn push_group(&mut self, changes: Vec<Change>) {
        if self.entries.len() + changes.len() > self.entries.capacity() {
            let new_cap = 2 * self.entries.capacity() + 128;
            self.entries.reserve(new_cap.saturating_sub(self.entries.len()));
        }
        self.group_lens.push(changes.len());
        self.entries.extend(changes);
    }

    /// Remove and return the most recent group's changes, in the order they
    /// were recorded (caller is responsible for applying them in reverse).
    pub fn pop_group(&mut self) -> Option<Vec<Change>> {
        let len = self.group_lens.pop()?;
        let split_at = self.entries.len() - len;
        Some(self.entries.split_off(split_at))
    }

    /// Discard every group after the first `n`, used to restore atomicity
    /// when a multi-step command fails partway through.
    pub fn truncate_groups(&mut self, n: usize) {
        while self.group_lens.len() > n {
            let _ = self.pop_group();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction::N;

    #[test]
    fn push_then_pop_round_trips() {
        let mut h = History::new();
        h.push_group(vec![
            Change::Move { from: 0, dir: N, to: 1, bounced: false, touched: vec![(0, 0), (1, 0)] },
            Change::ActiveFlip,
        ]);
        assert_eq!(h.len(), 1);
        let popped = h.pop_group().unwrap();
        assert_eq!(popped.len(), 2);
        assert!(h.is_empty());
    }

    #[test]
    fn truncate_drops_trailing_groups() {
        let mut h = History::new();
        for _ in 0..5 {
            h.push_group(vec![Change::ActiveFlip]);
        }
        h.truncate_groups(2);
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn pop_on_empty_is_none() {
        let mut h = History::new();
        assert!(h.pop_group().is_none());
    }
}
