//! Mutable per-game state and the move engine: legal-move enumeration,
//! `step`/`rollback`, bounce/turn-pass and advanced-ruleset 3-leg sequence
//! bookkeeping.
//!
//! The "did the turn pass" check reads `lines[target]` *before* the new bits
//! are written, so a move landing on a point that was already touched by an
//! earlier edge grants a bounce instead of passing the turn.

use std::rc::Rc;

use crate::direction::{Direction, ALL_DIRECTIONS};
use crate::geometry::Geometry;
use crate::history::Change;
use crate::util::{clear_directions, is_clear};
use crate::{PointId, Status, GOAL_1, GOAL_2, NO_WAY};

/// A game in progress on a given [`Geometry`]. The geometry is reference
/// counted rather than borrowed: any number of states may share one
/// immutable geometry, and the MCTS engine needs to own both a geometry and
/// its live/scratch states side by side without fighting the borrow checker
/// over a lifetime parameter.
#[derive(Clone, Debug)]
pub struct State {
    geometry: Rc<Geometry>,
    lines: Vec<u8>,
    ball: PointId,
    active: u8,
    ball_before_goal: PointId,
    step1: Option<Direction>,
    step2: Option<Direction>,
    step12: u64,
}

impl State {
    /// Seed `lines` from the geometry's static mask, place the ball at the
    /// centre, and (advanced ruleset only) prime `step12`.
    #[must_use]
    pub fn new(geometry: Rc<Geometry>) -> Self {
        let qpoints = geometry.qpoints() as usize;
        let mut lines = vec![0u8; qpoints];
        for (p, mask) in lines.iter_mut().enumerate() {
            *mask = geometry.static_mask(p as PointId);
        }
        let ball = geometry.start_point();
        let mut state =
            Self { geometry, lines, ball, active: 1, ball_before_goal: ball, step1: None, step2: None, step12: 0 };
        if geometry.is_advanced_ruleset() {
            let mut touched = Vec::new();
            state.mark_occupied(ball, &mut touched);
            state.step12 = state.recompute_step12();
        }
        state
    }

    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[must_use]
    pub fn ball(&self) -> PointId {
        self.ball
    }

    #[must_use]
    pub fn active(&self) -> u8 {
        self.active
    }

    #[must_use]
    pub fn ball_before_goal(&self) -> PointId {
        self.ball_before_goal
    }

    #[must_use]
    pub fn step1(&self) -> Option<Direction> {
        self.step1
    }

    #[must_use]
    pub fn step2(&self) -> Option<Direction> {
        self.step2
    }

    #[must_use]
    pub fn step12(&self) -> u64 {
        self.step12
    }

    /// The line-mask at `point`: bit `d` set means direction `d` is not
    /// currently available from `point`.
    #[must_use]
    pub fn lines_at(&self, point: PointId) -> u8 {
        self.lines[point as usize]
    }

    /// Set of directions the active player may legally play right now.
    #[must_use]
    pub fn get_steps(&self) -> u8 {
        if !self.geometry.is_advanced_ruleset() {
            return !self.lines[self.ball as usize];
        }
        if self.step1.is_some() {
            return if self.step2.is_none() {
                self.completions_for_second_leg()
            } else {
                !self.lines[self.ball as usize]
            };
        }
        if self.step12 != 0 {
            let mut mask = 0u8;
            for d1 in ALL_DIRECTIONS {
                let byte = (self.step12 >> (u64::from(d1.index()) * 8)) as u8;
                if byte != 0 {
                    mask |= d1.bit();
                }
            }
            mask
        } else {
            let mut mask = 0u8;
            for d in ALL_DIRECTIONS {
                if self.geometry.free_kick(self.ball, d).is_some_and(|dest| dest != NO_WAY) {
                    mask |= d.bit();
                }
            }
            mask
        }
    }

    /// `InProgress`, or the side whose goal was reached / whose opponent is
    /// out of replies.
    #[must_use]
    pub fn status(&self) -> Status {
        if self.ball == GOAL_1 {
            return Status::Win1;
        }
        if self.ball == GOAL_2 {
            return Status::Win2;
        }
        if self.get_steps() == 0 {
            return if self.active == 1 { Status::Win2 } else { Status::Win1 };
        }
        Status::InProgress
    }

    /// Apply one half-move. Returns the resulting ball position (or a goal
    /// sentinel) and the list of [`Change`]s produced, for the caller to push
    /// onto a [`crate::history::History`] as one group. A direction that is
    /// occupied or off-board returns `(NO_WAY, vec![])` and leaves state
    /// unchanged.
    pub fn step(&mut self, dir: Direction) -> (PointId, Vec<Change>) {
        let mut changes = Vec::new();
        let from = self.ball;
        if !is_clear(self.lines[from as usize], dir) {
            return (NO_WAY, changes);
        }
        let target_raw = self.geometry.connection(from, dir);
        if target_raw < 0 {
            if target_raw == NO_WAY {
                return (NO_WAY, changes);
            }
            self.lines[from as usize] |= dir.bit();
            self.ball_before_goal = from;
            self.ball = target_raw;
            changes.push(Change::BallTeleport { previous_ball: from });
            return (target_raw, changes);
        }
        let (to, bounced, touched) =
            self.draw_edge(dir).expect("direction was checked clear and non-sentinel above");
        changes.push(Change::Move { from, dir, to, bounced, touched });
        if self.geometry.is_advanced_ruleset() {
            changes.extend(self.advance_sequence(dir));
        } else if !bounced {
            self.active ^= 3;
            changes.push(Change::ActiveFlip);
        }
        (to, changes)
    }

    /// Take a free kick (advanced ruleset only, when `get_steps` says no
    /// ordinary 3-leg sequence exists). Returns `(NO_WAY, vec![])` if no free
    /// kick is legal right now.
    pub fn free_kick_step(&mut self, dir: Direction) -> (PointId, Vec<Change>) {
        let mut changes = Vec::new();
        if self.step1.is_some() || self.step12 != 0 {
            return (NO_WAY, changes);
        }
        let Some(target) = self.geometry.free_kick(self.ball, dir) else {
            return (NO_WAY, changes);
        };
        if target == NO_WAY {
            return (NO_WAY, changes);
        }
        let from = self.ball;
        if target < 0 {
            self.ball_before_goal = from;
            self.ball = target;
            changes.push(Change::BallTeleport { previous_ball: from });
            return (target, changes);
        }
        self.ball = target;
        self.active ^= 3;
        self.step12 = self.recompute_step12();
        changes.push(Change::FreeKick { dir, from, to: target });
        changes.push(Change::ActiveFlip);
        (target, changes)
    }

    /// Reverse a group of changes produced by one `step`/`free_kick_step`
    /// call, in reverse order.
    pub fn rollback(&mut self, changes: &[Change]) {
        for change in changes.iter().rev() {
            match change {
                Change::Move { from, touched, .. } => {
                    for &(point, old_mask) in touched.iter().rev() {
                        self.lines[point as usize] = old_mask;
                    }
                    self.ball = *from;
                }
                Change::ActiveFlip => self.active ^= 3,
                Change::BallTeleport { previous_ball } => self.ball = *previous_ball,
                Change::FirstLeg { .. } => self.step1 = None,
                Change::SecondLeg { .. } => self.step2 = None,
                Change::ThirdLegClose { prev_step1, prev_step2, prev_step12 } => {
                    self.step1 = *prev_step1;
                    self.step2 = *prev_step2;
                    self.step12 = *prev_step12;
                }
                Change::FreeKick { from, .. } => self.ball = *from,
            }
        }
    }

    /// Draw the edge from `self.ball` in direction `dir`. Returns the
    /// destination, whether it bounced (was already touched), and every
    /// `(point, previous_mask)` this touched, in write order, for exact
    /// rollback. `None` if the direction is occupied or leads to a sentinel.
    fn draw_edge(&mut self, dir: Direction) -> Option<(PointId, bool, Vec<(PointId, u8)>)> {
        let from = self.ball;
        if !is_clear(self.lines[from as usize], dir) {
            return None;
        }
        let target = self.geometry.connection(from, dir);
        if target < 0 {
            return None;
        }
        let mut touched = Vec::new();
        let bounced = self.lines[target as usize] != 0;
        touched.push((from, self.lines[from as usize]));
        self.lines[from as usize] |= dir.bit();
        touched.push((target, self.lines[target as usize]));
        self.lines[target as usize] |= dir.back().bit();
        if self.geometry.is_advanced_ruleset() {
            self.mark_diag(from, dir, &mut touched);
            self.mark_occupied(target, &mut touched);
        }
        self.ball = target;
        Some((target, bounced, touched))
    }

    /// Advanced ruleset only: when a diagonal edge is drawn, the orthogonal
    /// edge that would cross it (connecting the two cells adjacent to `p`) is
    /// also forbidden, since edges may not cross. If either adjacent cell is
    /// off-board, that side is simply skipped rather than indexed.
    fn mark_diag(&mut self, p: PointId, dir: Direction, touched: &mut Vec<(PointId, u8)>) {
        if !dir.is_diagonal() {
            return;
        }
        let (c_minus, c_plus) = dir.adjacent_cardinals();
        let a = self.geometry.connection(p, c_minus);
        let b = self.geometry.connection(p, c_plus);
        if a >= 0 && b >= 0 {
            let cross = Direction::from_index((dir.index() + 2) % 8);
            touched.push((a, self.lines[a as usize]));
            self.lines[a as usize] |= cross.bit();
            touched.push((b, self.lines[b as usize]));
            self.lines[b as usize] |= cross.back().bit();
        }
    }

    /// Advanced ruleset only: once the ball arrives at `point`, every
    /// neighbour's edge back into `point` is marked as already-touched, so a
    /// later move into `point` also counts as entering an occupied cell. This
    /// is a marker, not a drawn edge.
    fn mark_occupied(&mut self, point: PointId, touched: &mut Vec<(PointId, u8)>) {
        for d in ALL_DIRECTIONS {
            let n = self.geometry.connection(point, d);
            if n >= 0 {
                touched.push((n, self.lines[n as usize]));
                self.lines[n as usize] |= d.back().bit();
            }
        }
    }

    fn advance_sequence(&mut self, dir: Direction) -> Vec<Change> {
        let mut changes = Vec::new();
        if self.step1.is_none() {
            self.step1 = Some(dir);
            changes.push(Change::FirstLeg { dir });
        } else if self.step2.is_none() {
            self.step2 = Some(dir);
            changes.push(Change::SecondLeg { dir });
        } else {
            let prev_step1 = self.step1;
            let prev_step2 = self.step2;
            let prev_step12 = self.step12;
            self.step1 = None;
            self.step2 = None;
            self.step12 = self.recompute_step12();
            changes.push(Change::ThirdLegClose { prev_step1, prev_step2, prev_step12 });
            if self.step12 != 0 {
                self.active ^= 3;
                changes.push(Change::ActiveFlip);
            }
        }
        changes
    }

    /// Directions from which, given the current position, a second leg exists
    /// that itself either scores or leaves at least one legal third leg. Used
    /// by `get_steps` while `step1` is set but `step2` isn't.
    fn completions_for_second_leg(&self) -> u8 {
        let mut mask = 0u8;
        for d2 in clear_directions(self.lines[self.ball as usize]) {
            let target = self.geometry.connection(self.ball, d2);
            if target < 0 {
                // a goal on the second leg ends the game outright: valid
                mask |= d2.bit();
                continue;
            }
            let mut scratch = self.clone();
            scratch.draw_edge(d2);
            if scratch.lines[scratch.ball as usize] != 0xff {
                mask |= d2.bit();
            }
        }
        mask
    }

    /// Pure function of `(lines, ball, geometry)`: the set of first-leg
    /// directions from which at least one complete 3-leg sequence exists,
    /// packed as `bit(d1*8 + d2)`. Recomputed whenever a 3-leg sequence
    /// closes (see `advance_sequence`) and at construction (`State::new`).
    fn recompute_step12(&self) -> u64 {
        let mut bitmap = 0u64;
        for d1 in clear_directions(self.lines[self.ball as usize]) {
            let target1 = self.geometry.connection(self.ball, d1);
            if target1 < 0 {
                // scoring immediately off the first leg: mark the byte non-empty
                bitmap |= 1u64 << (u64::from(d1.index()) * 8 + u64::from(d1.index()));
                continue;
            }
            let mut s1 = self.clone();
            s1.draw_edge(d1);
            for d2 in clear_directions(s1.lines[s1.ball as usize]) {
                let target2 = s1.geometry.connection(s1.ball, d2);
                if target2 < 0 {
                    bitmap |= 1u64 << (u64::from(d1.index()) * 8 + u64::from(d2.index()));
                    continue;
                }
                let mut s2 = s1.clone();
                s2.draw_edge(d2);
                if s2.lines[s2.ball as usize] != 0xff {
                    bitmap |= 1u64 << (u64::from(d1.index()) * 8 + u64::from(d2.index()));
                }
            }
        }
        bitmap
    }
}
