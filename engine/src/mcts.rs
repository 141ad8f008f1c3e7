//! Monte-Carlo tree search over the bitmask board representation: UCB1
//! selection, random rollout, back-propagation, and `go()`/`explain()`.

use std::mem::size_of;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{anyhow, bail};
use board::direction::Direction;
use board::geometry::Geometry;
use board::history::History;
use board::state::State;
use board::{PointId, Res, Status, NO_WAY};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::arena::{Arena, Node, NodeId, SENTINEL};
use crate::engine_trait::{legal_directions, DirectionStats, Engine, Explanation};
use crate::params::Params;
use crate::step::apply_step;

/// The root is always allocated immediately after the sentinel.
const ROOT: NodeId = 1;

/// Converts a terminal [`Status`] to the `+1 / -1` rollout outcome, from
/// player 1's perspective.
fn terminal_score(status: Status) -> f64 {
    match status {
        Status::Win1 => 1.0,
        Status::Win2 => -1.0,
        Status::InProgress => unreachable!("terminal_score called on a non-terminal status"),
    }
}

#[derive(Debug)]
pub struct MctsAi {
    state: State,
    /// Scratch state a simulation mutates freely; recloned from `state` at
    /// the start of every simulation rather than rolled back move-by-move.
    backup: State,
    history: History,
    arena: Option<Arena>,
    params: Params,
    rng: StdRng,
    last_error: Option<String>,
}

impl MctsAi {
    #[must_use]
    pub fn new(geometry: Rc<Geometry>) -> Self {
        let state = State::new(geometry);
        Self {
            backup: state.clone(),
            state,
            history: History::new(),
            arena: None,
            params: Params::default(),
            rng: StdRng::seed_from_u64(rand::rng().random()),
            last_error: None,
        }
    }

    #[must_use]
    pub fn with_seed(geometry: Rc<Geometry>, seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), ..Self::new(geometry) }
    }

    /// The last error message recorded by a fallible call, for the CLI to
    /// render verbatim.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn total_nodes(&self) -> u32 {
        let n = self.params.cache_bytes / size_of::<Node>() as u64;
        u32::try_from(n).unwrap_or(u32::MAX)
    }

    /// Reuse the existing arena's backing buffer if its size hasn't changed
    /// since the last search; otherwise (first search, or `cache` was just
    /// changed) allocate a fresh one. Setting `cache` frees the existing
    /// arena; the new one is lazily allocated on the next search.
    fn ensure_arena(&mut self) {
        let total_nodes = self.total_nodes();
        match &mut self.arena {
            Some(a) if a.total_nodes() == total_nodes => a.reset_cache(),
            _ => self.arena = Some(Arena::new(total_nodes)),
        }
    }

    /// UCB1 pick among the legal directions from `node`, ties broken
    /// uniformly at random. A direction whose child is still the sentinel is
    /// scored with the sentinel's prior (`score=2, qgames=1`) so it is
    /// always preferred over an already-visited real child.
    fn select(&mut self, node: NodeId, legal_mask: u8) -> Direction {
        let arena = self.arena.as_ref().expect("arena initialised before any simulation");
        let parent = arena.get(node);
        let parent_qgames = f64::from(parent.qgames.max(1));
        let mut best_dirs = Vec::with_capacity(8);
        let mut best_ucb = f64::NEG_INFINITY;
        for d in legal_directions(legal_mask) {
            let child_id = parent.children[d.index() as usize];
            let (score, qgames) = if child_id == SENTINEL {
                (Node::SENTINEL_SCORE, f64::from(Node::SENTINEL_QGAMES))
            } else {
                let child = arena.get(child_id);
                (child.score, f64::from(child.qgames))
            };
            let ucb = score / qgames + self.params.c * (parent_qgames.ln() / qgames).sqrt();
            if ucb > best_ucb {
                best_ucb = ucb;
                best_dirs.clear();
                best_dirs.push(d);
            } else if ucb == best_ucb {
                best_dirs.push(d);
            }
        }
        best_dirs[self.rng.random_range(0..best_dirs.len())]
    }

    /// One selection/expansion/rollout/back-propagation cycle from the
    /// current (live) position. Returns the number of rollout-style steps
    /// consumed (for the `qthink` budget) and whether the arena ran out of
    /// room expanding this simulation (in which case the caller stops
    /// calling `simulate` entirely).
    fn simulate(&mut self) -> (u32, bool) {
        self.backup = self.state.clone();
        let mut trail: Vec<(NodeId, u8)> = Vec::new();
        let mut node = ROOT;
        let mut steps = 0u32;
        loop {
            let status = self.backup.status();
            if status != Status::InProgress {
                let score = terminal_score(status);
                self.backprop(&trail, score);
                return (steps, false);
            }
            let legal = self.backup.get_steps();
            let active = self.backup.active();
            let dir = self.select(node, legal);
            let arena = self.arena.as_mut().expect("arena initialised before any simulation");
            let child_id = arena.get(node).children[dir.index() as usize];
            if child_id == SENTINEL {
                let Some(new_id) = arena.alloc_node() else {
                    return (steps, true);
                };
                arena.get_mut(node).children[dir.index() as usize] = new_id;
                trail.push((new_id, active));
                apply_step(&mut self.backup, dir);
                steps += 1;
                let (rollout_score, rollout_steps) = self.rollout();
                steps += rollout_steps;
                self.backprop(&trail, rollout_score);
                return (steps, false);
            }
            trail.push((child_id, active));
            apply_step(&mut self.backup, dir);
            steps += 1;
            node = child_id;
        }
    }

    /// Play uniformly random legal moves from the current scratch position
    /// until a terminal status or `max_depth` is reached.
    fn rollout(&mut self) -> (f64, u32) {
        let mut steps = 0u32;
        loop {
            let status = self.backup.status();
            if status != Status::InProgress {
                return (terminal_score(status), steps);
            }
            if steps >= self.params.max_depth {
                return (0.0, steps);
            }
            let legal: Vec<Direction> = legal_directions(self.backup.get_steps()).collect();
            let dir = legal[self.rng.random_range(0..legal.len())];
            apply_step(&mut self.backup, dir);
            steps += 1;
        }
    }

    fn backprop(&mut self, trail: &[(NodeId, u8)], score: f64) {
        let arena = self.arena.as_mut().expect("arena initialised before any simulation");
        for &(node_id, active) in trail {
            let node = arena.get_mut(node_id);
            node.qgames += 1;
            node.score += if active == 1 { score } else { -score };
        }
    }
}

impl Engine for MctsAi {
    fn reset(&mut self, geometry: Rc<Geometry>) {
        self.state = State::new(geometry);
        self.backup = self.state.clone();
        self.history = History::new();
        self.arena = None;
    }

    fn do_step(&mut self, dir: Direction) -> Res<PointId> {
        let (to, changes) = apply_step(&mut self.state, dir);
        if to == NO_WAY {
            let err = anyhow!("direction {dir} is occupied or off the board");
            self.last_error = Some(err.to_string());
            return Err(err);
        }
        self.history.push_group(changes);
        Ok(to)
    }

    fn do_steps(&mut self, dirs: &[Direction]) -> Res<Vec<PointId>> {
        let mut results = Vec::with_capacity(dirs.len());
        let mut groups = Vec::with_capacity(dirs.len());
        for (i, &dir) in dirs.iter().enumerate() {
            let (to, changes) = apply_step(&mut self.state, dir);
            if to == NO_WAY {
                for changes in groups.into_iter().rev() {
                    self.state.rollback(&changes);
                }
                let err = anyhow!("step {i} ({dir}) is occupied or off the board; all steps rolled back");
                self.last_error = Some(err.to_string());
                return Err(err);
            }
            results.push(to);
            groups.push(changes);
        }
        for g in groups {
            self.history.push_group(g);
        }
        Ok(results)
    }

    fn undo_step(&mut self) -> Res<()> {
        let Some(changes) = self.history.pop_group() else {
            let err = anyhow!("no moves to undo");
            self.last_error = Some(err.to_string());
            bail!(err);
        };
        self.state.rollback(&changes);
        Ok(())
    }

    fn undo_steps(&mut self, n: usize) -> Res<()> {
        for _ in 0..n {
            self.undo_step()?;
        }
        Ok(())
    }

    fn go(&mut self, explain: bool) -> Res<(Direction, Option<Explanation>)> {
        let legal: Vec<Direction> = legal_directions(self.state.get_steps()).collect();
        if legal.is_empty() {
            let err = anyhow!("no legal moves: go() called on a terminal position");
            self.last_error = Some(err.to_string());
            return Err(err);
        }
        if legal.len() == 1 {
            return Ok((legal[0], None));
        }

        let start = Instant::now();
        self.ensure_arena();
        {
            let arena = self.arena.as_mut().expect("just ensured");
            let root = arena.alloc_node().expect("a freshly reset arena always has room for the root");
            debug_assert_eq!(root, ROOT);
        }

        let mut steps_done = 0u32;
        while steps_done < self.params.qthink {
            let (used, alloc_failed) = self.simulate();
            steps_done += used;
            if alloc_failed {
                break;
            }
        }

        let arena = self.arena.as_ref().expect("allocated above");
        let root_children = arena.get(ROOT).children;
        let mut best_dirs = Vec::with_capacity(8);
        let mut best_qgames = -1i64;
        for &d in &legal {
            let child = root_children[d.index() as usize];
            let qgames = if child == SENTINEL { 0 } else { i64::from(arena.get(child).qgames) };
            match qgames.cmp(&best_qgames) {
                std::cmp::Ordering::Greater => {
                    best_qgames = qgames;
                    best_dirs.clear();
                    best_dirs.push(d);
                }
                std::cmp::Ordering::Equal => best_dirs.push(d),
                std::cmp::Ordering::Less => {}
            }
        }
        let chosen = best_dirs[self.rng.random_range(0..best_dirs.len())];

        let explanation = if explain {
            let mut stats: Vec<DirectionStats> = legal
                .iter()
                .map(|&d| {
                    let child = root_children[d.index() as usize];
                    let (qgames, score) =
                        if child == SENTINEL { (0, 0.0) } else { let c = arena.get(child); (c.qgames, c.score) };
                    let normalised_score = if qgames == 0 { 0.5 } else { (score / f64::from(qgames) + 1.0) / 2.0 };
                    DirectionStats { direction: d, qgames, normalised_score }
                })
                .collect();
            stats.sort_by(|a, b| b.qgames.cmp(&a.qgames));
            if let Some(idx) = stats.iter().position(|s| s.direction == chosen) {
                stats.swap(0, idx);
            }
            Some(Explanation { stats, wall_clock: start.elapsed() })
        } else {
            None
        };

        Ok((chosen, explanation))
    }

    fn get_params(&self) -> &Params {
        &self.params
    }

    fn set_param(&mut self, name: &str, value: &str) -> Res<()> {
        self.params.set(name, value)?;
        if name.eq_ignore_ascii_case("cache") {
            // Frees the existing arena; lazily rebuilt at the new size by
            // `ensure_arena` on the next `go()`.
            self.arena = None;
        }
        Ok(())
    }

    fn get_state(&self) -> &State {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use board::direction::Direction::*;

    use super::*;

    fn soccer_9x11() -> Rc<Geometry> {
        Rc::new(Geometry::build_soccer(9, 11, 2, None).unwrap())
    }

    #[test]
    fn single_legal_move_is_returned_without_searching() {
        let g = soccer_9x11();
        let mut ai = MctsAi::with_seed(g.clone(), 1);
        // drive the ball into a corner, which has exactly one legal direction
        let corner_dirs = [Nw, Nw, Nw, Nw];
        for d in corner_dirs {
            let _ = ai.do_step(d);
        }
        let legal = legal_directions(ai.get_state().get_steps()).count();
        if legal == 1 {
            let (_, explanation) = ai.go(true).unwrap();
            assert!(explanation.is_none());
        }
    }

    #[test]
    fn go_is_deterministic_for_a_fixed_seed_and_budget() {
        let g = soccer_9x11();
        let mut params_applied = Params::default();
        params_applied.qthink = 1024;
        params_applied.cache_bytes = 32 * size_of::<Node>() as u64;

        let run = || {
            let mut ai = MctsAi::with_seed(g.clone(), 0);
            ai.params = params_applied;
            ai.go(true).unwrap()
        };

        let (first_dir, first_explanation) = run();
        for _ in 0..9 {
            let (dir, explanation) = run();
            assert_eq!(dir, first_dir);
            let a = first_explanation.as_ref().unwrap();
            let b = explanation.as_ref().unwrap();
            assert_eq!(a.stats.len(), b.stats.len());
            for (sa, sb) in a.stats.iter().zip(b.stats.iter()) {
                assert_eq!(sa.direction, sb.direction);
                assert_eq!(sa.qgames, sb.qgames);
            }
        }
    }

    #[test]
    fn arena_allocation_counters_are_consistent_after_a_search() {
        let g = soccer_9x11();
        let mut ai = MctsAi::with_seed(g, 3);
        ai.params.qthink = 200;
        ai.params.cache_bytes = 16 * size_of::<Node>() as u64; // force exhaustion quickly
        let _ = ai.go(false).unwrap();
        let arena = ai.arena.as_ref().unwrap();
        assert!(arena.good_node_alloc() > 0);
        assert!(arena.used_nodes() <= arena.total_nodes());
    }

    #[test]
    fn explain_lists_the_chosen_direction_first() {
        let g = soccer_9x11();
        let mut ai = MctsAi::with_seed(g, 11);
        ai.params.qthink = 300;
        let (chosen, explanation) = ai.go(true).unwrap();
        let explanation = explanation.unwrap();
        assert_eq!(explanation.stats[0].direction, chosen);
        for pair in explanation.stats.windows(2) {
            assert!(pair[0].qgames >= pair[1].qgames || pair[0].direction == chosen);
        }
    }

    #[test]
    fn setting_cache_discards_the_arena_for_the_next_search() {
        let g = soccer_9x11();
        let mut ai = MctsAi::with_seed(g, 5);
        ai.params.qthink = 50;
        let _ = ai.go(false).unwrap();
        assert!(ai.arena.is_some());
        let new_cache = (64 * size_of::<Node>()).to_string();
        ai.set_param("cache", &new_cache).unwrap();
        assert!(ai.arena.is_none());
    }
}
