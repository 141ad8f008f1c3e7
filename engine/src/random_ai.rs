//! Uniform legal-move picker: the reference opponent used in tests, and a
//! sanity baseline for the MCTS AI.

use std::rc::Rc;

use anyhow::{anyhow, bail};
use board::direction::Direction;
use board::geometry::Geometry;
use board::history::History;
use board::state::State;
use board::{PointId, Res, NO_WAY};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine_trait::{legal_directions, Engine, Explanation};
use crate::params::Params;
use crate::step::apply_step;

/// Always picks a uniformly random legal direction. Keeps its own
/// [`Params`] purely so the `Engine` interface is symmetric with
/// [`crate::mcts::MctsAi`] — none of the four knobs affect its behaviour.
#[derive(Debug)]
pub struct RandomAi {
    state: State,
    history: History,
    params: Params,
    rng: StdRng,
    last_error: Option<String>,
}

impl RandomAi {
    #[must_use]
    pub fn new(geometry: Rc<Geometry>) -> Self {
        Self {
            state: State::new(geometry),
            history: History::new(),
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
}

impl Engine for RandomAi {
    fn reset(&mut self, geometry: Rc<Geometry>) {
        self.state = State::new(geometry);
        self.history = History::new();
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
        let chosen = legal[self.rng.random_range(0..legal.len())];
        // There's no search tree here to report on; `explain` is accepted for
        // interface symmetry with `MctsAi` but always reports nothing.
        let explanation = explain.then(|| Explanation { stats: vec![], wall_clock: std::time::Duration::ZERO });
        Ok((chosen, explanation))
    }

    fn get_params(&self) -> &Params {
        &self.params
    }

    fn set_param(&mut self, name: &str, value: &str) -> Res<()> {
        self.params.set(name, value)
    }

    fn get_state(&self) -> &State {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use board::direction::Direction::*;
    use board::Status;

    use super::*;

    fn soccer_9x11() -> Rc<Geometry> {
        Rc::new(Geometry::build_soccer(9, 11, 2, None).unwrap())
    }

    #[test]
    fn go_always_returns_a_currently_legal_direction() {
        let mut ai = RandomAi::with_seed(soccer_9x11(), 42);
        for _ in 0..20 {
            let legal = ai.get_state().get_steps();
            let (dir, _) = ai.go(false).unwrap();
            assert!(legal & dir.bit() != 0);
            if ai.do_step(dir).is_err() {
                break;
            }
            if ai.get_state().status() != Status::InProgress {
                break;
            }
        }
    }

    #[test]
    fn do_steps_rolls_back_atomically_on_illegal_middle_step() {
        let mut ai = RandomAi::with_seed(soccer_9x11(), 7);
        let before = ai.get_state().clone();
        assert!(ai.do_steps(&[N, N]).is_ok());
        let after_two = ai.get_state().clone();
        let result = ai.do_steps(&[N, N]); // second N collides with the first N already drawn
        assert!(result.is_err());
        assert_eq!(ai.get_state().ball(), after_two.ball());
        assert_eq!(ai.get_state().lines_at(after_two.ball()), after_two.lines_at(after_two.ball()));
        let _ = before;
    }

    #[test]
    fn full_random_vs_random_game_round_trips_through_undo() {
        let geometry = soccer_9x11();
        let mut ai = RandomAi::with_seed(geometry.clone(), 1234);
        let mut played = 0usize;
        while ai.get_state().status() == Status::InProgress && played < 500 {
            let (dir, _) = ai.go(false).unwrap();
            if ai.do_step(dir).is_err() {
                break;
            }
            played += 1;
        }
        let history_len = played;
        ai.undo_steps(history_len).unwrap();
        let fresh = State::new(geometry);
        assert_eq!(ai.get_state().ball(), fresh.ball());
        assert_eq!(ai.get_state().active(), fresh.active());
    }

    #[test]
    fn unknown_parameter_name_is_still_range_checked_even_though_unused() {
        let mut ai = RandomAi::new(soccer_9x11());
        assert!(ai.set_param("qthink", "0").is_err());
        assert!(ai.set_param("qthink", "5").is_ok());
    }
}
