//! The single place that decides whether a direction is an ordinary move or
//! a free kick, shared by [`crate::random_ai::RandomAi`] and
//! [`crate::mcts::MctsAi`] so `do_step`/`do_steps`/rollout sampling don't
//! duplicate the distinction. The same three-way branch that
//! `State::get_steps` uses to decide which directions are legal (partial
//! sequence in progress / basic ruleset / advanced ruleset with no partial
//! sequence) also decides which of `State::step`/`State::free_kick_step`
//! applying one of them should call.

use board::direction::Direction;
use board::history::Change;
use board::state::State;
use board::PointId;

/// Apply `dir` the way `get_steps()` would have classified it: an ordinary
/// `step` while a 3-leg sequence is in progress or no free kick is due yet,
/// otherwise a `free_kick_step`.
pub fn apply_step(state: &mut State, dir: Direction) -> (PointId, Vec<Change>) {
    let advanced = state.geometry().is_advanced_ruleset();
    if advanced && state.step1().is_none() && state.step12() == 0 {
        state.free_kick_step(dir)
    } else {
        state.step(dir)
    }
}
