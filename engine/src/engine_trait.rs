//! The capability-set interface both AIs implement: a polymorphic trait in
//! place of a function-pointer vtable, narrowed to exactly the calls a
//! single-threaded, stateless-between-moves search needs.

use std::rc::Rc;

use board::direction::{Direction, ALL_DIRECTIONS};
use board::geometry::Geometry;
use board::state::State;
use board::{PointId, Res};

use crate::params::Params;

/// Every direction whose bit is *set* in a `get_steps()`-style mask (legal
/// move bitmap), in [`ALL_DIRECTIONS`] order. This is the opposite polarity
/// from `board::util::clear_directions`, which reads a `lines[point]` mask
/// where a set bit means *unavailable* — `get_steps()` already inverts that,
/// so a set bit here means legal.
pub fn legal_directions(mask: u8) -> impl Iterator<Item = Direction> {
    ALL_DIRECTIONS.into_iter().filter(move |d| mask & d.bit() != 0)
}

/// Per-direction summary returned by `go(explain: true)`: visit count and a
/// score normalised to `[0, 1]` from the active player's perspective. The
/// chosen direction is listed first; the rest follow in descending visit
/// count.
#[derive(Copy, Clone, Debug)]
pub struct DirectionStats {
    pub direction: board::direction::Direction,
    pub qgames: u32,
    pub normalised_score: f64,
}

/// What `go(explain: true)` returns alongside the chosen direction.
#[derive(Clone, Debug)]
pub struct Explanation {
    pub stats: Vec<DirectionStats>,
    pub wall_clock: std::time::Duration,
}

pub trait Engine {
    /// Re-initialise on a new geometry. Parameter values (`get_params`) are
    /// preserved across the reset.
    fn reset(&mut self, geometry: Rc<Geometry>);

    /// Apply one half-move. Errors (and leaves state unchanged) if `dir` is
    /// occupied or off-board.
    fn do_step(&mut self, dir: board::direction::Direction) -> Res<PointId>;

    /// Apply several half-moves atomically: on the first failure, every
    /// change already made this call is rolled back before returning the
    /// error.
    fn do_steps(&mut self, dirs: &[board::direction::Direction]) -> Res<Vec<PointId>>;

    /// Reverse the last user-visible half-move. Errors if history is empty.
    fn undo_step(&mut self) -> Res<()>;

    /// Reverse the last `n` user-visible half-moves.
    fn undo_steps(&mut self, n: usize) -> Res<()>;

    /// Choose a direction to play. Errors if the position has no legal
    /// moves (the caller should have already checked `status()`).
    fn go(&mut self, explain: bool) -> Res<(board::direction::Direction, Option<Explanation>)>;

    #[must_use]
    fn get_params(&self) -> &Params;

    /// Range-checked parameter update. Setting `cache` discards the current
    /// search tree.
    fn set_param(&mut self, name: &str, value: &str) -> Res<()>;

    #[must_use]
    fn get_state(&self) -> &State;
}
