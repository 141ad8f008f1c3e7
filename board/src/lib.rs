//! [`board`](crate) implements the pencil-and-paper game *paper football*:
//! board geometry, game state, the move engine and its reversible history.
//! It forms the foundation of the `engine` crate, which adds the MCTS and
//! random AIs and the command-line front end.

pub use anyhow;
pub use colored;

/// Geometry-independent direction arithmetic (`NW, N, NE, E, SE, S, SW, W`).
pub mod direction;
/// Immutable board topology: connection table, free-kick table, soccer/hockey builders.
pub mod geometry;
/// Append-only log of state changes, used for exact rollback.
pub mod history;
/// Diagnostic severities, printed with `colored` rather than a logging framework.
pub mod message;
/// Mutable per-game state and the move engine (`step`, `get_steps`, `status`, `rollback`).
pub mod state;
/// Small bit-mask helpers shared by geometry and state.
pub mod util;

#[cfg(test)]
mod invariant_tests;

pub type Res<T> = anyhow::Result<T>;

/// Point identifier. Non-negative values are real grid points in `[0, qpoints)`;
/// negative values are the sentinels below.
pub type PointId = i32;

/// The edge left the field without scoring, or the direction was already used.
pub const NO_WAY: PointId = -1;
/// The edge crossed the north goal line.
pub const GOAL_1: PointId = -2;
/// The edge crossed the south goal line.
pub const GOAL_2: PointId = -3;

/// Outcome of a game, from a neutral point of view.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[must_use]
pub enum Status {
    InProgress,
    Win1,
    Win2,
}
