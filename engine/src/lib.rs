//! A Monte Carlo tree search engine for paper football: an `arena`-backed
//! search tree (`mcts`), a uniform baseline (`random_ai`), the shared
//! `Engine` capability set both implement, and the `io` REPL that drives
//! whichever one the CLI chose.

pub mod arena;
pub mod engine_trait;
pub mod io;
pub mod mcts;
pub mod params;
pub mod random_ai;
pub mod step;
