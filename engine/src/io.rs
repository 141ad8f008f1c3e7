/*
 *  Motors, a collection of board game engines.
 *  Copyright (C) 2024 ToTheAnd
 *
 *  Motors is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  Motors is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with Motors. If not, see <https://www.gnu.org/licenses/>.
 */
//! The line-oriented read-eval-print loop: reads a line, splits it into
//! whitespace tokens, looks the first one up in [`command::commands`]
//! (case-insensitive, with an `edit_distance`-based "did you mean" on a
//! miss), and calls the matched command's function with the rest. There is
//! exactly one game, one board geometry per run, and one engine at a time.

pub mod cli;
pub mod command;
pub mod input;

use std::iter::Peekable;
use std::rc::Rc;
use std::str::SplitWhitespace;

use board::direction::Direction;
use board::geometry::Geometry;
use board::message::Message;
use board::{PointId, GOAL_1, GOAL_2};
use colored::Colorize;

use crate::engine_trait::Engine;
use crate::io::cli::{EngineChoice, EngineOpts, ShapeArgs};
use crate::io::command::{commands, Command};
use crate::io::input::Input;
use crate::mcts::MctsAi;
use crate::random_ai::RandomAi;

fn build_geometry(shape: ShapeArgs) -> board::Res<Geometry> {
    match shape {
        ShapeArgs::Soccer { width, height, goal_width, free_kick_len } => {
            Geometry::build_soccer(width, height, goal_width, free_kick_len)
        }
        ShapeArgs::Hockey { width, height, goal_width, depth } => Geometry::build_hockey(width, height, goal_width, depth),
    }
}

fn build_engine(choice: EngineChoice, geometry: Rc<Geometry>, seed: Option<u64>) -> Box<dyn Engine> {
    match (choice, seed) {
        (EngineChoice::Mcts, Some(seed)) => Box::new(MctsAi::with_seed(geometry, seed)),
        (EngineChoice::Mcts, None) => Box::new(MctsAi::new(geometry)),
        (EngineChoice::Random, Some(seed)) => Box::new(RandomAi::with_seed(geometry, seed)),
        (EngineChoice::Random, None) => Box::new(RandomAi::new(geometry)),
    }
}

/// Render the current ball position on a plain character grid: `.` for an
/// empty point, `O` for the ball, blank for points the geometry's static mask
/// marks as fully unreachable (hockey's chamfered corners).
fn render_board(geometry: &Geometry, ball: PointId) -> String {
    let width = geometry.width() as i32;
    let height = geometry.height() as i32;
    let mut out = String::new();
    for y in 0..height {
        for x in 0..width {
            let point = y * width + x;
            let ch = if point == ball {
                'O'
            } else if geometry.static_mask(point) == 0xFF {
                ' '
            } else {
                '.'
            };
            out.push(ch);
            out.push(' ');
        }
        out.push('\n');
    }
    out
}

fn print_message(severity: Message, text: &str) {
    let prefix = severity.styled_prefix();
    let line = if prefix.is_empty() { text.to_string() } else { format!("{prefix} {text}") };
    if severity.goes_to_stderr() {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

/// Owns the board, the active AI and the REPL's I/O, and carries just enough
/// of [`cli::EngineOpts`] to rebuild both on `reset`.
pub struct Repl {
    engine: Box<dyn Engine>,
    engine_choice: EngineChoice,
    shape: ShapeArgs,
    seed: Option<u64>,
    quit: bool,
}

impl Repl {
    pub fn new(opts: EngineOpts) -> board::Res<Self> {
        let geometry = Rc::new(build_geometry(opts.shape)?);
        let engine = build_engine(opts.engine, geometry, opts.seed);
        Ok(Self { engine, engine_choice: opts.engine, shape: opts.shape, seed: opts.seed, quit: false })
    }

    /// Run the loop until `quit`, end of input, or an unrecoverable input
    /// error. Errors from individual commands are printed and the loop
    /// continues.
    pub fn run(&mut self, interactive_requested: bool) {
        let mut input = Input::new(interactive_requested);
        let table = commands();
        let mut last_failed: Option<String> = None;
        loop {
            let line = match input.get_line(last_failed.as_deref()) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    print_message(Message::Error, &err.to_string());
                    break;
                }
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                last_failed = None;
                continue;
            }
            match dispatch(self, &table, trimmed) {
                Ok(()) => last_failed = None,
                Err(err) => {
                    print_message(Message::Error, &err.to_string());
                    last_failed = Some(trimmed.to_string());
                }
            }
            if self.quit {
                break;
            }
        }
    }

    fn cmd_go(&mut self, words: &mut Peekable<SplitWhitespace>) -> board::Res<()> {
        let explain = matches!(words.next(), Some(w) if w.eq_ignore_ascii_case("explain"));
        let (dir, explanation) = self.engine.go(explain)?;
        let to = self.engine.do_step(dir)?;
        print_message(Message::Info, &format!("played {dir} -> {}", describe_point(to)));
        if let Some(exp) = explanation {
            for stat in exp.stats {
                println!("  {:<3} visits={:<6} score={:.3}", stat.direction.to_string(), stat.qgames, stat.normalised_score);
            }
            println!("  ({} ms)", exp.wall_clock.as_millis());
        }
        Ok(())
    }

    fn cmd_step(&mut self, words: &mut Peekable<SplitWhitespace>) -> board::Res<()> {
        let dirs: Vec<Direction> = words.map(Direction::parse).collect::<board::Res<_>>()?;
        anyhow::ensure!(!dirs.is_empty(), "step needs at least one direction, e.g. `step n`");
        let tos = self.engine.do_steps(&dirs)?;
        for (dir, to) in dirs.iter().zip(tos) {
            print_message(Message::Info, &format!("played {dir} -> {}", describe_point(to)));
        }
        Ok(())
    }

    fn cmd_undo(&mut self, words: &mut Peekable<SplitWhitespace>) -> board::Res<()> {
        let n = match words.next() {
            Some(w) => w.parse().map_err(|_| anyhow::anyhow!("'{w}' isn't a move count"))?,
            None => 1,
        };
        self.engine.undo_steps(n)
    }

    fn cmd_reset(&mut self, _words: &mut Peekable<SplitWhitespace>) -> board::Res<()> {
        let geometry = Rc::new(build_geometry(self.shape)?);
        self.engine = build_engine(self.engine_choice, geometry, self.seed);
        print_message(Message::Info, "new game");
        Ok(())
    }

    fn cmd_setoption(&mut self, words: &mut Peekable<SplitWhitespace>) -> board::Res<()> {
        let name = words.next().ok_or_else(|| anyhow::anyhow!("setoption needs a name"))?;
        let value = words.next().ok_or_else(|| anyhow::anyhow!("setoption needs a value"))?;
        self.engine.set_param(name, value)
    }

    fn cmd_print(&mut self, _words: &mut Peekable<SplitWhitespace>) -> board::Res<()> {
        let state = self.engine.get_state();
        print!("{}", render_board(state.geometry(), state.ball()));
        println!("active player: {}", state.active());
        println!("status: {:?}", state.status());
        Ok(())
    }

    fn cmd_quit(&mut self, _words: &mut Peekable<SplitWhitespace>) -> board::Res<()> {
        self.quit = true;
        Ok(())
    }

    fn cmd_help(&mut self, _words: &mut Peekable<SplitWhitespace>) -> board::Res<()> {
        for cmd in commands() {
            println!("{cmd}");
        }
        Ok(())
    }
}

fn describe_point(point: PointId) -> String {
    match point {
        GOAL_1 => "GOAL (player 1 scores)".to_string(),
        GOAL_2 => "GOAL (player 2 scores)".to_string(),
        p => p.to_string(),
    }
}

fn dispatch(repl: &mut Repl, table: &[Command], line: &str) -> board::Res<()> {
    let mut words = line.split_whitespace().peekable();
    let Some(cmd_name) = words.next() else { return Ok(()) };
    match table.iter().find(|c| c.matches(cmd_name)) {
        Some(cmd) => (cmd.func)(repl, &mut words),
        None => Err(anyhow::anyhow!("unknown command '{cmd_name}'{}", suggestion(table, cmd_name))),
    }
}

fn suggestion(table: &[Command], typed: &str) -> String {
    table
        .iter()
        .map(|c| (c.primary_name, edit_distance::edit_distance(c.primary_name, typed)))
        .min_by_key(|&(_, dist)| dist)
        .filter(|&(_, dist)| dist <= 2)
        .map(|(name, _)| format!(" (did you mean '{}'?)", name.bold()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_opts() -> EngineOpts {
        EngineOpts { engine: EngineChoice::Random, seed: Some(1), ..EngineOpts::default() }
    }

    #[test]
    fn go_advances_the_game_by_one_ply() {
        let mut repl = Repl::new(test_opts()).unwrap();
        let ball_before = repl.engine.get_state().ball();
        let table = commands();
        dispatch(&mut repl, &table, "go").unwrap();
        assert_ne!(repl.engine.get_state().ball(), ball_before);
    }

    #[test]
    fn unknown_command_suggests_the_closest_match() {
        let mut repl = Repl::new(test_opts()).unwrap();
        let table = commands();
        let err = dispatch(&mut repl, &table, "goo").unwrap_err();
        assert!(err.to_string().contains("did you mean"));
    }

    #[test]
    fn step_then_undo_restores_the_ball_position() {
        let mut repl = Repl::new(test_opts()).unwrap();
        let table = commands();
        let before = repl.engine.get_state().ball();
        dispatch(&mut repl, &table, "step n").unwrap();
        assert_ne!(repl.engine.get_state().ball(), before);
        dispatch(&mut repl, &table, "undo").unwrap();
        assert_eq!(repl.engine.get_state().ball(), before);
    }

    #[test]
    fn quit_sets_the_quit_flag() {
        let mut repl = Repl::new(test_opts()).unwrap();
        let table = commands();
        dispatch(&mut repl, &table, "quit").unwrap();
        assert!(repl.quit);
    }

    #[test]
    fn setoption_rejects_unknown_names() {
        let mut repl = Repl::new(test_opts()).unwrap();
        let table = commands();
        assert!(dispatch(&mut repl, &table, "setoption bogus 1").is_err());
    }
}
