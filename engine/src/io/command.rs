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
//! The static command table the REPL dispatches against: one concrete
//! receiver (the `Repl` in `crate::io`), matched case-insensitively against
//! a primary name and a handful of aliases.

use std::fmt::{Display, Formatter};
use std::iter::Peekable;
use std::str::SplitWhitespace;

use arrayvec::ArrayVec;
use board::Res;
use colored::Colorize;

use crate::io::Repl;

pub struct Command {
    pub primary_name: &'static str,
    pub other_names: ArrayVec<&'static str, 4>,
    pub help_text: &'static str,
    pub func: fn(&mut Repl, &mut Peekable<SplitWhitespace>) -> Res<()>,
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}.", self.primary_name.bold(), self.help_text)
    }
}

impl Command {
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        name.eq_ignore_ascii_case(self.primary_name) || self.other_names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }
}

macro_rules! command {
    ($primary:ident, [$($other:ident),*], $help:expr, $fun:expr) => {
        Command {
            primary_name: stringify!($primary),
            other_names: ArrayVec::from_iter([$(stringify!($other),)*]),
            help_text: $help,
            func: $fun,
        }
    };
}

/// The command table, in the order `help` lists them. Matched case-
/// insensitively against `primary_name` first, then `other_names`.
#[must_use]
pub fn commands() -> Vec<Command> {
    vec![
        command!(go, [g], "Let the current engine choose and play a direction. Add 'explain' for per-direction stats", Repl::cmd_go),
        command!(
            step,
            [s, mv],
            "Play one or more directions yourself, e.g. `step n ne e`",
            Repl::cmd_step
        ),
        command!(undo, [u], "Undo the last move, or `undo N` for the last N moves", Repl::cmd_undo),
        command!(reset, [new], "Start a new game on the current geometry", Repl::cmd_reset),
        command!(
            setoption,
            [option, set],
            "Set an engine parameter, e.g. `setoption qthink 200000`",
            Repl::cmd_setoption
        ),
        command!(print, [p, show], "Print the current board", Repl::cmd_print),
        command!(quit, [exit, q], "Exit the program", Repl::cmd_quit),
        command!(help, [h], "Print this message", Repl::cmd_help),
    ]
}
