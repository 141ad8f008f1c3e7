//! Command-line argument parsing for the `paperball` binary: which board
//! shape to build, which AI to drive it with, and whether to run
//! interactively. Flag-by-flag parsing over a peekable argument iterator,
//! `Res`-returning on a bad value — there is no `--game`/`--output`
//! selection since there is exactly one game and the only "output" is the
//! board printer in `crate::io`.

use std::iter::Peekable;

use anyhow::{anyhow, bail};
use board::Res;

pub type ArgIter = Peekable<std::vec::IntoIter<String>>;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum EngineChoice {
    Mcts,
    Random,
}

impl EngineChoice {
    fn parse(s: &str) -> Res<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mcts" => Ok(EngineChoice::Mcts),
            "random" => Ok(EngineChoice::Random),
            _ => Err(anyhow!("unknown engine '{s}' (try 'mcts' or 'random')")),
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub enum ShapeArgs {
    Soccer { width: u32, height: u32, goal_width: u32, free_kick_len: Option<u32> },
    Hockey { width: u32, height: u32, goal_width: u32, depth: u32 },
}

impl Default for ShapeArgs {
    fn default() -> Self {
        ShapeArgs::Soccer { width: 9, height: 11, goal_width: 2, free_kick_len: None }
    }
}

#[derive(Clone, Debug)]
pub struct EngineOpts {
    pub shape: ShapeArgs,
    pub engine: EngineChoice,
    pub seed: Option<u64>,
    pub interactive: bool,
}

impl Default for EngineOpts {
    fn default() -> Self {
        Self { shape: ShapeArgs::default(), engine: EngineChoice::Mcts, seed: None, interactive: true }
    }
}

fn next_value(args: &mut ArgIter, flag: &str) -> Res<String> {
    args.next().ok_or_else(|| anyhow!("'{flag}' expects a value"))
}

fn next_u32(args: &mut ArgIter, flag: &str) -> Res<u32> {
    let v = next_value(args, flag)?;
    v.parse().map_err(|_| anyhow!("'{flag}' expects an integer, got '{v}'"))
}

fn next_u64(args: &mut ArgIter, flag: &str) -> Res<u64> {
    let v = next_value(args, flag)?;
    v.parse().map_err(|_| anyhow!("'{flag}' expects an integer, got '{v}'"))
}

/// Parse `args` (already stripped of the program name) into [`EngineOpts`].
pub fn parse_cli(args: impl Iterator<Item = String>) -> Res<EngineOpts> {
    let mut args: ArgIter = args.collect::<Vec<_>>().into_iter().peekable();
    let mut width = 9u32;
    let mut height = 11u32;
    let mut goal_width = 2u32;
    let mut free_kick_len: Option<u32> = None;
    let mut hockey_depth: Option<u32> = None;
    let mut opts = EngineOpts::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--width" | "-w" => width = next_u32(&mut args, "--width")?,
            "--height" | "-H" => height = next_u32(&mut args, "--height")?,
            "--goal-width" | "-g" => goal_width = next_u32(&mut args, "--goal-width")?,
            "--free-kick-len" | "-f" => free_kick_len = Some(next_u32(&mut args, "--free-kick-len")?),
            "--hockey-depth" | "-k" => hockey_depth = Some(next_u32(&mut args, "--hockey-depth")?),
            "--engine" | "-e" => opts.engine = EngineChoice::parse(&next_value(&mut args, "--engine")?)?,
            "--seed" | "-s" => opts.seed = Some(next_u64(&mut args, "--seed")?),
            "--non-interactive" => opts.interactive = false,
            other => bail!("unrecognised argument '{other}' (try --help)"),
        }
    }

    if let Some(depth) = hockey_depth {
        bail_if_free_kick_combined_with_hockey(free_kick_len)?;
        opts.shape = ShapeArgs::Hockey { width, height, goal_width, depth };
    } else {
        opts.shape = ShapeArgs::Soccer { width, height, goal_width, free_kick_len };
    }
    Ok(opts)
}

fn bail_if_free_kick_combined_with_hockey(free_kick_len: Option<u32>) -> Res<()> {
    if free_kick_len.is_some() {
        bail!("--free-kick-len and --hockey-depth can't be combined");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> impl Iterator<Item = String> {
        s.split_whitespace().map(str::to_string).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn defaults_build_a_soccer_board() {
        let opts = parse_cli(std::iter::empty()).unwrap();
        assert!(matches!(opts.shape, ShapeArgs::Soccer { width: 9, height: 11, goal_width: 2, free_kick_len: None }));
        assert_eq!(opts.engine, EngineChoice::Mcts);
    }

    #[test]
    fn parses_hockey_shape_and_engine_choice() {
        let opts = parse_cli(args("--hockey-depth 3 --engine random")).unwrap();
        assert!(matches!(opts.shape, ShapeArgs::Hockey { depth: 3, .. }));
        assert_eq!(opts.engine, EngineChoice::Random);
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(parse_cli(args("--bogus")).is_err());
    }

    #[test]
    fn rejects_free_kick_and_hockey_together() {
        assert!(parse_cli(args("--free-kick-len 5 --hockey-depth 2")).is_err());
    }
}
