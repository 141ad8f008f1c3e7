//! Runtime-settable search knobs (`cache`, `qthink`, `max_depth`, `c`),
//! closed over four fixed names instead of an open string-keyed map: there
//! is exactly one search here, so a small `enum` plus a flat struct does the
//! job a string-keyed option table would do for an arbitrarily large option
//! set.

use std::mem::size_of;

use anyhow::{anyhow, ensure};
use board::Res;

use crate::arena::Node;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ParamName {
    Cache,
    QThink,
    MaxDepth,
    C,
}

impl ParamName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ParamName::Cache => "cache",
            ParamName::QThink => "qthink",
            ParamName::MaxDepth => "max_depth",
            ParamName::C => "c",
        }
    }

    pub fn parse(s: &str) -> Res<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cache" => Ok(ParamName::Cache),
            "qthink" => Ok(ParamName::QThink),
            "max_depth" | "maxdepth" => Ok(ParamName::MaxDepth),
            "c" => Ok(ParamName::C),
            _ => Err(anyhow!("unknown parameter '{s}' (try cache, qthink, max_depth, c)")),
        }
    }

    #[must_use]
    pub const fn all() -> [ParamName; 4] {
        [ParamName::Cache, ParamName::QThink, ParamName::MaxDepth, ParamName::C]
    }
}

const MIN_ARENA_NODES: u64 = 16;

/// Minimum cache size in bytes: large enough for [`MIN_ARENA_NODES`] nodes.
#[must_use]
pub fn min_cache_bytes() -> u64 {
    MIN_ARENA_NODES * size_of::<Node>() as u64
}

/// The four tunable knobs of [`crate::mcts::MctsAi`], bundled with their
/// bounds so `set`/`get` can range-check the way `EngineOption::Spin` does.
#[derive(Copy, Clone, Debug)]
pub struct Params {
    pub cache_bytes: u64,
    pub qthink: u32,
    pub max_depth: u32,
    pub c: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self { cache_bytes: 1 << 20, qthink: 10_000, max_depth: 200, c: 1.4 }
    }
}

impl Params {
    /// Range-checked parse of `value` into the named parameter. Returns an
    /// *invalid argument* error (never panics) on a bad name or out-of-range
    /// value, leaving `self` unchanged.
    pub fn set(&mut self, name: &str, value: &str) -> Res<()> {
        match ParamName::parse(name)? {
            ParamName::Cache => {
                let bytes: u64 = value.parse().map_err(|_| anyhow!("'{value}' isn't a byte count"))?;
                let min = min_cache_bytes();
                ensure!(bytes >= min, "cache must be at least {min} bytes (room for {MIN_ARENA_NODES} nodes)");
                self.cache_bytes = bytes;
            }
            ParamName::QThink => {
                let qthink: u32 = value.parse().map_err(|_| anyhow!("'{value}' isn't a positive integer"))?;
                ensure!(qthink >= 1, "qthink must be at least 1");
                self.qthink = qthink;
            }
            ParamName::MaxDepth => {
                let max_depth: u32 = value.parse().map_err(|_| anyhow!("'{value}' isn't a positive integer"))?;
                ensure!(max_depth >= 1, "max_depth must be at least 1");
                self.max_depth = max_depth;
            }
            ParamName::C => {
                let c: f64 = value.parse().map_err(|_| anyhow!("'{value}' isn't a number"))?;
                ensure!(c >= 0.0, "C must be non-negative");
                self.c = c;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: ParamName) -> String {
        match name {
            ParamName::Cache => self.cache_bytes.to_string(),
            ParamName::QThink => self.qthink.to_string(),
            ParamName::MaxDepth => self.max_depth.to_string(),
            ParamName::C => self.c.to_string(),
        }
    }

    /// `(name, current value)` for every parameter, in declaration order, for
    /// the `option`/`list` CLI commands.
    #[must_use]
    pub fn list(&self) -> Vec<(&'static str, String)> {
        ParamName::all().into_iter().map(|n| (n.as_str(), self.get(n))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_below_minimum_is_rejected() {
        let mut p = Params::default();
        assert!(p.set("cache", "1").is_err());
        assert_eq!(p.cache_bytes, Params::default().cache_bytes);
    }

    #[test]
    fn unknown_parameter_name_is_rejected() {
        let mut p = Params::default();
        assert!(p.set("nonsense", "1").is_err());
    }

    #[test]
    fn c_accepts_fractional_values() {
        let mut p = Params::default();
        p.set("c", "2.0").unwrap();
        assert_eq!(p.c, 2.0);
    }

    #[test]
    fn list_reports_all_four_names() {
        let p = Params::default();
        let names: Vec<_> = p.list().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["cache", "qthink", "max_depth", "c"]);
    }
}
