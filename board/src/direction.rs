use anyhow::anyhow;
use strum_macros::EnumIter;

use crate::Res;

/// One of the eight compass directions a ball can be kicked in, indexed
/// clockwise starting at north-west. Diagonals sit at the even indices.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, EnumIter)]
#[repr(u8)]
pub enum Direction {
    Nw = 0,
    N = 1,
    Ne = 2,
    E = 3,
    Se = 4,
    S = 5,
    Sw = 6,
    W = 7,
}

use Direction::*;

pub const NUM_DIRECTIONS: usize = 8;

pub const ALL_DIRECTIONS: [Direction; NUM_DIRECTIONS] = [Nw, N, Ne, E, Se, S, Sw, W];

impl Direction {
    #[must_use]
    pub fn from_index(idx: u8) -> Self {
        ALL_DIRECTIONS[(idx % 8) as usize]
    }

    #[must_use]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// The direction you'd need to take to undo this one.
    #[must_use]
    pub fn back(self) -> Self {
        Self::from_index((self.index() + 4) % 8)
    }

    /// Diagonals sit at even indices; north/east/south/west at odd ones.
    #[must_use]
    pub fn is_diagonal(self) -> bool {
        self.index() % 2 == 0
    }

    /// `(dx, dy)` with `x` increasing east and `y` increasing south, matching
    /// the coordinate convention used by [`crate::geometry`].
    #[must_use]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Nw => (-1, -1),
            N => (0, -1),
            Ne => (1, -1),
            E => (1, 0),
            Se => (1, 1),
            S => (0, 1),
            Sw => (-1, 1),
            W => (-1, 0),
        }
    }

    /// Bit mask with only this direction's bit set, for use against a `lines[point]` byte.
    #[must_use]
    pub fn bit(self) -> u8 {
        1 << self.index()
    }

    /// The two cardinal directions adjacent to a diagonal in clockwise order
    /// (e.g. `Nw.adjacent_cardinals() == (W, N)`). Only meaningful for diagonals.
    #[must_use]
    pub fn adjacent_cardinals(self) -> (Self, Self) {
        debug_assert!(self.is_diagonal());
        (
            Self::from_index((self.index() + 7) % 8),
            Self::from_index((self.index() + 1) % 8),
        )
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Nw => "NW",
            N => "N",
            Ne => "NE",
            E => "E",
            Se => "SE",
            S => "S",
            Sw => "SW",
            W => "W",
        }
    }

    pub fn parse(s: &str) -> Res<Self> {
        let upper = s.to_ascii_uppercase();
        for d in ALL_DIRECTIONS {
            if d.name() == upper {
                return Ok(d);
            }
        }
        // a few friendlier long-form aliases, as the CLI keyword table would offer
        let long = match upper.as_str() {
            "NORTHWEST" | "NORTH_WEST" => Some(Nw),
            "NORTHEAST" | "NORTH_EAST" => Some(Ne),
            "SOUTHWEST" | "SOUTH_WEST" => Some(Sw),
            "SOUTHEAST" | "SOUTH_EAST" => Some(Se),
            "NORTH" => Some(N),
            "SOUTH" => Some(S),
            "EAST" => Some(E),
            "WEST" => Some(W),
            _ => None,
        };
        long.ok_or_else(|| anyhow!("'{s}' isn't a valid direction (try NW, N, NE, E, SE, S, SW, W)"))
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Res<Self> {
        Direction::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn back_is_involution() {
        for d in Direction::iter() {
            assert_eq!(d.back().back(), d);
        }
    }

    #[test]
    fn back_is_four_apart() {
        for d in Direction::iter() {
            assert_eq!((d.back().index() + 8 - d.index()) % 8, 4);
        }
    }

    #[test]
    fn diagonals_are_even_indices() {
        for d in [Nw, Ne, Se, Sw] {
            assert!(d.is_diagonal());
        }
        for d in [N, E, S, W] {
            assert!(!d.is_diagonal());
        }
    }

    #[test]
    fn parse_roundtrips_through_name() {
        for d in Direction::iter() {
            assert_eq!(Direction::parse(d.name()).unwrap(), d);
            assert_eq!(Direction::parse(&d.name().to_lowercase()).unwrap(), d);
        }
    }

    #[test]
    fn adjacent_cardinals_match_delta_geometry() {
        // drawing direction d from p, the two cells adjacent to p that the crossing
        // diagonal of the unit cell connects are exactly p's cardinal neighbours
        for d in [Nw, Ne, Se, Sw] {
            let (c_minus, c_plus) = d.adjacent_cardinals();
            assert!(!c_minus.is_diagonal());
            assert!(!c_plus.is_diagonal());
        }
    }
}
