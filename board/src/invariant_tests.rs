//! Property-based tests for invariants that must hold no matter what sequence
//! of moves produced a state: connection-table range, edge symmetry, and
//! `step`/`rollback` round-tripping exactly.

use std::rc::Rc;

use proptest::prelude::*;

use crate::direction::Direction;
use crate::geometry::Geometry;
use crate::state::State;
use crate::{GOAL_1, GOAL_2, NO_WAY};

fn soccer_9x11() -> Rc<Geometry> {
    Rc::new(Geometry::build_soccer(9, 11, 2, None).unwrap())
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    (0u8..8).prop_map(Direction::from_index)
}

#[test]
fn every_connection_is_in_range_or_a_sentinel() {
    let g = soccer_9x11();
    for p in 0..g.qpoints() as i32 {
        for d in crate::direction::ALL_DIRECTIONS {
            let c = g.connection(p, d);
            assert!(c == GOAL_1 || c == GOAL_2 || c == NO_WAY || (0..g.qpoints() as i32).contains(&c));
        }
    }
}

proptest! {
    /// Driving a game forward through any sequence of (possibly illegal or
    /// already-used) directions never leaves `lines` asymmetric: whenever an
    /// edge is drawn from `p` to `q`, `q`'s mask has the back-direction bit
    /// set too.
    #[test]
    fn drawn_edges_stay_symmetric(dirs in prop::collection::vec(direction_strategy(), 0..40)) {
        let g = soccer_9x11();
        let mut s = State::new(g.clone());
        for dir in dirs {
            if s.ball() < 0 {
                break;
            }
            s.step(dir);
        }
        for p in 0..g.qpoints() as i32 {
            for d in crate::direction::ALL_DIRECTIONS {
                let target = g.connection(p, d);
                if target < 0 {
                    continue;
                }
                let forward_set = s.lines_at(p) & d.bit() != 0;
                let backward_set = s.lines_at(target) & d.back().bit() != 0;
                prop_assert_eq!(forward_set, backward_set);
            }
        }
    }

    /// `step` followed by `rollback` of the changes it produced restores
    /// `lines`, `ball` and `active` exactly, whether or not the direction was
    /// legal, and whether or not it scored.
    #[test]
    fn step_then_rollback_is_the_identity(dirs in prop::collection::vec(direction_strategy(), 1..20)) {
        let g = soccer_9x11();
        let mut s = State::new(g);
        for dir in dirs {
            if s.ball() < 0 {
                break;
            }
            let before = s.clone();
            let (_to, changes) = s.step(dir);
            s.rollback(&changes);
            prop_assert_eq!(s.ball(), before.ball());
            prop_assert_eq!(s.active(), before.active());
            for p in 0..s.geometry().qpoints() as i32 {
                prop_assert_eq!(s.lines_at(p), before.lines_at(p));
            }
            s.step(dir);
        }
    }

    #[test]
    fn back_of_back_is_identity(idx in 0u8..8) {
        let d = Direction::from_index(idx);
        prop_assert_eq!(d.back().back(), d);
    }
}
