//! Immutable board topology: for every `(point, direction)` pair, either the
//! destination point, [`NO_WAY`], or a goal sentinel.

use anyhow::{bail, ensure};

use crate::direction::{Direction, ALL_DIRECTIONS, NUM_DIRECTIONS};
use crate::{PointId, Res, GOAL_1, GOAL_2, NO_WAY};

/// Which board shape a [`Geometry`] was built as.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Shape {
    /// A plain rectangle with a goal slot centred on each short edge.
    /// `free_kick_len` is `Some` for the advanced (free-kick) ruleset.
    Soccer { free_kick_len: Option<u32> },
    /// A soccer rectangle with a `depth`-deep behind-the-goal ring and
    /// chamfered (octagon) corners. Never combined with free kicks.
    Hockey { depth: u32 },
}

impl Shape {
    #[must_use]
    pub fn is_advanced_ruleset(self) -> bool {
        matches!(self, Shape::Soccer { free_kick_len: Some(_) })
    }
}

type ConnRow = [PointId; NUM_DIRECTIONS];

/// Immutable connection table, built once and shared by every [`crate::state::State`]
/// on it.
#[derive(Clone, Debug)]
pub struct Geometry {
    width: u32,
    height: u32,
    goal_width: u32,
    shape: Shape,
    qpoints: u32,
    connections: Vec<ConnRow>,
    free_kicks: Option<Vec<ConnRow>>,
}

impl Geometry {
    /// Build a plain rectangular field. `free_kick_len`, if given, enables the
    /// advanced (3-leg / free-kick) ruleset.
    pub fn build_soccer(width: u32, height: u32, goal_width: u32, free_kick_len: Option<u32>) -> Res<Self> {
        validate_rect(width, height, goal_width)?;
        if let Some(len) = free_kick_len {
            let limit = width.min(height) / 2;
            ensure!(
                len > 3 && len < limit,
                "free_kick_len must satisfy 3 < len < {limit}, got {len}"
            );
        }
        let qpoints = width * height;
        let connections = build_rect_connections(width, height, height, goal_width);
        let free_kicks = free_kick_len.map(|len| build_free_kicks(&connections, len));
        Ok(Self { width, height, goal_width, shape: Shape::Soccer { free_kick_len }, qpoints, connections, free_kicks })
    }

    /// Build a hockey-shaped field: a soccer rectangle with a `depth`-deep
    /// behind-the-goal ring and chamfered corners (never combined with free
    /// kicks).
    pub fn build_hockey(width: u32, height: u32, goal_width: u32, depth: u32) -> Res<Self> {
        validate_rect(width, height, goal_width)?;
        ensure!(depth >= 2 && depth < width / 2, "depth must satisfy 2 <= depth < {}, got {depth}", width / 2);
        let height_total = height + 2 * depth;
        let qpoints = width * height_total;
        let mut connections = build_rect_connections(width, height_total, height_total, goal_width);
        chamfer_corners(&mut connections, width, height_total, depth);
        Ok(Self { width, height: height_total, goal_width, shape: Shape::Hockey { depth }, qpoints, connections, free_kicks: None })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn goal_width(&self) -> u32 {
        self.goal_width
    }

    #[must_use]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    #[must_use]
    pub fn qpoints(&self) -> u32 {
        self.qpoints
    }

    #[must_use]
    pub fn is_advanced_ruleset(&self) -> bool {
        self.shape.is_advanced_ruleset()
    }

    /// The point the ball starts at: the centre of the grid.
    #[must_use]
    pub fn start_point(&self) -> PointId {
        (self.qpoints / 2) as PointId
    }

    /// Destination (or sentinel) of the edge from `point` in direction `dir`.
    #[must_use]
    pub fn connection(&self, point: PointId, dir: Direction) -> PointId {
        self.connections[point as usize][dir.index() as usize]
    }

    /// All eight destinations (or sentinels) from `point`, in [`ALL_DIRECTIONS`] order.
    #[must_use]
    pub fn connections(&self, point: PointId) -> &ConnRow {
        &self.connections[point as usize]
    }

    /// Destination of a free kick from `point` in direction `dir`, or `None`
    /// if this geometry doesn't have the advanced ruleset enabled.
    #[must_use]
    pub fn free_kick(&self, point: PointId, dir: Direction) -> Option<PointId> {
        self.free_kicks.as_ref().map(|table| table[point as usize][dir.index() as usize])
    }

    /// The mask of statically-forbidden directions at `point`: bit `d` set
    /// means `connections[point][d]` is `NO_WAY`. Used to seed a fresh
    /// [`crate::state::State`]'s `lines` buffer.
    #[must_use]
    pub fn static_mask(&self, point: PointId) -> u8 {
        let mut mask = 0u8;
        for d in ALL_DIRECTIONS {
            if self.connection(point, d) == NO_WAY {
                mask |= d.bit();
            }
        }
        mask
    }

    fn goal_window(&self) -> (i32, i32) {
        goal_window(self.width, self.goal_width)
    }
}

fn validate_rect(width: u32, height: u32, goal_width: u32) -> Res<()> {
    ensure!(width >= 5 && width % 2 == 1, "width must be odd and >= 5, got {width}");
    ensure!(height >= 5 && height % 2 == 1, "height must be odd and >= 5, got {height}");
    ensure!(goal_width >= 2 && goal_width % 2 == 0, "goal_width must be even and >= 2, got {goal_width}");
    ensure!(goal_width + 3 <= width, "goal_width + 3 must be <= width ({width}), got goal_width={goal_width}");
    Ok(())
}

fn goal_window(width: u32, goal_width: u32) -> (i32, i32) {
    let lo = ((width - goal_width) / 2) as i32;
    let hi = ((width + goal_width) / 2) as i32;
    (lo, hi)
}

/// Classification of one candidate edge, generalised over an arbitrary
/// logical height so the same routine serves both the soccer rectangle and
/// the hockey bounding rectangle (goal lines always sit at the true
/// top/bottom edge: `y = -1` and `y = height`).
fn classify_edge(width: u32, height: u32, goal_width: u32, x1: i32, y1: i32, x2: i32, y2: i32) -> PointId {
    let width = width as i32;
    let height = height as i32;
    let (goal_lo, goal_hi) = goal_window(width as u32, goal_width);

    // off-board, and not crossing a goal line
    if (y2 == -1 || y2 == height) && x1 >= goal_lo && x1 <= goal_hi && x2 >= goal_lo && x2 <= goal_hi {
        // vertical crawl straight along a goalpost column doesn't score
        if !(x1 == x2 && (x1 == goal_lo || x1 == goal_hi)) {
            // north (y == -1) is GOAL_1, south (y == height) is GOAL_2
            return if y2 == -1 { GOAL_1 } else { GOAL_2 };
        }
    }
    if x2 < 0 || x2 >= width || y2 < 0 || y2 >= height {
        return NO_WAY;
    }
    // a move whose endpoints both sit inside the goal window is rescued from
    // the corner-crawl reject below: sliding along a goal-line row between
    // the goalposts (e.g. in front of an open goal mouth) is legal
    if x1 >= goal_lo && x1 <= goal_hi && x2 >= goal_lo && x2 <= goal_hi {
        return y2 * width + x2;
    }
    // corner-crawl test: can't slide straight along a short side's outer column/row
    if x1 == x2 && (x1 == 0 || x1 == width - 1) {
        return NO_WAY;
    }
    if y1 == y2 && (y1 == 0 || y1 == height - 1) {
        return NO_WAY;
    }
    y2 * width + x2
}

/// Build the connection table for a `width x logical_height` rectangle, where
/// `table_height` is the number of rows actually allocated (equal to
/// `logical_height` for both shapes today, kept distinct in the signature so
/// a future shape could allocate more rows than the goal-scoring rectangle
/// spans).
fn build_rect_connections(width: u32, logical_height: u32, table_height: u32, goal_width: u32) -> Vec<ConnRow> {
    let mut connections = vec![[0i32; NUM_DIRECTIONS]; (width * table_height) as usize];
    for y in 0..table_height as i32 {
        for x in 0..width as i32 {
            let point = (y * width as i32 + x) as usize;
            for d in ALL_DIRECTIONS {
                let (dx, dy) = d.delta();
                connections[point][d.index() as usize] =
                    classify_edge(width, logical_height, goal_width, x, y, x + dx, y + dy);
            }
        }
    }
    connections
}

/// Remove the four 45-degree corner triangles of a `width x height` rectangle,
/// each of leg length `depth`, turning it into an octagon. A removed cell's
/// own connections, and every neighbour's connection into it, become `NO_WAY`.
fn chamfer_corners(connections: &mut [ConnRow], width: u32, height: u32, depth: u32) {
    let width = width as i32;
    let height = height as i32;
    let depth = depth as i32;
    let is_chamfered = |x: i32, y: i32| -> bool {
        x + y < depth
            || (width - 1 - x) + y < depth
            || x + (height - 1 - y) < depth
            || (width - 1 - x) + (height - 1 - y) < depth
    };
    for y in 0..height {
        for x in 0..width {
            if !is_chamfered(x, y) {
                continue;
            }
            let point = (y * width + x) as usize;
            connections[point] = [NO_WAY; NUM_DIRECTIONS];
        }
    }
    // block neighbours' edges into a now-removed cell
    for y in 0..height {
        for x in 0..width {
            if is_chamfered(x, y) {
                continue;
            }
            let point = (y * width + x) as usize;
            for d in ALL_DIRECTIONS {
                let target = connections[point][d.index() as usize];
                if target >= 0 {
                    let (tx, ty) = (target % width, target / width);
                    if is_chamfered(tx, ty) {
                        connections[point][d.index() as usize] = NO_WAY;
                    }
                }
            }
        }
    }
}

/// Walk `connections` up to `free_kick_len` steps in each direction from every
/// point; the final point (or the sentinel hit along the way) is the free-kick
/// destination.
fn build_free_kicks(connections: &[ConnRow], free_kick_len: u32) -> Vec<ConnRow> {
    let mut table = vec![[0i32; NUM_DIRECTIONS]; connections.len()];
    for (point, row) in table.iter_mut().enumerate() {
        for d in ALL_DIRECTIONS {
            let mut current = point as PointId;
            let mut result = current;
            for _ in 0..free_kick_len {
                let next = connections[current as usize][d.index() as usize];
                if next < 0 {
                    result = next;
                    break;
                }
                current = next;
                result = current;
            }
            row[d.index() as usize] = result;
        }
    }
    table
}
