//! A cuboid of X×Y×Z cubies turned one slice at a time.
//!
//! Slots are the cubie coordinates `(i, j, k)` flattened as `i + X * j + X * Y * k`. A slice
//! move rotates the layer at a fixed coordinate along its axis. Layers with a square
//! cross-section turn a quarter in either direction; any other layer can only be turned half way
//! round, since a quarter turn would not map the layer onto itself.

use serde::{Deserialize, Serialize};

use crate::moves::Transform;

#[cfg(test)]
use proptest_derive::Arbitrary;

/// Smallest supported edge length.
pub const MIN_DIM: usize = 2;
/// Largest supported edge length.
pub const MAX_DIM: usize = 8;

/// An axis of the cuboid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(test, derive(Arbitrary))]
pub enum Axis {
    /// Left-Right axis
    X,
    /// Up-Down axis
    Y,
    /// Front-Back axis
    Z,
}

impl Axis {
    /// Every axis.
    pub const ARRAY: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

/// The sense of a slice turn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(test, derive(Arbitrary))]
pub enum Direction {
    /// +1
    Positive,
    /// -1
    Negative,
}

impl Direction {
    /// The opposite sense.
    pub fn flip(self) -> Direction {
        match self {
            Direction::Positive => Direction::Negative,
            Direction::Negative => Direction::Positive,
        }
    }
}

/// Edge lengths of the cuboid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dims {
    /// Extent along the X axis.
    pub x: usize,
    /// Extent along the Y axis.
    pub y: usize,
    /// Extent along the Z axis.
    pub z: usize,
}

impl Default for Dims {
    fn default() -> Self {
        Self { x: 2, y: 2, z: 2 }
    }
}

/// A cubie position.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub struct Coord {
    pub i: usize,
    pub j: usize,
    pub k: usize,
}

impl Dims {
    /// Number of cubies.
    pub fn slot_count(self) -> usize {
        self.x * self.y * self.z
    }

    /// Extent along an axis.
    pub fn along(self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// The slot index of a coordinate.
    pub fn index(self, c: Coord) -> usize {
        c.i + self.x * c.j + self.x * self.y * c.k
    }

    /// The coordinate of a slot index.
    pub fn coord(self, index: usize) -> Coord {
        Coord {
            i: index % self.x,
            j: (index / self.x) % self.y,
            k: index / (self.x * self.y),
        }
    }

    /// Whether layers along `axis` can be given a quarter turn.
    pub fn is_square(self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.y == self.z,
            Axis::Y => self.x == self.z,
            Axis::Z => self.x == self.y,
        }
    }

    /// Every distinct slice move, grouped by axis then layer. Half-turn layers contribute a
    /// single move since both directions coincide.
    pub fn moves(self) -> Vec<SliceMove> {
        let mut moves = Vec::new();
        for axis in Axis::ARRAY {
            for layer in 0..self.along(axis) {
                moves.push(SliceMove::new(axis, layer as u8, Direction::Positive));
                if self.is_square(axis) {
                    moves.push(SliceMove::new(axis, layer as u8, Direction::Negative));
                }
            }
        }
        moves
    }
}

/// A turn of one layer of the cuboid.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub struct SliceMove {
    pub axis: Axis,
    pub layer: u8,
    pub direction: Direction,
}

impl SliceMove {
    /// Create a slice move.
    pub const fn new(axis: Axis, layer: u8, direction: Direction) -> Self {
        Self {
            axis,
            layer,
            direction,
        }
    }

    /// Where the cubie at `c` ends up after this move. Cubies outside the layer stay put.
    pub fn apply(self, c: Coord, dims: Dims) -> Coord {
        let Coord { i, j, k } = c;
        let layer = self.layer as usize;
        let quarter = dims.is_square(self.axis);
        let positive = self.direction == Direction::Positive;

        match self.axis {
            Axis::X if i == layer => {
                let (j, k) = rotate(j, k, dims.y, dims.z, quarter, positive);
                Coord { i, j, k }
            }
            Axis::Y if j == layer => {
                let (i, k) = rotate(i, k, dims.x, dims.z, quarter, positive);
                Coord { i, j, k }
            }
            Axis::Z if k == layer => {
                let (i, j) = rotate(i, j, dims.x, dims.y, quarter, positive);
                Coord { i, j, k }
            }
            _ => c,
        }
    }

    /// The slot permutation of this move, derived by moving every cubie once.
    pub fn transform(self, dims: Dims) -> Transform {
        let n = dims.slot_count();
        let mut perm = vec![0; n];
        for src in 0..n {
            let dst = dims.index(self.apply(dims.coord(src), dims));
            perm[dst] = src;
        }
        Transform::new(perm, vec![0; n], 1)
    }
}

// Rotate the pair (a, b) within an a_len × b_len face.
fn rotate(a: usize, b: usize, a_len: usize, b_len: usize, quarter: bool, positive: bool) -> (usize, usize) {
    match (quarter, positive) {
        (true, true) => (b, a_len - 1 - a),
        (true, false) => (b_len - 1 - b, a),
        (false, _) => (a_len - 1 - a, b_len - 1 - b),
    }
}

impl crate::moves::Move for SliceMove {
    /// Flips the direction. On a layer that only admits a half turn both directions are the
    /// same turn, and a puzzle accepts either.
    fn inverse(self) -> Self {
        Self {
            direction: self.direction.flip(),
            ..self
        }
    }
}

impl std::fmt::Debug for SliceMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.direction {
            Direction::Positive => write!(f, "{:?}{}", self.axis, self.layer),
            Direction::Negative => write!(f, "{:?}{}'", self.axis, self.layer),
        }
    }
}

impl std::fmt::Display for SliceMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
