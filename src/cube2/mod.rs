//! The corners of a cube, as found on a 2x2x2 cube.
//!
//! Corner orientation is measured against the U/D axis, so U and D turns never twist a corner
//! and every other quarter turn twists its four corners by 1, 2, 1, 2.

mod moves;

pub use moves::{Face, FaceMove};

use crate::moves::Transform;

/// Number of corner slots.
pub const CORNERS: usize = 8;

/// Corner twists live in the cyclic group of order 3.
pub const TWIST_ORDER: u8 = 3;

/// Names the corner slots (and the pieces that belong in them).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum Corner {
    URF,
    UFL,
    ULB,
    UBR,
    DFR,
    DLF,
    DBL,
    DRB,
}

impl Corner {
    /// Every corner, in slot order.
    pub const ARRAY: [Corner; CORNERS] = [
        Corner::URF,
        Corner::UFL,
        Corner::ULB,
        Corner::UBR,
        Corner::DFR,
        Corner::DLF,
        Corner::DBL,
        Corner::DRB,
    ];
}

impl From<Corner> for u16 {
    fn from(c: Corner) -> u16 {
        c as u16
    }
}

/// The whole-cube rotations x, y and z, written as a face turn followed by the inverse turn of
/// the opposite face. A 2x2x2 has no fixed centres, so these only change the viewpoint.
pub fn rotations(order: u8) -> [Transform; 3] {
    [Face::R, Face::U, Face::F].map(|face| {
        let turn = FaceMove::new(face).transform(order);
        let opposite = FaceMove::prime(face.opposite()).transform(order);
        turn.then(&opposite)
    })
}
