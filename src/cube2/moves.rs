use super::CORNERS;
use crate::moves::Transform;

#[cfg(test)]
use proptest_derive::Arbitrary;

/// The six faces of the cube, each of which can be turned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(test, derive(Arbitrary))]
pub enum Face {
    /// Right
    R,
    /// Left
    L,
    /// Up
    U,
    /// Down
    D,
    /// Front
    F,
    /// Back
    B,
}

impl Face {
    /// The face opposite to the given one.
    pub fn opposite(self) -> Face {
        match self {
            Face::R => Face::L,
            Face::L => Face::R,
            Face::U => Face::D,
            Face::D => Face::U,
            Face::F => Face::B,
            Face::B => Face::F,
        }
    }
}

/// A quarter turn of one face. A prime turn is anticlockwise.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(test, derive(Arbitrary))]
#[allow(missing_docs)]
pub struct FaceMove {
    pub face: Face,
    pub prime: bool,
}

macro_rules! fm {
    ($face:ident) => {
        FaceMove {
            face: Face::$face,
            prime: false,
        }
    };
    ($face:ident, prime) => {
        FaceMove {
            face: Face::$face,
            prime: true,
        }
    };
}

impl FaceMove {
    /// The six clockwise quarter turns.
    pub const CLOCKWISE: [FaceMove; 6] = [fm!(U), fm!(D), fm!(L), fm!(R), fm!(F), fm!(B)];

    /// All twelve quarter turns, clockwise first.
    pub const QUARTER: [FaceMove; 12] = [
        fm!(U),
        fm!(D),
        fm!(L),
        fm!(R),
        fm!(F),
        fm!(B),
        fm!(U, prime),
        fm!(D, prime),
        fm!(L, prime),
        fm!(R, prime),
        fm!(F, prime),
        fm!(B, prime),
    ];

    /// A clockwise turn of `face`.
    pub const fn new(face: Face) -> Self {
        Self { face, prime: false }
    }

    /// An anticlockwise turn of `face`.
    pub const fn prime(face: Face) -> Self {
        Self { face, prime: true }
    }

    /// The permutation and twist this move applies to the corner slots. With an orientation
    /// order of 1 the twists vanish and only the permutation remains.
    ///
    /// Anticlockwise turns are built as the explicit inverse of the clockwise table rather than
    /// as three clockwise turns.
    pub fn transform(self, order: u8) -> Transform {
        let face = self.face as usize;
        let clockwise = Transform::new(
            CP_OFFSETS[face].map(usize::from).to_vec(),
            CO_OFFSETS[face].to_vec(),
            order,
        );
        if self.prime {
            clockwise.inverse()
        } else {
            clockwise
        }
    }
}

impl crate::moves::Move for FaceMove {
    fn inverse(self) -> Self {
        Self {
            face: self.face,
            prime: !self.prime,
        }
    }
}

// I don't want to have the default derive debug for this!
impl std::fmt::Debug for FaceMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.prime {
            write!(f, "{:?}'", self.face)
        } else {
            write!(f, "{:?}", self.face)
        }
    }
}

impl std::fmt::Display for FaceMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

// Indexed by face in `Face` order. CP_OFFSETS[f][i] is the slot whose corner moves into slot i,
// CO_OFFSETS[f][j] is the twist given to the corner leaving slot j.
const CP_OFFSETS: [[u8; CORNERS]; 6] = [
    [4, 1, 2, 0, 7, 5, 6, 3],
    [0, 2, 6, 3, 4, 1, 5, 7],
    [3, 0, 1, 2, 4, 5, 6, 7],
    [0, 1, 2, 3, 5, 6, 7, 4],
    [1, 5, 2, 3, 0, 4, 6, 7],
    [0, 1, 3, 7, 4, 5, 2, 6],
];
const CO_OFFSETS: [[u8; CORNERS]; 6] = [
    [1, 0, 0, 2, 2, 0, 0, 1],
    [0, 2, 1, 0, 0, 1, 2, 0],
    [0; CORNERS],
    [0; CORNERS],
    [2, 1, 0, 0, 1, 2, 0, 0],
    [0, 0, 2, 1, 0, 0, 1, 2],
];
