//! Module for puzzle move generics and the permutation algebra moves act through.

mod transform;

pub use transform::Transform;

/// A move, for use in writing scrambles or solutions. It is intended that a term of this trait
/// is a generator of the puzzle's move group, so that every move has an inverse that is also a
/// move.
///
/// ```rust
/// use cube_rl::cube2::{Face, FaceMove};
/// use cube_rl::moves::{Move, MoveSequence};
///
/// let r = FaceMove::new(Face::R);
/// assert_eq!(r.inverse(), FaceMove::prime(Face::R));
///
/// let alg = MoveSequence(vec![r, FaceMove::new(Face::U)]);
/// assert_eq!(alg.inverse().to_string(), "U' R'");
/// ```
pub trait Move: Eq + Clone {
    /// Take the inverse of a move. These inverses must satisfy the invertibility conditions of
    /// a group, i.e. that `X X^{-1} = X^{-1} X = e` where `e` is the empty sequence.
    fn inverse(self) -> Self
    where
        Self: Sized;
}

/// A sequence of moves (also known as an algorithm) for some specific type of move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSequence<M: Move>(pub Vec<M>);

// A derive would require `M: Default`.
impl<M: Move> Default for MoveSequence<M> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<M: Move> MoveSequence<M> {
    /// Invert a sequence of moves.
    ///
    /// If `X` is a sequence of moves and `X^{-1}` is its inverse and `o` is composition, then
    /// `X o X^{-1} = X^{-1} o X = e` where `e` is the empty sequence.
    pub fn inverse(self) -> Self {
        Self(self.0.into_iter().rev().map(|m| m.inverse()).collect())
    }

    /// Number of moves in the sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the sequence has no moves.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a move to the end of the sequence.
    pub fn push(&mut self, mv: M) {
        self.0.push(mv);
    }

    /// Iterate over the moves in order.
    pub fn iter(&self) -> std::slice::Iter<'_, M> {
        self.0.iter()
    }
}

impl<M: Move> IntoIterator for MoveSequence<M> {
    type Item = M;
    type IntoIter = std::vec::IntoIter<M>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<M: Move + std::fmt::Display> std::fmt::Display for MoveSequence<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, m) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{m}")?;
        }
        Ok(())
    }
}
