use crate::error::InvalidStateError;
use crate::state::{Piece, PuzzleState};

/// The effect of a move on slots: a permutation vector plus per-slot orientation deltas.
///
/// `perm[i]` is the slot whose piece moves into slot `i`. `twist[j]` is the amount added to the
/// orientation of the piece leaving slot `j`, so applying a transform to `s` gives
/// `s'[i] = (s[perm[i]].id, s[perm[i]].orientation + twist[perm[i]])` modulo `order`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transform {
    perm: Box<[usize]>,
    twist: Box<[u8]>,
    order: u8,
}

impl Transform {
    /// Build a transform from a permutation vector and source-indexed twists.
    ///
    /// `perm` must be a bijection on `0..perm.len()` and `twist` must have the same length.
    pub fn new(perm: Vec<usize>, twist: Vec<u8>, order: u8) -> Self {
        debug_assert_eq!(perm.len(), twist.len());
        debug_assert!({
            let mut sorted = perm.clone();
            sorted.sort_unstable();
            sorted.into_iter().eq(0..perm.len())
        });
        debug_assert!(order > 0);

        Self {
            perm: perm.into_boxed_slice(),
            twist: twist.into_iter().map(|t| t % order).collect(),
            order,
        }
    }

    /// The transform that leaves every slot alone.
    pub fn identity(slots: usize, order: u8) -> Self {
        Self::new((0..slots).collect(), vec![0; slots], order)
    }

    /// The permutation vector.
    pub fn perm(&self) -> &[usize] {
        &self.perm
    }

    /// The orientation deltas, indexed by source slot.
    pub fn twist(&self) -> &[u8] {
        &self.twist
    }

    /// The orientation group order.
    pub fn order(&self) -> u8 {
        self.order
    }

    /// Number of slots this transform acts on.
    pub fn len(&self) -> usize {
        self.perm.len()
    }

    /// Whether this transform acts on no slots.
    pub fn is_empty(&self) -> bool {
        self.perm.is_empty()
    }

    /// The inverse transform.
    ///
    /// The twists cannot simply be negated in place: the piece that arrived in slot `k` left
    /// slot `perm[k]`, so undoing its twist means subtracting `twist[perm[k]]` from whatever now
    /// leaves slot `k`.
    pub fn inverse(&self) -> Self {
        let n = self.len();
        let mut perm = vec![0; n];
        let mut twist = vec![0; n];
        for (k, &src) in self.perm.iter().enumerate() {
            perm[src] = k;
            twist[k] = (self.order - self.twist[src]) % self.order;
        }

        Self {
            perm: perm.into_boxed_slice(),
            twist: twist.into_boxed_slice(),
            order: self.order,
        }
    }

    /// The transform equivalent to applying `self` and then `other`.
    pub fn then(&self, other: &Transform) -> Self {
        debug_assert_eq!(self.len(), other.len());
        debug_assert_eq!(self.order, other.order);

        let n = self.len();
        let mut perm = vec![0; n];
        let mut twist = vec![0; n];
        for (j, &mid) in other.perm.iter().enumerate() {
            let src = self.perm[mid];
            perm[j] = src;
            twist[src] = (self.twist[src] + other.twist[mid]) % self.order;
        }

        Self {
            perm: perm.into_boxed_slice(),
            twist: twist.into_boxed_slice(),
            order: self.order,
        }
    }

    /// Apply this transform to a state, producing the resulting state.
    pub fn apply(&self, state: &PuzzleState) -> Result<PuzzleState, InvalidStateError> {
        if state.len() != self.len() {
            return Err(InvalidStateError::WrongLength {
                expected: self.len(),
                found: state.len(),
            });
        }

        let old = state.pieces();
        let pieces = self
            .perm
            .iter()
            .map(|&src| Piece {
                id: old[src].id,
                orientation: (old[src].orientation + self.twist[src]) % self.order,
            })
            .collect();

        Ok(PuzzleState::from_pieces_unchecked(pieces))
    }
}
