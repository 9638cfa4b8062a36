//! Puzzle configurations as immutable arrays of piece records.

use crate::error::InvalidStateError;

/// A movable piece, tracked by the slot it belongs in when solved and its twist.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Piece {
    /// The slot this piece occupies in the solved puzzle.
    pub id: u16,
    /// Twist of the piece, reduced modulo the puzzle's orientation order.
    pub orientation: u8,
}

/// A full puzzle configuration: the piece held by each slot, in slot order.
///
/// The identities always form a permutation of `0..len`. States are values; moves produce new
/// states rather than changing existing ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PuzzleState {
    pieces: Box<[Piece]>,
}

impl PuzzleState {
    /// The solved configuration on `slots` slots, every piece home and untwisted.
    pub fn solved(slots: usize) -> Self {
        let pieces = (0..slots)
            .map(|id| Piece {
                id: id as u16,
                orientation: 0,
            })
            .collect();
        Self { pieces }
    }

    /// Build a state from raw pieces, checking that the identities are a permutation and every
    /// orientation is below `orientation_order`.
    pub fn from_pieces(pieces: Vec<Piece>, orientation_order: u8) -> Result<Self, InvalidStateError> {
        let slots = pieces.len();
        let mut seen = vec![false; slots];
        for (slot, piece) in pieces.iter().enumerate() {
            let id = piece.id as usize;
            if id >= slots {
                return Err(InvalidStateError::PieceOutOfRange {
                    id: piece.id,
                    slots,
                });
            }
            if seen[id] {
                return Err(InvalidStateError::DuplicatePiece { id: piece.id });
            }
            seen[id] = true;
            if piece.orientation >= orientation_order {
                return Err(InvalidStateError::OrientationOutOfRange {
                    slot,
                    orientation: piece.orientation,
                    order: orientation_order,
                });
            }
        }

        Ok(Self {
            pieces: pieces.into_boxed_slice(),
        })
    }

    // Callers guarantee the permutation invariant.
    pub(crate) fn from_pieces_unchecked(pieces: Box<[Piece]>) -> Self {
        Self { pieces }
    }

    /// The pieces in slot order.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Whether the puzzle has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// The slot currently holding the piece with identity `id`.
    pub fn slot_of(&self, id: u16) -> Option<usize> {
        self.pieces.iter().position(|p| p.id == id)
    }

    /// Swap the contents of two slots.
    pub(crate) fn swap(mut self, a: usize, b: usize) -> Self {
        self.pieces.swap(a, b);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(id: u16, orientation: u8) -> Piece {
        Piece { id, orientation }
    }

    #[test]
    fn solved_is_identity() {
        let s = PuzzleState::solved(8);
        assert_eq!(s.len(), 8);
        assert!(s.pieces().iter().enumerate().all(|(i, p)| p.id as usize == i && p.orientation == 0));
        assert_eq!(s.slot_of(5), Some(5));
        assert_eq!(s.slot_of(8), None);
    }

    #[test]
    fn validation() {
        assert!(PuzzleState::from_pieces(vec![piece(1, 0), piece(0, 2)], 3).is_ok());
        assert_eq!(
            PuzzleState::from_pieces(vec![piece(1, 0), piece(1, 0)], 3),
            Err(InvalidStateError::DuplicatePiece { id: 1 })
        );
        assert_eq!(
            PuzzleState::from_pieces(vec![piece(0, 0), piece(2, 0)], 3),
            Err(InvalidStateError::PieceOutOfRange { id: 2, slots: 2 })
        );
        assert_eq!(
            PuzzleState::from_pieces(vec![piece(0, 0), piece(1, 3)], 3),
            Err(InvalidStateError::OrientationOutOfRange {
                slot: 1,
                orientation: 3,
                order: 3
            })
        );
        // with an orientation order of 1 every twist must be zero
        assert!(PuzzleState::from_pieces(vec![piece(0, 1)], 1).is_err());
    }
}
