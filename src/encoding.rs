//! Canonical, hashable keys for puzzle configurations.
//!
//! Several mutually exclusive encodings exist, depending on how much of the configuration a
//! puzzle variant cares about: the slot of one marked piece, the permutation of all pieces, or
//! the permutation together with every piece's twist.

use serde::{Deserialize, Serialize};

use crate::error::InvalidStateError;
use crate::state::{Piece, PuzzleState};

/// An encoded puzzle configuration. Keys are compared, ordered and hashed by content only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateKey(Box<[u16]>);

impl StateKey {
    /// The raw values making up this key.
    pub fn values(&self) -> &[u16] {
        &self.0
    }

    /// Number of values in the key.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key holds no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u16>> for StateKey {
    fn from(values: Vec<u16>) -> Self {
        Self(values.into_boxed_slice())
    }
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // single digits read best run together, e.g. "01234567"
        let sep = if self.0.iter().all(|&v| v < 10) { "" } else { "," };
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(sep)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// How a configuration is turned into a [`StateKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Only the slot currently holding the marked piece.
    Index {
        /// Identity of the tracked piece.
        marked: u16,
    },
    /// The identity in each slot, in slot order.
    Permutation,
    /// `(identity, orientation)` for each slot, in slot order.
    PermutationOrientation,
}

impl Encoding {
    /// Encode a configuration.
    ///
    /// An index encoding fails when the state is too short to hold its marked piece. The
    /// other encodings accept any valid state; checking its length against a puzzle is left
    /// to [`Puzzle::encode`](crate::puzzle::Puzzle::encode).
    pub fn encode(&self, state: &PuzzleState) -> Result<StateKey, InvalidStateError> {
        let values = match *self {
            Encoding::Index { marked } => {
                let slot = state.slot_of(marked).ok_or(InvalidStateError::PieceOutOfRange {
                    id: marked,
                    slots: state.len(),
                })?;
                vec![slot as u16]
            }
            Encoding::Permutation => state.pieces().iter().map(|p| p.id).collect(),
            Encoding::PermutationOrientation => state
                .pieces()
                .iter()
                .flat_map(|p| [p.id, p.orientation as u16])
                .collect(),
        };
        Ok(StateKey::from(values))
    }

    /// Rebuild a configuration from a key, validating it against the puzzle's slot count and
    /// orientation order.
    ///
    /// An index key only fixes the marked piece; the remaining pieces are placed as close to
    /// solved as possible, which does not affect anything observable through this encoding.
    pub fn decode(&self, key: &StateKey, slots: usize, order: u8) -> Result<PuzzleState, InvalidStateError> {
        let values = key.values();
        let expected = self.key_len(slots);
        if values.len() != expected {
            return Err(InvalidStateError::WrongLength {
                expected,
                found: values.len(),
            });
        }

        match *self {
            Encoding::Index { marked } => {
                let slot = values[0] as usize;
                if marked as usize >= slots {
                    return Err(InvalidStateError::PieceOutOfRange { id: marked, slots });
                }
                if slot >= slots {
                    return Err(InvalidStateError::SlotOutOfRange { slot, slots });
                }
                Ok(PuzzleState::solved(slots).swap(marked as usize, slot))
            }
            Encoding::Permutation => {
                let pieces = values
                    .iter()
                    .map(|&id| Piece { id, orientation: 0 })
                    .collect();
                PuzzleState::from_pieces(pieces, order)
            }
            Encoding::PermutationOrientation => {
                let mut pieces = Vec::with_capacity(slots);
                for (slot, pair) in values.chunks_exact(2).enumerate() {
                    let orientation = u8::try_from(pair[1]).map_err(|_| {
                        InvalidStateError::OrientationOutOfRange {
                            slot,
                            orientation: u8::MAX,
                            order,
                        }
                    })?;
                    pieces.push(Piece {
                        id: pair[0],
                        orientation,
                    });
                }
                PuzzleState::from_pieces(pieces, order)
            }
        }
    }

    /// Length of a key for a puzzle with `slots` slots.
    pub fn key_len(&self, slots: usize) -> usize {
        match self {
            Encoding::Index { .. } => 1,
            Encoding::Permutation => slots,
            Encoding::PermutationOrientation => 2 * slots,
        }
    }

    /// Number of pieces this encoding compares against a goal, which is the potential of the
    /// goal itself.
    pub fn tracked(&self, slots: usize) -> usize {
        match self {
            Encoding::Index { .. } => 1,
            _ => slots,
        }
    }

    /// Count of pieces in `key` that already match `goal`: the marked piece on its target slot,
    /// or each slot holding the goal's piece (with the goal's twist, when twists are encoded).
    pub fn potential(&self, key: &StateKey, goal: &StateKey) -> usize {
        let (a, b) = (key.values(), goal.values());
        match self {
            Encoding::Index { .. } | Encoding::Permutation => {
                a.iter().zip(b).filter(|(x, y)| x == y).count()
            }
            Encoding::PermutationOrientation => a
                .chunks_exact(2)
                .zip(b.chunks_exact(2))
                .filter(|(x, y)| x == y)
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn twisted() -> PuzzleState {
        let pieces = vec![
            Piece { id: 2, orientation: 1 },
            Piece { id: 0, orientation: 0 },
            Piece { id: 1, orientation: 2 },
        ];
        PuzzleState::from_pieces(pieces, 3).unwrap()
    }

    #[test]
    fn encodings() {
        let s = twisted();
        assert_eq!(Encoding::Index { marked: 0 }.encode(&s).unwrap().values(), &[1]);
        assert_eq!(Encoding::Permutation.encode(&s).unwrap().values(), &[2, 0, 1]);
        assert_eq!(
            Encoding::PermutationOrientation.encode(&s).unwrap().values(),
            &[2, 1, 0, 0, 1, 2]
        );
        assert_eq!(Encoding::PermutationOrientation.encode(&s).unwrap().to_string(), "210012");
        assert_eq!(StateKey::from(vec![3, 12]).to_string(), "3,12");
    }

    #[test]
    fn index_encoding_needs_its_marked_piece() {
        assert_eq!(
            Encoding::Index { marked: 5 }.encode(&PuzzleState::solved(3)),
            Err(InvalidStateError::PieceOutOfRange { id: 5, slots: 3 })
        );
    }

    #[test]
    fn encode_is_by_content() {
        let a = twisted();
        let b = twisted();
        assert_eq!(
            Encoding::PermutationOrientation.encode(&a).unwrap(),
            Encoding::PermutationOrientation.encode(&b).unwrap()
        );
    }

    #[test]
    fn decode_round_trip() {
        let s = twisted();
        let enc = Encoding::PermutationOrientation;
        assert_eq!(enc.decode(&enc.encode(&s).unwrap(), 3, 3).unwrap(), s);

        let enc = Encoding::Index { marked: 1 };
        let decoded = enc.decode(&StateKey::from(vec![4]), 8, 1).unwrap();
        assert_eq!(decoded.slot_of(1), Some(4));
        assert_eq!(enc.encode(&decoded).unwrap().values(), &[4]);
    }

    #[test]
    fn decode_rejects_malformed_keys() {
        let enc = Encoding::PermutationOrientation;
        assert_eq!(
            enc.decode(&StateKey::from(vec![0, 0, 1]), 3, 3),
            Err(InvalidStateError::WrongLength {
                expected: 6,
                found: 3
            })
        );
        assert!(matches!(
            enc.decode(&StateKey::from(vec![0, 0, 0, 0, 1, 0]), 3, 3),
            Err(InvalidStateError::DuplicatePiece { id: 0 })
        ));
        assert!(matches!(
            enc.decode(&StateKey::from(vec![0, 0, 1, 0, 2, 300]), 3, 3),
            Err(InvalidStateError::OrientationOutOfRange { slot: 2, .. })
        ));
        assert_eq!(
            Encoding::Index { marked: 0 }.decode(&StateKey::from(vec![8]), 8, 1),
            Err(InvalidStateError::SlotOutOfRange { slot: 8, slots: 8 })
        );
        assert!(Encoding::Permutation
            .decode(&StateKey::from(vec![0, 1, 9]), 3, 1)
            .is_err());
    }

    #[test]
    fn potential_of_goal_is_full() {
        let solved = PuzzleState::solved(8);
        for enc in [
            Encoding::Index { marked: 3 },
            Encoding::Permutation,
            Encoding::PermutationOrientation,
        ] {
            let goal = enc.encode(&solved).unwrap();
            assert_eq!(enc.potential(&goal, &goal), enc.tracked(8));
        }

        let enc = Encoding::PermutationOrientation;
        let goal = enc.encode(&PuzzleState::solved(3)).unwrap();
        // no slot holds its own piece
        assert_eq!(enc.potential(&enc.encode(&twisted()).unwrap(), &goal), 0);
        let s = PuzzleState::from_pieces(
            vec![
                Piece { id: 0, orientation: 1 },
                Piece { id: 1, orientation: 0 },
                Piece { id: 2, orientation: 0 },
            ],
            3,
        )
        .unwrap();
        assert_eq!(enc.potential(&enc.encode(&s).unwrap(), &goal), 2);
        assert_eq!(Encoding::Permutation.potential(
            &Encoding::Permutation.encode(&s).unwrap(),
            &Encoding::Permutation.encode(&PuzzleState::solved(3)).unwrap()
        ), 3);
    }
}
