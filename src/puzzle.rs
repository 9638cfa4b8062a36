//! Puzzle variants: which slots exist, which moves are legal, how states are keyed and which
//! keys count as solved.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cube2::{self, Corner, FaceMove};
use crate::encoding::{Encoding, StateKey};
use crate::error::{Error, InvalidPuzzleError, InvalidStateError};
use crate::grid::{self, Dims, Direction, SliceMove};
use crate::moves::{Move, Transform};
use crate::state::PuzzleState;

/// The goal piece tracked by index-encoded puzzles when none is given.
pub const DEFAULT_GOAL: u16 = Corner::UFL as u16;

/// Selects one of the supported puzzle models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PuzzleKind {
    /// Eight corners, tracking only where one marked corner is. Six clockwise face turns.
    MarkedCorner,
    /// Eight corners, tracking the corner permutation but not twists. Six clockwise face turns.
    CornerPermutation,
    /// Eight corners with permutation and twist. All twelve quarter turns.
    Corners,
    /// An X×Y×Z cuboid tracking where one marked cubie is. Every slice turn.
    Grid(Dims),
}

impl Default for PuzzleKind {
    fn default() -> Self {
        PuzzleKind::MarkedCorner
    }
}

/// A legal action on some puzzle.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PuzzleMove {
    /// A face turn of a corner puzzle.
    Face(FaceMove),
    /// A slice turn of a grid puzzle.
    Slice(SliceMove),
}

impl Move for PuzzleMove {
    fn inverse(self) -> Self {
        match self {
            PuzzleMove::Face(m) => PuzzleMove::Face(m.inverse()),
            PuzzleMove::Slice(m) => PuzzleMove::Slice(m.inverse()),
        }
    }
}

impl From<FaceMove> for PuzzleMove {
    fn from(m: FaceMove) -> Self {
        PuzzleMove::Face(m)
    }
}

impl From<SliceMove> for PuzzleMove {
    fn from(m: SliceMove) -> Self {
        PuzzleMove::Slice(m)
    }
}

impl std::fmt::Debug for PuzzleMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PuzzleMove::Face(m) => write!(f, "{m:?}"),
            PuzzleMove::Slice(m) => write!(f, "{m:?}"),
        }
    }
}

impl std::fmt::Display for PuzzleMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// The set of keys that count as solved. For puzzles that can be viewed from any side this is
/// every whole-puzzle rotation of the canonical solved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalSet {
    canonical: StateKey,
    keys: HashSet<StateKey>,
}

impl GoalSet {
    /// The canonical solved key, which potentials are measured against.
    pub fn canonical(&self) -> &StateKey {
        &self.canonical
    }

    /// Whether `key` is solved.
    pub fn contains(&self, key: &StateKey) -> bool {
        self.keys.contains(key)
    }

    /// Number of solved keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false, a goal set holds at least the canonical key.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// A puzzle model with its moves precomputed as slot transforms.
#[derive(Debug, Clone)]
pub struct Puzzle {
    kind: PuzzleKind,
    encoding: Encoding,
    slots: usize,
    order: u8,
    moves: Box<[PuzzleMove]>,
    transforms: Box<[Transform]>,
    rotations: Box<[Transform]>,
}

impl Puzzle {
    /// Build a puzzle. `goal` names the marked piece of index-encoded puzzles (default
    /// [`DEFAULT_GOAL`]) and must be `None` for the others.
    pub fn new(kind: PuzzleKind, goal: Option<u16>) -> Result<Self, InvalidPuzzleError> {
        let (slots, order, encoding, moves, transforms, rotations) = match kind {
            PuzzleKind::MarkedCorner | PuzzleKind::CornerPermutation | PuzzleKind::Corners => {
                let (order, face_moves): (u8, &[FaceMove]) = if kind == PuzzleKind::Corners {
                    (cube2::TWIST_ORDER, &FaceMove::QUARTER[..])
                } else {
                    (1, &FaceMove::CLOCKWISE[..])
                };
                let encoding = match kind {
                    PuzzleKind::MarkedCorner => Encoding::Index {
                        marked: marked(goal, cube2::CORNERS)?,
                    },
                    _ if goal.is_some() => return Err(InvalidPuzzleError::GoalNotSupported),
                    PuzzleKind::CornerPermutation => Encoding::Permutation,
                    _ => Encoding::PermutationOrientation,
                };
                let rotations = match encoding {
                    Encoding::Index { .. } => Vec::new(),
                    _ => cube2::rotations(order).to_vec(),
                };
                (
                    cube2::CORNERS,
                    order,
                    encoding,
                    face_moves.iter().map(|&m| PuzzleMove::Face(m)).collect::<Vec<_>>(),
                    face_moves.iter().map(|m| m.transform(order)).collect::<Vec<_>>(),
                    rotations,
                )
            }
            PuzzleKind::Grid(dims) => {
                for size in [dims.x, dims.y, dims.z] {
                    if !(grid::MIN_DIM..=grid::MAX_DIM).contains(&size) {
                        return Err(InvalidPuzzleError::GridDimension {
                            size,
                            min: grid::MIN_DIM,
                            max: grid::MAX_DIM,
                        });
                    }
                }
                let slice_moves = dims.moves();
                (
                    dims.slot_count(),
                    1,
                    Encoding::Index {
                        marked: marked(goal, dims.slot_count())?,
                    },
                    slice_moves.iter().map(|&m| PuzzleMove::Slice(m)).collect::<Vec<_>>(),
                    slice_moves.iter().map(|m| m.transform(dims)).collect::<Vec<_>>(),
                    Vec::new(),
                )
            }
        };

        Ok(Self {
            kind,
            encoding,
            slots,
            order,
            moves: moves.into_boxed_slice(),
            transforms: transforms.into_boxed_slice(),
            rotations: rotations.into_boxed_slice(),
        })
    }

    /// Which model this is.
    pub fn kind(&self) -> PuzzleKind {
        self.kind
    }

    /// How states of this puzzle are keyed.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Number of slots.
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Orientation group order (1 when twists are not tracked).
    pub fn orientation_order(&self) -> u8 {
        self.order
    }

    /// The legal moves, in the stable order used to index Q-table rows.
    pub fn moves(&self) -> &[PuzzleMove] {
        &self.moves
    }

    /// The position of `mv` in [`moves`](Self::moves). Both directions of a half-turn grid
    /// layer name the listed move, so the inverse of every legal move is legal.
    pub fn move_index(&self, mv: PuzzleMove) -> Option<usize> {
        let mv = self.canonical_move(mv);
        self.moves.iter().position(|&m| m == mv)
    }

    fn canonical_move(&self, mv: PuzzleMove) -> PuzzleMove {
        match (mv, self.kind) {
            // half turns are listed once, as the positive direction
            (PuzzleMove::Slice(m), PuzzleKind::Grid(dims)) if !dims.is_square(m.axis) => SliceMove {
                direction: Direction::Positive,
                ..m
            }
            .into(),
            _ => mv,
        }
    }

    /// The slot transform of the move at `index`.
    pub fn transform(&self, index: usize) -> &Transform {
        &self.transforms[index]
    }

    /// The canonical solved configuration.
    pub fn solved(&self) -> PuzzleState {
        PuzzleState::solved(self.slots)
    }

    /// Encode a configuration, failing when it does not have this puzzle's slot count.
    pub fn encode(&self, state: &PuzzleState) -> Result<StateKey, InvalidStateError> {
        if state.len() != self.slots {
            return Err(InvalidStateError::WrongLength {
                expected: self.slots,
                found: state.len(),
            });
        }
        self.encoding.encode(state)
    }

    /// Encode a state produced by this puzzle's own moves.
    pub(crate) fn key(&self, state: &PuzzleState) -> StateKey {
        self.encode(state)
            .expect("states reached through the puzzle's transforms have its slot count")
    }

    /// Decode and validate a key of this puzzle.
    pub fn decode(&self, key: &StateKey) -> Result<PuzzleState, InvalidStateError> {
        self.encoding.decode(key, self.slots, self.order)
    }

    /// Apply a move to a state.
    pub fn step(&self, state: &PuzzleState, mv: PuzzleMove) -> Result<PuzzleState, Error> {
        let index = self.move_index(mv).ok_or(Error::IllegalMove(mv))?;
        Ok(self.step_index(state, index)?)
    }

    /// Apply the move at `index` in [`moves`](Self::moves) to a state.
    pub fn step_index(&self, state: &PuzzleState, index: usize) -> Result<PuzzleState, InvalidStateError> {
        self.transforms[index].apply(state)
    }

    /// Every key equivalent to the canonical solved one, closed under the puzzle's whole-puzzle
    /// rotations.
    pub fn goal_set(&self) -> GoalSet {
        let solved = self.solved();
        let canonical = self.key(&solved);

        let mut keys = HashSet::from([canonical.clone()]);
        let mut stack = vec![solved];
        while let Some(state) = stack.pop() {
            for rotation in self.rotations.iter() {
                let Ok(next) = rotation.apply(&state) else {
                    continue;
                };
                if keys.insert(self.key(&next)) {
                    stack.push(next);
                }
            }
        }

        GoalSet { canonical, keys }
    }

    /// Draw an unsolved start configuration. Index-encoded puzzles pick the marked piece's slot
    /// uniformly; the others scramble the solved state with `depth` random moves, continuing
    /// until the result leaves the goal set.
    pub fn random_start<R: Rng + ?Sized>(&self, goals: &GoalSet, depth: usize, rng: &mut R) -> PuzzleState {
        match self.encoding {
            Encoding::Index { marked } => {
                let goal = marked as usize;
                // every slot but the goal, uniformly
                let mut slot = rng.gen_range(0..self.slots - 1);
                if slot >= goal {
                    slot += 1;
                }
                self.solved().swap(goal, slot)
            }
            _ => {
                let mut state = self.solved();
                let mut applied = 0;
                while applied < depth || goals.contains(&self.key(&state)) {
                    let index = rng.gen_range(0..self.moves.len());
                    state = self.transforms[index]
                        .apply(&state)
                        .expect("transforms match the puzzle's slot count");
                    applied += 1;
                }
                state
            }
        }
    }

    /// Number of pieces in `key` matching the canonical goal.
    pub fn potential(&self, key: &StateKey, goals: &GoalSet) -> usize {
        self.encoding.potential(key, goals.canonical())
    }
}

fn marked(goal: Option<u16>, slots: usize) -> Result<u16, InvalidPuzzleError> {
    let goal = goal.unwrap_or(DEFAULT_GOAL);
    if goal as usize >= slots {
        return Err(InvalidPuzzleError::GoalOutOfRange { goal, slots });
    }
    Ok(goal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube2::Face;
    use crate::grid::{Axis, Direction};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn goal_set_sizes() {
        let marked = Puzzle::new(PuzzleKind::MarkedCorner, None).unwrap();
        assert_eq!(marked.goal_set().len(), 1);
        assert_eq!(marked.goal_set().canonical().values(), &[DEFAULT_GOAL]);

        // the 24 orientations of a cube
        let perm = Puzzle::new(PuzzleKind::CornerPermutation, None).unwrap();
        assert_eq!(perm.goal_set().len(), 24);
        let corners = Puzzle::new(PuzzleKind::Corners, None).unwrap();
        assert_eq!(corners.goal_set().len(), 24);

        let grid = Puzzle::new(PuzzleKind::Grid(Dims { x: 3, y: 3, z: 3 }), Some(13)).unwrap();
        assert_eq!(grid.goal_set().len(), 1);
    }

    #[test]
    fn encode_rejects_states_of_another_puzzle() {
        let short = PuzzleState::solved(3);
        for kind in [PuzzleKind::MarkedCorner, PuzzleKind::CornerPermutation, PuzzleKind::Corners] {
            let puzzle = Puzzle::new(kind, None).unwrap();
            assert_eq!(
                puzzle.encode(&short),
                Err(InvalidStateError::WrongLength {
                    expected: 8,
                    found: 3
                })
            );
        }
    }

    #[test]
    fn rotations_are_solved_but_turns_are_not() {
        let corners = Puzzle::new(PuzzleKind::Corners, None).unwrap();
        let goals = corners.goal_set();
        let r = corners
            .step(&corners.solved(), FaceMove::new(Face::R).into())
            .unwrap();
        assert!(!goals.contains(&corners.encode(&r).unwrap()));
        let x = corners
            .step(&r, FaceMove::prime(Face::L).into())
            .unwrap();
        assert!(goals.contains(&corners.encode(&x).unwrap()));
    }

    #[test]
    fn move_sets() {
        let marked = Puzzle::new(PuzzleKind::MarkedCorner, None).unwrap();
        assert_eq!(marked.moves().len(), 6);
        assert_eq!(marked.slots(), 8);
        assert_eq!(Puzzle::new(PuzzleKind::Corners, None).unwrap().moves().len(), 12);
        let grid = Puzzle::new(PuzzleKind::Grid(Dims::default()), None).unwrap();
        assert_eq!(grid.moves().len(), 12);
        assert_eq!(grid.move_index(grid.moves()[5]), Some(5));
    }

    #[test]
    fn half_turns_are_listed_once() {
        // only the z layers are square
        let grid = Puzzle::new(PuzzleKind::Grid(Dims { x: 2, y: 2, z: 3 }), None).unwrap();
        let x0 = SliceMove::new(Axis::X, 0, Direction::Positive);
        let index = grid.move_index(x0.into());
        assert!(index.is_some());
        assert_eq!(grid.move_index(x0.inverse().into()), index);

        let z0 = SliceMove::new(Axis::Z, 0, Direction::Positive);
        assert_ne!(grid.move_index(z0.inverse().into()), grid.move_index(z0.into()));
        assert!(grid.move_index(z0.inverse().into()).is_some());
    }

    #[test]
    fn construction_errors() {
        assert_eq!(
            Puzzle::new(PuzzleKind::MarkedCorner, Some(8)).unwrap_err(),
            InvalidPuzzleError::GoalOutOfRange { goal: 8, slots: 8 }
        );
        assert_eq!(
            Puzzle::new(PuzzleKind::Corners, Some(0)).unwrap_err(),
            InvalidPuzzleError::GoalNotSupported
        );
        assert!(matches!(
            Puzzle::new(PuzzleKind::Grid(Dims { x: 2, y: 9, z: 2 }), None),
            Err(InvalidPuzzleError::GridDimension { size: 9, .. })
        ));
    }

    #[test]
    fn illegal_moves_are_reported() {
        let marked = Puzzle::new(PuzzleKind::MarkedCorner, None).unwrap();
        let slice = PuzzleMove::Slice(SliceMove::new(Axis::X, 0, Direction::Positive));
        assert_eq!(
            marked.step(&marked.solved(), slice),
            Err(Error::IllegalMove(slice))
        );
        // prime turns are not part of the clockwise move set
        let prime = PuzzleMove::Face(FaceMove::prime(Face::U));
        assert!(marked.step(&marked.solved(), prime).is_err());
    }

    #[test]
    fn step_rejects_malformed_state() {
        let marked = Puzzle::new(PuzzleKind::MarkedCorner, None).unwrap();
        assert!(matches!(
            marked.step_index(&PuzzleState::solved(5), 0),
            Err(InvalidStateError::WrongLength { expected: 8, found: 5 })
        ));
    }

    #[test]
    fn potentials() {
        let corners = Puzzle::new(PuzzleKind::Corners, None).unwrap();
        let goals = corners.goal_set();
        assert_eq!(corners.potential(goals.canonical(), &goals), 8);
        let u = corners
            .step(&corners.solved(), FaceMove::new(Face::U).into())
            .unwrap();
        assert_eq!(corners.potential(&corners.encode(&u).unwrap(), &goals), 4);
    }

    #[test]
    fn random_starts_are_unsolved() {
        let mut rng = StdRng::seed_from_u64(3);
        for kind in [PuzzleKind::MarkedCorner, PuzzleKind::CornerPermutation, PuzzleKind::Corners] {
            let puzzle = Puzzle::new(kind, None).unwrap();
            let goals = puzzle.goal_set();
            for _ in 0..200 {
                let start = puzzle.random_start(&goals, 0, &mut rng);
                assert!(!goals.contains(&puzzle.encode(&start).unwrap()));
            }
        }

        // every non-goal slot is drawn
        let marked = Puzzle::new(PuzzleKind::MarkedCorner, Some(0)).unwrap();
        let goals = marked.goal_set();
        let mut seen = HashSet::new();
        for _ in 0..500 {
            seen.insert(marked.key(&marked.random_start(&goals, 0, &mut rng)));
        }
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn every_move_round_trips_on_every_variant() {
        let kinds = [
            PuzzleKind::MarkedCorner,
            PuzzleKind::CornerPermutation,
            PuzzleKind::Corners,
            PuzzleKind::Grid(Dims { x: 2, y: 3, z: 3 }),
        ];
        for kind in kinds {
            let puzzle = Puzzle::new(kind, None).unwrap();
            // a deterministic walk through a few states
            let mut state = puzzle.solved();
            for (n, &mv) in puzzle.moves().iter().enumerate().cycle().take(40) {
                let there = puzzle.step(&state, mv).unwrap();
                let back = puzzle.transform(n).inverse().apply(&there).unwrap();
                assert_eq!(back, state, "{kind:?} {mv}");
                state = there;
            }
        }
    }
}
