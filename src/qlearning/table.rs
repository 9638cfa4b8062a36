use std::collections::HashMap;

use crate::encoding::StateKey;

/// Learned action values, one row per visited state.
///
/// Every row holds one value per legal move, indexed like [`Puzzle::moves`]. Rows are created
/// whole, with every move set to the table's initial value, so a row is never observed with
/// some moves missing.
///
/// [`Puzzle::moves`]: crate::puzzle::Puzzle::moves
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    rows: HashMap<StateKey, Box<[f64]>>,
    width: usize,
    init: f64,
}

impl QTable {
    /// An empty table for a puzzle with `width` moves.
    pub fn new(width: usize, init: f64) -> Self {
        Self {
            rows: HashMap::new(),
            width,
            init,
        }
    }

    /// Number of moves per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The value unvisited moves start with.
    pub fn init(&self) -> f64 {
        self.init
    }

    /// The row of `key`, if the state has been visited.
    pub fn row(&self, key: &StateKey) -> Option<&[f64]> {
        self.rows.get(key).map(|r| &r[..])
    }

    /// The row of `key`, created if the state has not been visited.
    pub fn row_or_insert(&mut self, key: &StateKey) -> &mut [f64] {
        let (width, init) = (self.width, self.init);
        self.rows
            .entry(key.clone())
            .or_insert_with(|| vec![init; width].into_boxed_slice())
    }

    /// One-step Q-learning update of `(key, action)` towards `reward` plus the discounted best
    /// value of `next`. `next` is `None` for terminal transitions, which do not bootstrap.
    /// Returns the updated value.
    pub fn update(
        &mut self,
        key: &StateKey,
        action: usize,
        reward: f64,
        next: Option<&StateKey>,
        alpha: f64,
        gamma: f64,
    ) -> f64 {
        let future = match next {
            Some(next) => max_value(self.row_or_insert(next)),
            None => 0.0,
        };
        let q = &mut self.row_or_insert(key)[action];
        *q += alpha * (reward + gamma * future - *q);
        *q
    }

    /// Number of visited states.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no state has been visited.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Mean of every stored value, or zero for an empty table.
    pub fn mean_value(&self) -> f64 {
        let count = self.rows.len() * self.width;
        if count == 0 {
            return 0.0;
        }
        self.rows.values().flat_map(|r| r.iter()).sum::<f64>() / count as f64
    }

    /// Iterate over visited states and their rows.
    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &[f64])> {
        self.rows.iter().map(|(k, r)| (k, &r[..]))
    }

    /// Drop every row.
    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

fn max_value(row: &[f64]) -> f64 {
    row.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// The greedy move of a row: the lowest index holding the maximal value. Ties therefore always
/// go to the move listed first by the puzzle.
pub fn best_action(row: &[f64]) -> usize {
    let mut best = 0;
    for (i, &q) in row.iter().enumerate().skip(1) {
        if q > row[best] {
            best = i;
        }
    }
    best
}
