//! Square score matrices keyed by entity identifier.
//!
//! Cells are `Option<f64>`: a pair without data stays undefined instead
//! of collapsing to zero, so means and rankings only ever see real
//! scores. The diagonal is the one exception — it is set explicitly to
//! the metric's self-comparison constant.

use rustc_hash::FxHashMap;
use std::cmp::Ordering;

use crate::metric::Metric;

/// Ordered (entity, mean score) pairs, best first.
pub type Ranking = Vec<(String, f64)>;

#[derive(Debug, Clone)]
pub struct ScoreMatrix {
    entities: Vec<String>,
    index: FxHashMap<String, usize>,
    cells: Vec<Option<f64>>,
}

impl ScoreMatrix {
    /// Empty (all-undefined) matrix over the given entity order.
    pub fn new(entities: Vec<String>) -> Self {
        let index = entities
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        let n = entities.len();
        Self {
            entities,
            index,
            cells: vec![None; n * n],
        }
    }

    /// Fully-defined matrix from per-entity rows. Rows must already be
    /// square against the entity list.
    pub fn from_rows(entities: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == entities.len()));
        let mut matrix = Self::new(entities);
        for (i, row) in rows.into_iter().enumerate() {
            for (j, value) in row.into_iter().enumerate() {
                matrix.set_at(i, j, value);
            }
        }
        matrix
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn position(&self, entity: &str) -> Option<usize> {
        self.index.get(entity).copied()
    }

    pub fn get_at(&self, row: usize, col: usize) -> Option<f64> {
        self.cells[row * self.entities.len() + col]
    }

    pub fn set_at(&mut self, row: usize, col: usize, value: f64) {
        let n = self.entities.len();
        self.cells[row * n + col] = Some(value);
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.position(a)?;
        let j = self.position(b)?;
        self.get_at(i, j)
    }

    /// Sets both (a, b) and (b, a). Returns false when either entity is
    /// unknown, leaving the matrix untouched.
    pub fn set_symmetric(&mut self, a: &str, b: &str, value: f64) -> bool {
        match (self.position(a), self.position(b)) {
            (Some(i), Some(j)) => {
                self.set_at(i, j, value);
                self.set_at(j, i, value);
                true
            }
            _ => false,
        }
    }

    /// Forces every self-comparison cell to the given constant.
    pub fn fill_diagonal(&mut self, value: f64) {
        for i in 0..self.entities.len() {
            self.set_at(i, i, value);
        }
    }

    /// Mean over the defined cells of one row; `None` when the entire
    /// row is undefined.
    pub fn row_mean(&self, row: usize) -> Option<f64> {
        let n = self.entities.len();
        let defined: Vec<f64> = self.cells[row * n..(row + 1) * n]
            .iter()
            .flatten()
            .copied()
            .collect();
        if defined.is_empty() {
            None
        } else {
            Some(defined.iter().sum::<f64>() / defined.len() as f64)
        }
    }

    /// Largest |v(a,b) - v(b,a)| over mirror pairs where both cells are
    /// defined. Zero for a well-formed report.
    pub fn max_asymmetry(&self) -> f64 {
        let n = self.entities.len();
        let mut worst = 0.0f64;
        for i in 0..n {
            for j in (i + 1)..n {
                if let (Some(a), Some(b)) = (self.get_at(i, j), self.get_at(j, i)) {
                    worst = worst.max((a - b).abs());
                }
            }
        }
        worst
    }
}

/// Per-entity mean scores, sorted by the metric's improving direction.
/// Ties are broken by entity identifier so the ordering never depends
/// on discovery order. Entities whose whole row is undefined are left
/// out.
pub fn rank_entities(matrix: &ScoreMatrix, metric: Metric) -> Ranking {
    let mut ranked: Ranking = matrix
        .entities()
        .iter()
        .enumerate()
        .filter_map(|(i, id)| matrix.row_mean(i).map(|mean| (id.clone(), mean)))
        .collect();

    ranked.sort_by(|a, b| {
        let by_score = if metric.higher_is_better() {
            b.1.partial_cmp(&a.1)
        } else {
            a.1.partial_cmp(&b.1)
        }
        .unwrap_or(Ordering::Equal);
        by_score.then_with(|| a.0.cmp(&b.0))
    });
    ranked
}
