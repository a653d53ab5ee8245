use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Row-major 2-D grid of per-position values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plate<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T> Plate<T> {
    pub fn new(rows: usize, cols: usize, cells: Vec<T>) -> Result<Self> {
        if rows.checked_mul(cols) != Some(cells.len()) {
            bail!(
                "plate shape {}x{} does not match {} positions",
                rows,
                cols,
                cells.len()
            );
        }
        Ok(Self { rows, cols, cells })
    }

    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(f(row, col));
            }
        }
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<T> {
        self.cells
    }

    /// `(row, col, value)` in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        let cols = self.cols.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, v)| (i / cols, i % cols, v))
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Plate<U> {
        Plate {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(f).collect(),
        }
    }

    /// Pairs two plates of the same shape position by position.
    pub fn zip_map<U, V>(&self, other: &Plate<U>, mut f: impl FnMut(&T, &U) -> V) -> Result<Plate<V>> {
        if self.rows != other.rows || self.cols != other.cols {
            bail!(
                "plate shapes differ: {}x{} vs {}x{}",
                self.rows,
                self.cols,
                other.rows,
                other.cols
            );
        }
        Ok(Plate {
            rows: self.rows,
            cols: self.cols,
            cells: self
                .cells
                .iter()
                .zip(&other.cells)
                .map(|(a, b)| f(a, b))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_row_major() {
        let plate = Plate::from_fn(2, 3, |r, c| r * 10 + c);
        let seen: Vec<(usize, usize, usize)> =
            plate.positions().map(|(r, c, &v)| (r, c, v)).collect();
        assert_eq!(seen[4], (1, 1, 11));
        assert_eq!(plate.get(1, 2), Some(&12));
        assert_eq!(plate.get(2, 0), None);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        assert!(Plate::new(2, 2, vec![0; 3]).is_err());
    }
}
