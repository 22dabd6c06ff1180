//! Reusable dynamic-programming tables.

/// Dense row-major table of `f64`.
///
/// The forest-distance table is allocated once per tree pair at its largest
/// possible size and re-viewed with a smaller shape for each keyroot pair,
/// so the inner loops never allocate.
#[derive(Debug, Clone)]
pub(crate) struct ForestBuffer {
    cells: Vec<f64>,
    cols: usize,
}

impl ForestBuffer {
    /// Allocates room for a `rows x cols` table.
    pub(crate) fn with_capacity(rows: usize, cols: usize) -> Self {
        Self {
            cells: vec![0.0; rows * cols],
            cols,
        }
    }

    /// Re-views the buffer as a `rows x cols` table.
    ///
    /// Cells keep stale values; callers overwrite every cell they read.
    pub(crate) fn reshape(&mut self, rows: usize, cols: usize) {
        debug_assert!(rows * cols <= self.cells.len(), "forest view exceeds buffer");
        self.cols = cols;
    }

    #[inline]
    pub(crate) fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[row * self.cols + col]
    }

    #[inline]
    pub(crate) fn set(&mut self, row: usize, col: usize, value: f64) {
        self.cells[row * self.cols + col] = value;
    }
}
