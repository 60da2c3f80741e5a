//! Uniform spatial grid for neighbor queries.
//!
//! The grid covers the viewport with a fixed number of columns and rows and
//! is rebuilt from scratch for every relaxation pass. Each particle is stored
//! in exactly one cell (the one containing its center); queries over-fetch by
//! scanning every cell within `radius * QUERY_RADIUS_SCALE` of the query
//! point, which absorbs most of the error from single-cell insertion.

use glam::Vec2;

use crate::store::{ParticleRef, ParticleStore, Population};

/// Cells never shrink below this many pixels on either axis.
pub const MIN_CELL_SIZE: f32 = 8.0;
/// Query box half-extent as a multiple of the particle radius.
pub const QUERY_RADIUS_SCALE: f32 = 2.5;

/// Grid dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialConfig {
    pub cols: u32,
    pub rows: u32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self { cols: 48, rows: 32 }
    }
}

impl SpatialConfig {
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
        }
    }

    /// Total number of cells in the grid
    pub fn total_cells(&self) -> usize {
        self.cols as usize * self.rows as usize
    }
}

/// Bucket grid of particle references.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    config: SpatialConfig,
    cell_width: f32,
    cell_height: f32,
    cells: Vec<Vec<ParticleRef>>,
}

impl SpatialGrid {
    pub fn new(config: SpatialConfig, width: f32, height: f32) -> Self {
        let mut grid = Self {
            config,
            cell_width: MIN_CELL_SIZE,
            cell_height: MIN_CELL_SIZE,
            cells: vec![Vec::new(); config.total_cells()],
        };
        grid.resize(width, height);
        grid
    }

    /// Recompute cell dimensions for a new viewport.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.cell_width = (width / self.config.cols as f32).max(MIN_CELL_SIZE);
        self.cell_height = (height / self.config.rows as f32).max(MIN_CELL_SIZE);
        self.clear();
    }

    pub fn cell_size(&self) -> Vec2 {
        Vec2::new(self.cell_width, self.cell_height)
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Column and row of the cell containing `position`, clamped to the grid.
    #[inline]
    pub fn cell_of(&self, position: Vec2) -> (u32, u32) {
        (
            Self::axis_cell(position.x, self.cell_width, self.config.cols),
            Self::axis_cell(position.y, self.cell_height, self.config.rows),
        )
    }

    #[inline]
    fn axis_cell(coord: f32, size: f32, count: u32) -> u32 {
        let cell = (coord / size).floor();
        if cell.is_nan() || cell < 0.0 {
            0
        } else {
            (cell as u32).min(count - 1)
        }
    }

    #[inline]
    fn cell_index(&self, col: u32, row: u32) -> usize {
        row as usize * self.config.cols as usize + col as usize
    }

    fn insert(&mut self, position: Vec2, r: ParticleRef) {
        let (col, row) = self.cell_of(position);
        let index = self.cell_index(col, row);
        self.cells[index].push(r);
    }

    /// Clear and re-insert every settled and frozen particle, plus the active
    /// ones when `include_active` is set.
    pub fn rebuild(&mut self, store: &ParticleStore, include_active: bool) {
        self.clear();
        for (i, flake) in store.settled().iter().enumerate() {
            self.insert(flake.position(), ParticleRef::new(Population::Settled, i));
        }
        for (i, flake) in store.frozen().iter().enumerate() {
            self.insert(flake.position(), ParticleRef::new(Population::Frozen, i));
        }
        if include_active {
            for (i, flake) in store.active().iter().enumerate() {
                self.insert(flake.position, ParticleRef::new(Population::Active, i));
            }
        }
    }

    /// Every reference stored in the cells overlapping the query box around
    /// `position`. Entries are not deduplicated and may include the querying
    /// particle itself.
    pub fn neighbors(&self, position: Vec2, radius: f32) -> impl Iterator<Item = ParticleRef> + '_ {
        let reach = radius * QUERY_RADIUS_SCALE;
        let (min_col, min_row) = self.cell_of(position - Vec2::splat(reach));
        let (max_col, max_row) = self.cell_of(position + Vec2::splat(reach));
        (min_row..=max_row).flat_map(move |row| {
            (min_col..=max_col)
                .flat_map(move |col| self.cells[self.cell_index(col, row)].iter().copied())
        })
    }

    /// Number of references currently stored.
    pub fn len(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_size_floor() {
        let grid = SpatialGrid::new(SpatialConfig::new(48, 32), 40.0, 0.0);
        assert_eq!(grid.cell_size(), Vec2::splat(MIN_CELL_SIZE));

        let grid = SpatialGrid::new(SpatialConfig::new(10, 10), 1000.0, 500.0);
        assert_eq!(grid.cell_size(), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_cell_of_clamps() {
        let grid = SpatialGrid::new(SpatialConfig::new(10, 10), 100.0, 100.0);
        assert_eq!(grid.cell_of(Vec2::new(-30.0, -1.0)), (0, 0));
        assert_eq!(grid.cell_of(Vec2::new(1e6, 99.9)), (9, 9));
        assert_eq!(grid.cell_of(Vec2::new(25.0, 55.0)), (2, 5));
        assert_eq!(grid.cell_of(Vec2::new(f32::NAN, 5.0)), (0, 0));
    }

    #[test]
    fn test_rebuild_with_and_without_active() {
        let mut store = ParticleStore::new(20, None, 200.0, 200.0, Some(1));
        store.populate();
        store.push_settled_at(Vec2::new(50.0, 195.0), 2.0);

        let mut grid = SpatialGrid::new(SpatialConfig::new(8, 8), 200.0, 200.0);
        grid.rebuild(&store, false);
        assert_eq!(grid.len(), 1);

        grid.rebuild(&store, true);
        assert_eq!(grid.len(), 21);
    }

    #[test]
    fn test_neighbors_covers_query_box() {
        let mut store = ParticleStore::new(0, None, 100.0, 100.0, Some(1));
        store.push_settled_at(Vec2::new(50.0, 50.0), 2.0);
        store.push_settled_at(Vec2::new(58.0, 50.0), 2.0);
        store.push_settled_at(Vec2::new(95.0, 95.0), 2.0);

        let mut grid = SpatialGrid::new(SpatialConfig::new(10, 10), 100.0, 100.0);
        grid.rebuild(&store, false);

        let found: Vec<_> = grid.neighbors(Vec2::new(52.0, 50.0), 2.0).collect();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|r| r.population == Population::Settled));
        assert!(!found.iter().any(|r| r.index == 2));
    }
}
