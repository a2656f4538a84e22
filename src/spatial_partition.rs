//! Spatial grid over decoy positions for proximity queries.
//!
//! Decoys never move after spawn, so the grid is built once per session and
//! queried every frame by the collision pass.  Lookups are O(1) per cell and
//! return candidate indices; callers do the exact distance check themselves
//! (the grid is a conservative over-approximation).
//!
//! ## Cell Size Choice
//!
//! Cell size must be at least the query radius so a query only ever touches
//! the 3×3×3 block around the player.  With a 10 u cell and a 3.5 u collision
//! threshold the player checks 27 cells holding a handful of rocks, instead of
//! all 400.

use bevy::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct DecoyGrid {
    cell_size: f32,
    /// Map from cell coordinates to decoy indices, ascending within each cell.
    cells: HashMap<(i32, i32, i32), Vec<usize>>,
}

impl DecoyGrid {
    /// Build the grid from decoy positions in index order.
    pub fn build(cell_size: f32, positions: impl IntoIterator<Item = Vec3>) -> Self {
        let mut grid = Self {
            cell_size,
            cells: HashMap::new(),
        };
        for (index, pos) in positions.into_iter().enumerate() {
            grid.insert(index, pos);
        }
        grid
    }

    /// Compute grid cell coordinates for a world position
    fn world_to_cell(&self, pos: Vec3) -> (i32, i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
            (pos.z / self.cell_size).floor() as i32,
        )
    }

    fn insert(&mut self, index: usize, pos: Vec3) {
        let cell = self.world_to_cell(pos);
        self.cells.entry(cell).or_default().push(index);
    }

    /// Decoy indices in cells that overlap the sphere around `pos`, sorted
    /// ascending so callers iterating the result keep spawn order.
    pub fn candidates(&self, pos: Vec3, max_distance: f32) -> Vec<usize> {
        let cell = self.world_to_cell(pos);
        let reach = self.radius_in_cells(max_distance);

        let mut found = Vec::new();
        for dx in -reach..=reach {
            for dy in -reach..=reach {
                for dz in -reach..=reach {
                    if let Some(indices) = self.cells.get(&(cell.0 + dx, cell.1 + dy, cell.2 + dz)) {
                        found.extend_from_slice(indices);
                    }
                }
            }
        }
        found.sort_unstable();
        found
    }

    /// Compute how many cells in each direction we need to check for a given max distance
    fn radius_in_cells(&self, max_distance: f32) -> i32 {
        ((max_distance / self.cell_size).ceil() as i32).max(1)
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
