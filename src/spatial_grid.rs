/*
 * Spatial Grid Module
 *
 * This module defines the SpatialGrid struct for neighbor lookups.
 * It hashes the simulation space into uniform cubic cells so that a query
 * only has to look at the cells around an agent instead of the whole flock.
 *
 * The grid stores indices into a population it does not own. It is cleared
 * and refilled from scratch every tick; a query returns every agent in the
 * visited cells, so callers still filter by exact distance.
 */

use std::collections::HashMap;

use glam::{IVec3, Vec3};

use crate::error::FlockError;
use crate::neighbors::NeighborQuery;
use crate::params::Bounds;

/// Integer lattice coordinate of a cell.
pub type CellCoord = IVec3;

/// Largest query reach, in cells on each side of the origin cell, that a
/// flock configuration may ask for. A query at this reach walks `65^3` cells.
pub const MAX_QUERY_REACH: u32 = 32;

/// Reach in cells of a query of `radius`, or an error when it exceeds
/// `MAX_QUERY_REACH`.
pub fn query_reach(cell_size: f32, radius: f32) -> Result<u32, FlockError> {
    let cells = (radius / cell_size).ceil().max(0.0);
    // Also rejects NaN
    if !(cells <= MAX_QUERY_REACH as f32) {
        return Err(FlockError::QueryTooWide {
            radius,
            cell_size,
            max_cells: MAX_QUERY_REACH,
        });
    }
    Ok(cells as u32)
}

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    pub cell_size: f32,
    pub bounds: Bounds,
    cells: HashMap<CellCoord, Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32, bounds: Bounds) -> Result<Self, FlockError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(FlockError::InvalidCellSize(cell_size));
        }
        bounds.validate()?;

        Ok(Self {
            cell_size,
            bounds,
            cells: HashMap::new(),
        })
    }

    // Convert a world position to the coordinate of the cell containing it
    #[inline]
    pub fn cell_coord(&self, position: Vec3) -> CellCoord {
        ((position + self.bounds.half_extents()) / self.cell_size)
            .floor()
            .as_ivec3()
    }

    // World-space center of a cell, used to draw visited cells
    #[inline]
    pub fn cell_center(&self, coord: CellCoord) -> Vec3 {
        (coord.as_vec3() + Vec3::splat(0.5)) * self.cell_size - self.bounds.half_extents()
    }

    // Clear the grid
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    // Insert an agent into the bucket of the cell containing `position`
    #[inline]
    pub fn insert(&mut self, index: usize, position: Vec3) {
        let coord = self.cell_coord(position);
        self.cells.entry(coord).or_default().push(index);
    }

    // Clear and insert every position once; index i refers to positions[i]
    pub fn rebuild<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = Vec3>,
    {
        self.clear();
        for (index, position) in positions.into_iter().enumerate() {
            self.insert(index, position);
        }
    }

    pub fn bucket(&self, coord: CellCoord) -> &[usize] {
        self.cells.get(&coord).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.values().filter(|bucket| !bucket.is_empty()).count()
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of cells on each side of the origin cell a query of `radius`
    /// visits. Saturates for radii far beyond the grid.
    #[inline]
    pub fn radius_in_cells(&self, radius: f32) -> u32 {
        (radius / self.cell_size).ceil().max(0.0) as u32
    }

    pub fn check_reach(&self, radius: f32) -> Result<u32, FlockError> {
        query_reach(self.cell_size, radius)
    }

    /// Every agent in the `(2r+1)^3` block of cells around `position`,
    /// excluding `index` itself.
    ///
    /// Past `MAX_QUERY_REACH` the cube is not walked; only occupied cells
    /// inside it are visited, which yields the same candidates.
    pub fn query(&self, index: usize, position: Vec3, radius: f32) -> NeighborQuery {
        let origin = self.cell_coord(position);
        let reach = self.radius_in_cells(radius);
        let mut result = NeighborQuery::default();

        if reach > MAX_QUERY_REACH {
            let reach = i64::from(reach);
            for (coord, bucket) in &self.cells {
                let offset = coord.as_i64vec3() - origin.as_i64vec3();
                if offset.abs().max_element() <= reach {
                    result.visited_cells.push(*coord);
                    result
                        .candidates
                        .extend(bucket.iter().copied().filter(|&other| other != index));
                }
            }
            return result;
        }

        let r = reach as i32;
        for z in -r..=r {
            for y in -r..=r {
                for x in -r..=r {
                    let coord = origin.wrapping_add(IVec3::new(x, y, z));
                    result.visited_cells.push(coord);

                    if let Some(bucket) = self.cells.get(&coord) {
                        result
                            .candidates
                            .extend(bucket.iter().copied().filter(|&other| other != index));
                    }
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> SpatialGrid {
        SpatialGrid::new(5.0, Bounds::new(30.0, 15.0, 30.0)).expect("valid grid")
    }

    #[test]
    fn rejects_non_positive_cell_size() {
        let bounds = Bounds::default();
        assert!(SpatialGrid::new(0.0, bounds).is_err());
        assert!(SpatialGrid::new(-2.0, bounds).is_err());
        assert!(SpatialGrid::new(f32::NAN, bounds).is_err());
    }

    #[test]
    fn cell_coord_offsets_by_half_bounds() {
        let grid = grid();
        assert_eq!(grid.cell_coord(Vec3::ZERO), IVec3::new(3, 1, 3));
        assert_eq!(grid.cell_coord(Vec3::new(-15.0, -7.5, -15.0)), IVec3::ZERO);
        // Outside the box still maps somewhere, just off the nominal lattice
        assert_eq!(grid.cell_coord(Vec3::new(-16.0, 0.0, 0.0)).x, -1);
    }

    #[test]
    fn single_agent_at_origin_visits_27_cells() {
        let mut grid = grid();
        grid.rebuild([Vec3::ZERO]);

        let query = grid.query(0, Vec3::ZERO, 4.0);
        assert_eq!(query.visited_cells.len(), 27);
        assert!(query.candidates.is_empty());
    }

    #[test]
    fn visited_cells_are_distinct() {
        let grid = grid();
        let query = grid.query(0, Vec3::ZERO, 12.0);
        let unique: std::collections::HashSet<_> = query.visited_cells.iter().collect();
        assert_eq!(unique.len(), query.visited_cells.len());
        assert_eq!(query.visited_cells.len(), 7 * 7 * 7);
    }

    #[test]
    fn zero_radius_visits_only_own_cell() {
        let mut grid = grid();
        grid.rebuild([Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(6.0, 0.0, 0.0)]);

        let query = grid.query(0, Vec3::ZERO, 0.0);
        assert_eq!(query.visited_cells, vec![IVec3::new(3, 1, 3)]);
        assert_eq!(query.candidates, vec![1]);
    }

    #[test]
    fn query_includes_far_corner_of_neighbor_cell() {
        let mut grid = grid();
        // Same cell row, different cells, within a cell size of each other
        grid.rebuild([Vec3::new(-0.1, 0.0, 0.0), Vec3::new(4.8, 0.0, 0.0)]);

        let query = grid.query(0, Vec3::new(-0.1, 0.0, 0.0), 4.95);
        assert_eq!(query.candidates, vec![1]);
    }

    #[test]
    fn rebuild_discards_previous_contents() {
        let mut grid = grid();
        grid.rebuild([Vec3::ZERO, Vec3::ONE]);
        assert_eq!(grid.len(), 2);

        grid.rebuild([Vec3::new(10.0, 0.0, 10.0)]);
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.occupied_cells(), 1);
        assert!(grid.bucket(grid.cell_coord(Vec3::ZERO)).is_empty());
    }

    #[test]
    fn reach_is_capped() {
        assert_eq!(query_reach(5.0, 4.0), Ok(1));
        assert_eq!(query_reach(1.0, MAX_QUERY_REACH as f32), Ok(MAX_QUERY_REACH));
        assert!(matches!(
            query_reach(1e-4, 3.5),
            Err(FlockError::QueryTooWide { max_cells: MAX_QUERY_REACH, .. })
        ));
        assert!(query_reach(1.0, 1e10).is_err());
    }

    #[test]
    fn oversized_query_visits_only_occupied_cells() {
        let mut grid = SpatialGrid::new(1e-4, Bounds::new(30.0, 15.0, 30.0)).expect("valid grid");
        grid.rebuild([Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(12.0, 0.0, 0.0)]);

        let query = grid.query(0, Vec3::ZERO, 3.5);
        let mut candidates = query.candidates.clone();
        candidates.sort_unstable();
        assert_eq!(candidates, vec![1]);
        assert_eq!(query.visited_cells.len(), 2);

        let everything = grid.query(0, Vec3::ZERO, 1e10);
        assert_eq!(everything.candidates.len(), 2);
    }

    #[test]
    fn cell_center_round_trips_through_cell_coord() {
        let grid = grid();
        let coord = IVec3::new(2, 0, 5);
        assert_eq!(grid.cell_coord(grid.cell_center(coord)), coord);
    }
}
