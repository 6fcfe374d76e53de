/*
 * Uniform grid over the world box for radius queries.
 *
 * Cells are at least one query radius wide, so every neighbour of a point
 * lies in the point's cell or one of the 26 around it.
 */

use glam::Vec3;

pub struct SpatialGrid {
    pub cell_size: f32,
    pub cells_per_axis: usize,
    half_extent: f32,
    cells: Vec<Vec<usize>>,
}

impl SpatialGrid {
    /// Grid covering `[-half_extent, half_extent]` on every axis
    pub fn new(cell_size: f32, half_extent: f32) -> Self {
        let cells_per_axis = ((2.0 * half_extent / cell_size).ceil() as usize).max(1);
        let count = cells_per_axis * cells_per_axis * cells_per_axis;

        Self {
            cell_size,
            cells_per_axis,
            half_extent,
            cells: vec![Vec::new(); count],
        }
    }

    #[inline]
    fn axis_cell(&self, value: f32) -> usize {
        let max = (self.cells_per_axis - 1) as f32;
        ((value + self.half_extent) / self.cell_size).floor().clamp(0.0, max) as usize
    }

    #[inline]
    fn cell_coords(&self, position: Vec3) -> [usize; 3] {
        [
            self.axis_cell(position.x),
            self.axis_cell(position.y),
            self.axis_cell(position.z),
        ]
    }

    #[inline]
    fn cell_index(&self, [x, y, z]: [usize; 3]) -> usize {
        (z * self.cells_per_axis + y) * self.cells_per_axis + x
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    pub fn insert(&mut self, index: usize, position: Vec3) {
        let cell = self.cell_index(self.cell_coords(position));
        self.cells[cell].push(index);
    }

    pub fn rebuild(&mut self, positions: &[Vec3]) {
        self.clear();
        for (i, &p) in positions.iter().enumerate() {
            self.insert(i, p);
        }
    }

    /// Indices stored in the 3x3x3 block of cells around `position`, unsorted
    pub fn nearby(&self, position: Vec3) -> Vec<usize> {
        let [cx, cy, cz] = self.cell_coords(position);
        let last = self.cells_per_axis - 1;
        let span = |c: usize| c.saturating_sub(1)..=(c + 1).min(last);

        let mut result = Vec::new();
        for z in span(cz) {
            for y in span(cy) {
                for x in span(cx) {
                    result.extend_from_slice(&self.cells[self.cell_index([x, y, z])]);
                }
            }
        }
        result
    }
}
