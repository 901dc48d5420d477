//! World - the grid storage every other component operates on.
//!
//! Parallel fixed-length buffers, one entry per cell, indexed row-major by
//! `y * width + x`:
//!
//! - `cells`:          material id per cell (0 = empty)
//! - `flags`:          per-cell bookkeeping bits, tick-scoped
//! - `last_move_dir`:  horizontal direction of the last successful move of
//!                     the content now at that index
//! - `lifetimes`:      remaining-lifetime counter for decaying materials

use thiserror::Error;

use crate::domain::materials::{MaterialId, MAT_EMPTY};

/// Bit 1 of the flag byte: content already moved this tick.
pub const MOVED_THIS_TICK: u8 = 1 << 1;

/// Dimension used when a caller asks for a zero-sized world.
pub const DEFAULT_DIM: u32 = 128;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("coordinates out of bounds: ({x}, {y})")]
    OutOfBounds { x: i32, y: i32 },
}

pub struct World {
    width: u32,
    height: u32,
    pub cells: Vec<MaterialId>,
    pub flags: Vec<u8>,
    pub last_move_dir: Vec<i8>,
    pub lifetimes: Vec<u16>,
}

impl World {
    /// Create a zero-filled world. Zero dimensions are normalized to
    /// [`DEFAULT_DIM`]; this constructor never fails.
    pub fn new(width: u32, height: u32) -> Self {
        let width = if width == 0 { DEFAULT_DIM } else { width };
        let height = if height == 0 { DEFAULT_DIM } else { height };
        let size = (width as usize) * (height as usize);

        Self {
            width,
            height,
            cells: vec![MAT_EMPTY; size],
            flags: vec![0; size],
            last_move_dir: vec![0; size],
            lifetimes: vec![0; size],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Row-major index for validated coordinates.
    pub fn idx(&self, x: i32, y: i32) -> Result<usize, WorldError> {
        if !self.in_bounds(x, y) {
            return Err(WorldError::OutOfBounds { x, y });
        }
        Ok(self.offset(x as u32, y as u32))
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && (x as u32) < self.width && y >= 0 && (y as u32) < self.height
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    // === Cell content ===

    /// Material at `(x, y)`; out-of-bounds reads as empty.
    #[inline]
    pub fn material_at(&self, x: i32, y: i32) -> MaterialId {
        if !self.in_bounds(x, y) {
            return MAT_EMPTY;
        }
        self.cells[self.offset(x as u32, y as u32)]
    }

    /// True only for an in-bounds empty cell.
    #[inline]
    pub fn is_empty(&self, x: i32, y: i32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        self.cells[self.offset(x as u32, y as u32)] == MAT_EMPTY
    }

    /// Overwrite a cell's content, resetting its per-cell movement state.
    /// Flag bits are left untouched.
    pub fn set_cell(&mut self, x: u32, y: u32, id: MaterialId) {
        let i = self.offset(x, y);
        self.cells[i] = id;
        self.last_move_dir[i] = 0;
        self.lifetimes[i] = 0;
    }

    /// Overwrite a cell from a reaction: like [`set_cell`](Self::set_cell)
    /// but also marks the cell as moved so transformed matter does not act
    /// again within the same tick.
    pub fn rewrite_cell(&mut self, x: u32, y: u32, id: MaterialId) {
        let i = self.offset(x, y);
        self.cells[i] = id;
        self.last_move_dir[i] = 0;
        self.lifetimes[i] = 0;
        self.flags[i] |= MOVED_THIS_TICK;
    }

    /// Reset a cell to empty, clearing all per-cell state.
    pub fn clear_cell(&mut self, x: u32, y: u32) {
        let i = self.offset(x, y);
        self.cells[i] = MAT_EMPTY;
        self.flags[i] = 0;
        self.last_move_dir[i] = 0;
        self.lifetimes[i] = 0;
    }

    /// Swap the full content of two cells. All per-cell state travels with
    /// the content, including reserved flag bits.
    pub fn swap_cells(&mut self, ax: u32, ay: u32, bx: u32, by: u32) {
        let a = self.offset(ax, ay);
        let b = self.offset(bx, by);
        self.cells.swap(a, b);
        self.flags.swap(a, b);
        self.last_move_dir.swap(a, b);
        self.lifetimes.swap(a, b);
    }

    // === Tick-scoped flags ===

    #[inline]
    pub fn moved(&self, x: u32, y: u32) -> bool {
        self.flags[self.offset(x, y)] & MOVED_THIS_TICK != 0
    }

    #[inline]
    pub fn set_moved(&mut self, x: u32, y: u32) {
        let i = self.offset(x, y);
        self.flags[i] |= MOVED_THIS_TICK;
    }

    #[inline]
    pub fn clear_moved(&mut self, x: u32, y: u32) {
        let i = self.offset(x, y);
        self.flags[i] &= !MOVED_THIS_TICK;
    }

    /// Clear the moved bit everywhere, preserving reserved bits. Idempotent.
    pub fn clear_moved_flags(&mut self) {
        for f in self.flags.iter_mut() {
            *f &= !MOVED_THIS_TICK;
        }
    }

    // === Movement direction ===

    #[inline]
    pub fn dir_at(&self, x: u32, y: u32) -> i8 {
        self.last_move_dir[self.offset(x, y)]
    }

    #[inline]
    pub fn set_dir(&mut self, x: u32, y: u32, dir: i8) {
        let i = self.offset(x, y);
        self.last_move_dir[i] = dir;
    }

    // === Lifetimes ===

    #[inline]
    pub fn lifetime_at(&self, x: u32, y: u32) -> u16 {
        self.lifetimes[self.offset(x, y)]
    }

    #[inline]
    pub fn set_lifetime(&mut self, x: u32, y: u32, life: u16) {
        let i = self.offset(x, y);
        self.lifetimes[i] = life;
    }

    // === Painting ===

    /// Fill a circle of `radius` around `(cx, cy)` with `id`, clipped to the
    /// world. Uses the midpoint scanline: for each row offset `dy` the
    /// half-width is `floor(sqrt(r*r - dy*dy))`. Cells already holding `id`
    /// are skipped. Returns the number of cells changed.
    pub fn paint_circle(&mut self, cx: i32, cy: i32, radius: u32, id: MaterialId) -> usize {
        let r = radius as i32;
        let mut changed = 0;

        for dy in -r..=r {
            let y = cy + dy;
            if y < 0 || y as u32 >= self.height {
                continue;
            }
            let half = (((r * r - dy * dy) as f64).sqrt()).floor() as i32;
            for dx in -half..=half {
                let x = cx + dx;
                if x < 0 || x as u32 >= self.width {
                    continue;
                }
                if self.cells[self.offset(x as u32, y as u32)] == id {
                    continue;
                }
                if id == MAT_EMPTY {
                    self.clear_cell(x as u32, y as u32);
                } else {
                    self.set_cell(x as u32, y as u32, id);
                }
                changed += 1;
            }
        }

        changed
    }
}
