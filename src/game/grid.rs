//! Cave Grid
//!
//! A flat row-major array of cells. Reads outside the bounds yield steel
//! wall, writes outside the bounds are dropped, so the tick code never has
//! to special-case the edges.

use serde::{Serialize, Deserialize};

use crate::core::direction::{Direction, Pos};
use crate::core::hash::StateHasher;
use crate::game::element::ElementKind;

// =============================================================================
// CELL
// =============================================================================

/// One grid cell.
///
/// `kind == Empty` implies every other field is at its default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Element occupying the cell
    pub kind: ElementKind,
    /// Facing/movement direction (monsters)
    pub direction: Direction,
    /// Animation frame, 0..=7
    pub anim_phase: u8,
    /// In free fall
    pub falling: bool,
    /// Element-specific countdown (explosion stages)
    pub sub_timer: u16,
}

impl Cell {
    /// Number of animation phases.
    pub const ANIM_PHASES: u8 = 8;

    /// Steel wall as seen beyond the grid edge.
    pub const BOUNDARY: Cell = Cell::new(ElementKind::SteelWall);

    /// Fresh cell of the given kind.
    pub const fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            direction: Direction::None,
            anim_phase: 0,
            falling: false,
            sub_timer: 0,
        }
    }

    /// Fresh cell facing `direction`.
    pub const fn facing(kind: ElementKind, direction: Direction) -> Self {
        let mut cell = Self::new(kind);
        cell.direction = direction;
        cell
    }

    /// Fresh cell already in free fall.
    pub const fn falling(kind: ElementKind) -> Self {
        let mut cell = Self::new(kind);
        cell.falling = true;
        cell
    }

    /// Open space.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kind == ElementKind::Empty
    }
}

// =============================================================================
// GRID
// =============================================================================

/// Fixed-size cave grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    /// Tick on which each cell was last written
    touched: Vec<u32>,
}

impl Grid {
    /// Create an all-empty grid.
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::default(); size],
            touched: vec![0; size],
        }
    }

    /// Width in columns.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in rows.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major index of an in-bounds position.
    #[inline]
    pub fn index(&self, pos: Pos) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width as i32 || pos.y >= self.height as i32 {
            return None;
        }
        Some(pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// Position of a row-major index.
    #[inline]
    pub fn pos_of(&self, index: usize) -> Pos {
        let w = self.width.max(1) as usize;
        Pos::new((index % w) as i32, (index / w) as i32)
    }

    /// Inside the grid?
    #[inline]
    pub fn in_bounds(&self, pos: Pos) -> bool {
        self.index(pos).is_some()
    }

    /// Cell at `pos`; steel wall outside the bounds.
    #[inline]
    pub fn get(&self, pos: Pos) -> Cell {
        self.index(pos)
            .and_then(|i| self.cells.get(i))
            .copied()
            .unwrap_or(Cell::BOUNDARY)
    }

    /// Element kind at `pos`.
    #[inline]
    pub fn kind(&self, pos: Pos) -> ElementKind {
        self.get(pos).kind
    }

    /// Mutable cell access (in-bounds only). Does not stamp the cell.
    #[inline]
    pub fn cell_mut(&mut self, pos: Pos) -> Option<&mut Cell> {
        let i = self.index(pos)?;
        self.cells.get_mut(i)
    }

    /// Write `cell` at `pos` and stamp it with `tick`.
    ///
    /// Returns false when `pos` is outside the grid.
    pub fn set(&mut self, pos: Pos, cell: Cell, tick: u32) -> bool {
        let Some(i) = self.index(pos) else {
            return false;
        };
        if let (Some(slot), Some(stamp)) = (self.cells.get_mut(i), self.touched.get_mut(i)) {
            *slot = cell;
            *stamp = tick;
            return true;
        }
        false
    }

    /// Reset a cell to empty.
    pub fn clear(&mut self, pos: Pos, tick: u32) {
        self.set(pos, Cell::default(), tick);
    }

    /// Move the element at `from` one step in `dir`, keeping its state.
    ///
    /// Returns the destination.
    pub fn move_cell(&mut self, from: Pos, dir: Direction, tick: u32) -> Pos {
        let to = from.step(dir);
        let cell = self.get(from);
        self.set(to, cell, tick);
        self.clear(from, tick);
        to
    }

    /// Was this cell written during `tick`?
    #[inline]
    pub fn touched_on(&self, pos: Pos, tick: u32) -> bool {
        self.index(pos)
            .and_then(|i| self.touched.get(i))
            .is_some_and(|t| *t == tick)
    }

    /// Number of cells holding `kind`.
    pub fn count(&self, kind: ElementKind) -> usize {
        self.cells.iter().filter(|c| c.kind == kind).count()
    }

    /// All positions in scan order (row-major).
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.cells.len()).map(move |i| self.pos_of(i))
    }

    /// Positions holding `kind`, in scan order.
    pub fn find(&self, kind: ElementKind) -> Vec<Pos> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.kind == kind)
            .map(|(i, _)| self.pos_of(i))
            .collect()
    }

    /// Raw cells, row-major.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Step the animation phase of every animated element.
    pub fn advance_animation(&mut self) {
        for cell in self.cells.iter_mut().filter(|c| c.kind.rules().animated) {
            cell.anim_phase = (cell.anim_phase + 1) % Cell::ANIM_PHASES;
        }
    }

    /// Immutable copy for renderers.
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            width: self.width,
            height: self.height,
            cells: self
                .cells
                .iter()
                .map(|c| CellView {
                    kind: c.kind,
                    direction: c.direction,
                    anim_phase: c.anim_phase,
                })
                .collect(),
        }
    }

    /// Hash cell contents (stamps excluded).
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.field(self.width).field(self.height);
        for cell in &self.cells {
            hasher
                .field(cell.kind)
                .field(cell.direction)
                .field(cell.anim_phase)
                .field(cell.falling)
                .field(cell.sub_timer);
        }
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// What a renderer needs to pick a sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    /// Element kind
    pub kind: ElementKind,
    /// Facing direction
    pub direction: Direction,
    /// Animation frame
    pub anim_phase: u8,
}

/// Read-only copy of the grid taken between ticks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Width in columns
    pub width: u32,
    /// Height in rows
    pub height: u32,
    /// Row-major cell views
    pub cells: Vec<CellView>,
}

impl GridSnapshot {
    /// Kind at column/row; steel wall outside the bounds.
    pub fn kind_at(&self, x: i32, y: i32) -> ElementKind {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return ElementKind::SteelWall;
        }
        self.cells
            .get(y as usize * self.width as usize + x as usize)
            .map(|c| c.kind)
            .unwrap_or(ElementKind::SteelWall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_is_steel() {
        let grid = Grid::new(3, 2);
        assert_eq!(grid.kind(Pos::new(-1, 0)), ElementKind::SteelWall);
        assert_eq!(grid.kind(Pos::new(0, -1)), ElementKind::SteelWall);
        assert_eq!(grid.kind(Pos::new(3, 0)), ElementKind::SteelWall);
        assert_eq!(grid.kind(Pos::new(0, 2)), ElementKind::SteelWall);
        assert_eq!(grid.kind(Pos::new(2, 1)), ElementKind::Empty);
    }

    #[test]
    fn test_writes_outside_are_dropped() {
        let mut grid = Grid::new(2, 2);
        assert!(!grid.set(Pos::new(5, 5), Cell::new(ElementKind::Boulder), 1));
        assert_eq!(grid.count(ElementKind::Boulder), 0);
    }

    #[test]
    fn test_row_major_indexing() {
        let grid = Grid::new(4, 3);
        assert_eq!(grid.index(Pos::new(0, 0)), Some(0));
        assert_eq!(grid.index(Pos::new(3, 0)), Some(3));
        assert_eq!(grid.index(Pos::new(0, 1)), Some(4));
        assert_eq!(grid.pos_of(7), Pos::new(3, 1));

        let order: Vec<Pos> = grid.positions().take(5).collect();
        assert_eq!(order[4], Pos::new(0, 1));
    }

    #[test]
    fn test_move_keeps_state_and_clears_source() {
        let mut grid = Grid::new(3, 3);
        let from = Pos::new(1, 0);
        grid.set(from, Cell::falling(ElementKind::Boulder), 0);

        let to = grid.move_cell(from, Direction::Down, 4);

        assert_eq!(to, Pos::new(1, 1));
        assert!(grid.get(to).falling);
        assert_eq!(grid.get(from), Cell::default());
        assert!(grid.touched_on(to, 4));
        assert!(!grid.touched_on(to, 5));
    }

    #[test]
    fn test_animation_wraps_and_skips_static_kinds() {
        let mut grid = Grid::new(2, 1);
        grid.set(Pos::new(0, 0), Cell::new(ElementKind::Diamond), 0);
        grid.set(Pos::new(1, 0), Cell::new(ElementKind::Boulder), 0);

        for _ in 0..9 {
            grid.advance_animation();
        }
        assert_eq!(grid.get(Pos::new(0, 0)).anim_phase, 1);
        assert_eq!(grid.get(Pos::new(1, 0)).anim_phase, 0);
    }

    #[test]
    fn test_snapshot_matches_grid() {
        let mut grid = Grid::new(2, 2);
        grid.set(Pos::new(1, 1), Cell::facing(ElementKind::Firefly, Direction::Left), 0);

        let snap = grid.snapshot();
        assert_eq!(snap.kind_at(1, 1), ElementKind::Firefly);
        assert_eq!(snap.kind_at(0, 0), ElementKind::Empty);
        assert_eq!(snap.kind_at(2, 0), ElementKind::SteelWall);
        assert_eq!(snap.cells.len(), 4);
    }
}
