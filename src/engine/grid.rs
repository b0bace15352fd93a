// src/engine/grid.rs
//! Logical column placement for Untis-style timetable tables.
//!
//! HTML tables only say "this cell spans N columns and M rows"; the actual
//! column a cell lands in depends on every rowspan above it. We replay that
//! layout with an occupancy grid, one bitmask per row.
//!
//! Column 0 is the day-label column, columns 1-2 are slot 1, 3-4 slot 2, and
//! so on up to 16 slots. Anything past [`MAX_COLS`] is clipped.
//!
//! Some pages emit a row whose only cell is a concurrent class with nothing
//! carried over into column 0, so naive placement puts it at column 0. For
//! those rows the resolver runs [`RECOVERY_CHAIN`] in order; the first
//! strategy that yields a column wins. This is a best-effort guess.

use std::collections::HashMap;

use serde::Serialize;

/// Day-label column plus 16 slots of two columns each, with one spare.
pub const MAX_COLS: usize = 34;

/// Hostile rowspans would otherwise allocate unbounded grid rows.
pub const MAX_ROWSPAN: usize = 256;

const _: () = assert!(MAX_COLS < 64);

/// What the resolver needs to know about a `<td>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellShape {
    pub colspan: usize,
    pub rowspan: usize,
    pub has_bgcolor: bool,
    pub has_inner_table: bool,
    pub is_day_header: bool,
}

impl CellShape {
    /// Spans are kept within the grid: no cell is wider than [`MAX_COLS`].
    pub fn new(colspan: usize, rowspan: usize) -> Self {
        Self {
            colspan: colspan.clamp(1, MAX_COLS),
            rowspan: rowspan.clamp(1, MAX_ROWSPAN),
            has_bgcolor: false,
            has_inner_table: false,
            is_day_header: false,
        }
    }

    /// Coloured cell wrapping an inner table: the shape of a class.
    pub fn class(colspan: usize, rowspan: usize) -> Self {
        Self { has_bgcolor: true, has_inner_table: true, ..Self::new(colspan, rowspan) }
    }

    pub fn day_header(rowspan: usize) -> Self {
        Self { is_day_header: true, ..Self::new(1, rowspan) }
    }

    #[inline]
    pub fn is_class_shaped(&self) -> bool {
        self.has_bgcolor && self.has_inner_table
    }
}

/// How a cell's start column was decided.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Resolution {
    /// Cursor placement, no guessing.
    #[default]
    Direct,
    ColspanLookup,
    OccupiedFallback,
    /// Ended up in column 0 with nothing better to offer.
    Unresolved,
}

impl Resolution {
    pub fn is_guess(&self) -> bool {
        !matches!(self, Resolution::Direct)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedCell {
    pub row: usize,
    pub start_column: usize,
    pub colspan: usize,
    pub rowspan: usize,
    pub resolution: Resolution,
}

/* ---------------- Occupancy ---------------- */

/// Sparse row-major occupancy. Marks are only ever added.
#[derive(Clone, Debug, Default)]
pub struct OccupancyGrid {
    rows: Vec<u64>,
}

fn span_mask(start: usize, end: usize) -> u64 {
    ((1u64 << (end - start)) - 1) << start
}

impl OccupancyGrid {
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        col < MAX_COLS && self.rows.get(row).is_some_and(|m| m & (1u64 << col) != 0)
    }

    /// Claim `[row, row+rowspan) x [col, col+colspan)`, clipped at the ceiling.
    pub fn mark(&mut self, row: usize, col: usize, colspan: usize, rowspan: usize) {
        let end = col.saturating_add(colspan).min(MAX_COLS);
        if col >= end { return; }
        let mask = span_mask(col, end);

        let last = row + rowspan.clamp(1, MAX_ROWSPAN);
        if self.rows.len() < last {
            self.rows.resize(last, 0);
        }
        for bits in &mut self.rows[row..last] {
            *bits |= mask;
        }
    }

    pub fn first_occupied(&self, row: usize) -> Option<usize> {
        self.rows
            .get(row)
            .filter(|bits| **bits != 0)
            .map(|bits| bits.trailing_zeros() as usize)
    }

    /// First unclaimed column at or after `from` (may return `MAX_COLS`).
    pub fn first_free_from(&self, row: usize, from: usize) -> usize {
        let mut col = from;
        while col < MAX_COLS && self.is_occupied(row, col) {
            col += 1;
        }
        col
    }
}

/* ---------------- Per-day memory ---------------- */

/// Colspan -> start column of the class cells in a day's first row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DayColumns {
    start_row: usize,
    by_colspan: HashMap<usize, usize>,
}

impl DayColumns {
    pub fn new(start_row: usize) -> Self {
        Self { start_row, by_colspan: HashMap::new() }
    }

    pub fn start_row(&self) -> usize { self.start_row }

    /// First-seen wins.
    pub fn record(&mut self, colspan: usize, column: usize) {
        self.by_colspan.entry(colspan).or_insert(column);
    }

    pub fn column_for(&self, colspan: usize) -> Option<usize> {
        self.by_colspan.get(&colspan).copied()
    }
}

/* ---------------- Recovery strategies ---------------- */

/// Everything a strategy may look at for the lone cell being placed.
pub struct Recovery<'a> {
    pub row: usize,
    pub shape: &'a CellShape,
    pub grid: &'a OccupancyGrid,
    pub day: &'a DayColumns,
}

pub trait RecoveryStrategy: Sync {
    fn resolution(&self) -> Resolution;
    fn recover(&self, ctx: &Recovery<'_>) -> Option<usize>;
}

/// Reuse the column a same-width class had in the day's first row.
pub struct ColspanLookup;

impl RecoveryStrategy for ColspanLookup {
    fn resolution(&self) -> Resolution { Resolution::ColspanLookup }

    fn recover(&self, ctx: &Recovery<'_>) -> Option<usize> {
        ctx.day.column_for(ctx.shape.colspan)
    }
}

/// Sit on the first column a rowspan from above already covers.
pub struct OccupiedFallback;

impl RecoveryStrategy for OccupiedFallback {
    fn resolution(&self) -> Resolution { Resolution::OccupiedFallback }

    fn recover(&self, ctx: &Recovery<'_>) -> Option<usize> {
        ctx.grid.first_occupied(ctx.row)
    }
}

pub static RECOVERY_CHAIN: &[&'static dyn RecoveryStrategy] = &[
    &ColspanLookup,
    &OccupiedFallback,
];

/* ---------------- Resolver ---------------- */

pub struct CellGridResolver {
    grid: OccupancyGrid,
    chain: &'static [&'static dyn RecoveryStrategy],
}

impl Default for CellGridResolver {
    fn default() -> Self { Self::new() }
}

impl CellGridResolver {
    pub fn new() -> Self {
        Self::with_chain(RECOVERY_CHAIN)
    }

    pub fn with_chain(chain: &'static [&'static dyn RecoveryStrategy]) -> Self {
        Self { grid: OccupancyGrid::default(), chain }
    }

    pub fn grid(&self) -> &OccupancyGrid { &self.grid }

    /// Place one row's cells left to right.
    ///
    /// `day` is the current day's column memory, if a day is open. When `row`
    /// is that day's first row, class-shaped cells are recorded into it.
    pub fn place_row(
        &mut self,
        row: usize,
        cells: &[CellShape],
        mut day: Option<&mut DayColumns>,
    ) -> Vec<ResolvedCell> {
        let lone = cells.len() == 1;
        let mut cursor = 0usize;
        let mut out = Vec::with_capacity(cells.len());

        for shape in cells {
            cursor = self.grid.first_free_from(row, cursor);
            let mut start = cursor;
            let mut resolution = Resolution::Direct;

            if lone && start == 0 && shape.is_class_shaped() {
                if let Some(day) = day.as_deref() {
                    (start, resolution) = self.recover(row, shape, day);
                }
            }

            if let Some(day) = day.as_deref_mut() {
                if day.start_row() == row && shape.is_class_shaped() {
                    day.record(shape.colspan, start);
                }
            }

            self.grid.mark(row, start, shape.colspan, shape.rowspan);
            cursor = start.saturating_add(shape.colspan).min(MAX_COLS);

            out.push(ResolvedCell {
                row,
                start_column: start,
                colspan: shape.colspan,
                rowspan: shape.rowspan,
                resolution,
            });
        }

        out
    }

    fn recover(&self, row: usize, shape: &CellShape, day: &DayColumns) -> (usize, Resolution) {
        let ctx = Recovery { row, shape, grid: &self.grid, day };
        for strategy in self.chain {
            if let Some(col) = strategy.recover(&ctx) {
                logd!("Grid: row {} lone cell → col {} via {:?}", row, col, strategy.resolution());
                return (col, strategy.resolution());
            }
        }
        logd!("Grid: row {} lone cell left at col 0", row);
        (0, Resolution::Unresolved)
    }
}

/// Resolve a whole table from shapes alone.
///
/// A row holding a day-header cell opens a fresh day memory; every later row
/// uses it until the next header. Empty rows produce empty output rows.
pub fn resolve(rows: &[Vec<CellShape>]) -> Vec<Vec<ResolvedCell>> {
    let mut resolver = CellGridResolver::new();
    let mut day: Option<DayColumns> = None;

    rows.iter()
        .enumerate()
        .map(|(idx, cells)| {
            if cells.iter().any(|c| c.is_day_header) {
                day = Some(DayColumns::new(idx));
            }
            resolver.place_row(idx, cells, day.as_mut())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starts(row: &[ResolvedCell]) -> Vec<usize> {
        row.iter().map(|c| c.start_column).collect()
    }

    #[test]
    fn plain_row_places_left_to_right() {
        let rows = vec![vec![
            CellShape::day_header(1),
            CellShape::new(2, 1),
            CellShape::class(4, 1),
            CellShape::new(2, 1),
        ]];
        let out = resolve(&rows);
        assert_eq!(starts(&out[0]), vec![0, 1, 3, 7]);
        assert!(out[0].iter().all(|c| c.resolution == Resolution::Direct));
    }

    #[test]
    fn rowspan_pushes_later_rows_right() {
        let rows = vec![
            vec![CellShape::day_header(2), CellShape::new(2, 2), CellShape::class(2, 1)],
            vec![CellShape::class(2, 1)],
        ];
        let out = resolve(&rows);
        assert_eq!(starts(&out[0]), vec![0, 1, 3]);
        // cols 0..3 are still claimed from row 0
        assert_eq!(starts(&out[1]), vec![3]);
        assert_eq!(out[1][0].resolution, Resolution::Direct);
    }

    #[test]
    fn lone_class_uses_first_row_colspan() {
        let rows = vec![
            vec![
                CellShape::day_header(1),
                CellShape::new(12, 2),
                CellShape::class(2, 1),
                CellShape::class(2, 2),
            ],
            vec![CellShape::class(2, 1)],
        ];
        let out = resolve(&rows);
        assert_eq!(starts(&out[0]), vec![0, 1, 13, 15]);
        // first-seen colspan 2 was at col 13, not 15
        assert_eq!(out[1][0].start_column, 13);
        assert_eq!(out[1][0].resolution, Resolution::ColspanLookup);
    }

    #[test]
    fn lone_class_falls_back_to_first_occupied() {
        let rows = vec![
            vec![
                CellShape::day_header(1),
                CellShape::new(2, 1),
                CellShape::class(2, 1),
                CellShape::new(6, 2),
            ],
            vec![CellShape::class(6, 1)],
        ];
        let out = resolve(&rows);
        assert_eq!(starts(&out[0]), vec![0, 1, 3, 5]);
        assert_eq!(out[1][0].start_column, 5);
        assert_eq!(out[1][0].resolution, Resolution::OccupiedFallback);
    }

    #[test]
    fn lone_class_without_day_stays_at_zero() {
        let rows = vec![vec![CellShape::class(2, 1)]];
        let out = resolve(&rows);
        assert_eq!(out[0][0].start_column, 0);
        assert_eq!(out[0][0].resolution, Resolution::Direct);
    }

    #[test]
    fn unrecoverable_lone_class_is_flagged() {
        let rows = vec![
            vec![CellShape::day_header(1), CellShape::new(32, 1)],
            vec![CellShape::class(4, 1)],
        ];
        let out = resolve(&rows);
        assert_eq!(out[1][0].start_column, 0);
        assert_eq!(out[1][0].resolution, Resolution::Unresolved);
    }

    #[test]
    fn lone_plain_cell_is_not_recovered() {
        let rows = vec![
            vec![CellShape::day_header(1), CellShape::class(2, 2)],
            vec![CellShape::new(2, 1)],
        ];
        let out = resolve(&rows);
        assert_eq!(out[1][0].start_column, 0);
        assert_eq!(out[1][0].resolution, Resolution::Direct);
    }

    #[test]
    fn placed_rows_leave_carried_marks() {
        let mut resolver = CellGridResolver::new();
        let mut day = DayColumns::new(0);
        resolver.place_row(0, &[CellShape::day_header(2), CellShape::new(2, 2), CellShape::class(2, 1)], Some(&mut day));

        let grid = resolver.grid();
        assert!(grid.is_occupied(1, 0));
        assert!(grid.is_occupied(1, 2));
        assert!(!grid.is_occupied(1, 3));
        assert_eq!(grid.first_free_from(1, 0), 3);
        assert_eq!(day.column_for(2), Some(3));
    }

    #[test]
    fn spans_past_ceiling_are_clipped() {
        let mut grid = OccupancyGrid::default();
        grid.mark(0, 30, 10, 1);
        assert!(grid.is_occupied(0, 33));
        assert!(!grid.is_occupied(0, 34));
        assert_eq!(grid.first_free_from(0, 30), MAX_COLS);

        // starting beyond the ceiling claims nothing
        grid.mark(1, 40, 2, 1);
        assert_eq!(grid.first_occupied(1), None);
    }

    #[test]
    fn huge_colspan_clips_the_rest_of_the_row() {
        assert_eq!(CellShape::new(usize::MAX, 1).colspan, MAX_COLS);

        let rows = vec![vec![
            CellShape::day_header(1),
            CellShape::new(usize::MAX, 1),
            CellShape::class(2, 1),
        ]];
        let out = resolve(&rows);
        assert_eq!(starts(&out[0]), vec![0, 1, MAX_COLS]);
        assert_eq!(out[0][1].colspan, MAX_COLS);

        // a hand-built shape skipping the constructor still cannot wrap the cursor
        let wide = CellShape { colspan: usize::MAX, ..CellShape::new(1, 1) };
        let out = resolve(&[vec![CellShape::new(1, 1), wide, CellShape::new(1, 1)]]);
        assert_eq!(starts(&out[0]), vec![0, 1, MAX_COLS]);
    }

    #[test]
    fn oversized_rowspan_is_capped() {
        let mut grid = OccupancyGrid::default();
        grid.mark(0, 1, 1, usize::MAX);
        assert!(grid.is_occupied(MAX_ROWSPAN - 1, 1));
        assert!(!grid.is_occupied(MAX_ROWSPAN, 1));
    }

    #[test]
    fn day_memory_keeps_first_seen() {
        let mut day = DayColumns::new(4);
        day.record(2, 3);
        day.record(2, 9);
        day.record(4, 11);
        assert_eq!(day.column_for(2), Some(3));
        assert_eq!(day.column_for(4), Some(11));
        assert_eq!(day.column_for(6), None);
    }

    #[test]
    fn strategies_answer_independently() {
        let mut grid = OccupancyGrid::default();
        grid.mark(1, 7, 2, 1);
        let mut day = DayColumns::new(0);
        day.record(4, 21);

        let shape = CellShape::class(4, 1);
        let ctx = Recovery { row: 1, shape: &shape, grid: &grid, day: &day };
        assert_eq!(ColspanLookup.recover(&ctx), Some(21));
        assert_eq!(OccupiedFallback.recover(&ctx), Some(7));

        let other = CellShape::class(2, 1);
        let ctx = Recovery { row: 1, shape: &other, grid: &grid, day: &day };
        assert_eq!(ColspanLookup.recover(&ctx), None);
    }

    static FALLBACK_ONLY: &[&'static dyn RecoveryStrategy] = &[&OccupiedFallback];

    #[test]
    fn custom_chain_skips_lookup() {
        let mut resolver = CellGridResolver::with_chain(FALLBACK_ONLY);
        let mut day = DayColumns::new(0);
        resolver.place_row(
            0,
            &[CellShape::day_header(1), CellShape::new(4, 2), CellShape::class(2, 1)],
            Some(&mut day),
        );
        let out = resolver.place_row(1, &[CellShape::class(2, 1)], Some(&mut day));
        assert_eq!(out[0].start_column, 1);
        assert_eq!(out[0].resolution, Resolution::OccupiedFallback);
    }
}
