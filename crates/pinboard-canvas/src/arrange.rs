#![forbid(unsafe_code)]

//! Automatic arrangement: first-fit bin packing on a fixed cell grid.
//!
//! [`pack`] is a pure function. It discretizes the plane into `cell`-sized
//! columns, computes each rectangle's column/row span by ceiling division,
//! and scans row-major for the first origin where the whole span is free.
//! First-fit, not optimal: deterministic and `O(rects × grid cells)`, which
//! is fine for the small panel counts a board carries.
//!
//! Input order is preserved in the output: `result[i]` is where `rects[i]`
//! goes. Callers rely on that correspondence.

use pinboard_core::{Point, Rect};

/// Default grid cell size in content units.
pub const DEFAULT_CELL: f64 = 100.0;

/// Compute packed top-left positions for the given rectangles.
///
/// `container_width` is the unscaled width available; at least one column is
/// always granted so oversized panels degrade to a single stack.
#[must_use]
pub fn pack(container_width: f64, rects: &[Rect], cell: f64) -> Vec<Point> {
    let cols = ((container_width / cell).floor() as usize).max(1);
    let mut occupied: Vec<Vec<bool>> = Vec::new();
    let mut out = Vec::with_capacity(rects.len());

    for rect in rects {
        let span_cols = span(rect.width, cell).min(cols);
        let span_rows = span(rect.height, cell);
        let (col, row) = first_fit(&mut occupied, cols, span_cols, span_rows);
        mark(&mut occupied, cols, col, row, span_cols, span_rows);
        out.push(Point::new(col as f64 * cell, row as f64 * cell));
    }

    out
}

/// Cells needed to cover `size`, at least one.
fn span(size: f64, cell: f64) -> usize {
    ((size / cell).ceil() as usize).max(1)
}

/// Row-major scan for the first origin whose full span is unoccupied.
fn first_fit(
    occupied: &mut Vec<Vec<bool>>,
    cols: usize,
    span_cols: usize,
    span_rows: usize,
) -> (usize, usize) {
    let mut row = 0;
    loop {
        while occupied.len() < row + span_rows {
            occupied.push(vec![false; cols]);
        }
        let max_col = cols.saturating_sub(span_cols);
        for col in 0..=max_col {
            if fits(occupied, col, row, span_cols, span_rows) {
                return (col, row);
            }
        }
        row += 1;
    }
}

fn fits(occupied: &[Vec<bool>], col: usize, row: usize, span_cols: usize, span_rows: usize) -> bool {
    for r in row..row + span_rows {
        for c in col..col + span_cols {
            if occupied[r][c] {
                return false;
            }
        }
    }
    true
}

fn mark(
    occupied: &mut Vec<Vec<bool>>,
    cols: usize,
    col: usize,
    row: usize,
    span_cols: usize,
    span_rows: usize,
) {
    while occupied.len() < row + span_rows {
        occupied.push(vec![false; cols]);
    }
    for r in row..row + span_rows {
        for c in col..col + span_cols {
            occupied[r][c] = true;
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
