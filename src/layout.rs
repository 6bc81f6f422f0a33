//! Layout planning: partitions the content band into one cell per photo.
//!
//! The planner is a pure function of the participant count. Each supported
//! count maps to a [`LayoutSpec`], either a uniform grid or two stacked rows
//! with different cell counts, and the shape is turned into concrete
//! [`Cell`]s against the configured canvas.
//!
//! ```text
//!  count 5                      count 6
//! ┌────────────┬────────────┐  ┌───────┬───────┬───────┐
//! │     0      │     1      │  │   0   │   1   │   2   │
//! ├────────┬───┴────┬───────┤  ├───────┼───────┼───────┤
//! │   2    │   3    │   4   │  │   3   │   4   │   5   │
//! └────────┴────────┴───────┘  └───────┴───────┴───────┘
//! ```

use serde::Serialize;

use crate::config::CollageConfig;
use crate::geometry::Cell;

/// Number of cells planned for counts outside the canonical table.
pub const FALLBACK_MAX_CELLS: usize = 4;

// ============================================================================
// LayoutSpec
// ============================================================================

/// Row/column shape of a layout, before any pixel math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutSpec {
    /// `rows` × `cols` equal cells, filled row-major until `cells` are placed.
    Grid { rows: u32, cols: u32, cells: u32 },
    /// Two rows of equal height holding `top` and `bottom` cells. Each row
    /// splits the full canvas width on its own, so column widths differ
    /// between the rows.
    Stacked { top: u32, bottom: u32 },
}

impl LayoutSpec {
    /// Looks up the shape for a participant count.
    ///
    /// Counts 2 through 8 have a dedicated shape. Anything else falls back to
    /// a 2×2 grid holding at most [`FALLBACK_MAX_CELLS`] cells.
    pub fn for_count(count: usize) -> Self {
        match count {
            2 => Self::Grid {
                rows: 1,
                cols: 2,
                cells: 2,
            },
            3 => Self::Stacked { top: 1, bottom: 2 },
            4 => Self::Grid {
                rows: 2,
                cols: 2,
                cells: 4,
            },
            5 => Self::Stacked { top: 2, bottom: 3 },
            6 => Self::Grid {
                rows: 2,
                cols: 3,
                cells: 6,
            },
            7 => Self::Stacked { top: 3, bottom: 4 },
            8 => Self::Grid {
                rows: 2,
                cols: 4,
                cells: 8,
            },
            n => Self::Grid {
                rows: 2,
                cols: 2,
                cells: n.min(FALLBACK_MAX_CELLS) as u32,
            },
        }
    }

    /// Number of cells this shape produces.
    pub fn cell_count(&self) -> usize {
        match *self {
            Self::Grid { rows, cols, cells } => cells.min(rows * cols) as usize,
            Self::Stacked { top, bottom } => (top + bottom) as usize,
        }
    }

    /// Returns true for the counts with a dedicated shape (2..=8).
    pub fn is_canonical(count: usize) -> bool {
        (2..=8).contains(&count)
    }

    /// Computes the cells of this shape inside `config`'s content band.
    pub fn cells(&self, config: &CollageConfig) -> Vec<Cell> {
        let band = config.content_band();
        match *self {
            Self::Grid { rows, cols, cells } => uniform_grid(band, config.gap, rows, cols, cells),
            Self::Stacked { top, bottom } => stacked_rows(band, config.gap, top, bottom),
        }
    }
}

// ============================================================================
// Layout
// ============================================================================

/// A planned collage: one cell per photo plus the fixed band heights.
///
/// Cells are ordered left-to-right within a row, rows top-to-bottom. Photo
/// `i` is drawn into `cells[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub cells: Vec<Cell>,
    pub header_height: u32,
    pub footer_height: u32,
    pub canvas_size: u32,
}

impl Layout {
    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The region between the header and the footer.
    pub fn content_band(&self) -> Cell {
        Cell::new(
            0,
            self.header_height,
            self.canvas_size,
            self.canvas_size
                .saturating_sub(self.header_height)
                .saturating_sub(self.footer_height),
        )
    }

    /// Serializes the layout to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the layout to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Plans the layout for `count` participants on the default canvas.
pub fn plan(count: usize) -> Layout {
    plan_with(count, &CollageConfig::default())
}

/// Plans the layout for `count` participants on the canvas described by `config`.
///
/// Never fails: counts without a dedicated shape get the capped 2×2 fallback.
pub fn plan_with(count: usize, config: &CollageConfig) -> Layout {
    let spec = LayoutSpec::for_count(count);
    Layout {
        cells: spec.cells(config),
        header_height: config.header_height,
        footer_height: config.footer_height,
        canvas_size: config.canvas_size,
    }
}

// ============================================================================
// Cell generators
// ============================================================================

/// Splits `total` into `parts` equal spans separated by `gap`, flooring.
fn span(total: u32, gap: u32, parts: u32) -> u32 {
    if parts == 0 {
        return 0;
    }
    total.saturating_sub(gap * (parts - 1)) / parts
}

/// Lays `count` cells of the given height side by side across `width`.
fn row(x0: u32, y: u32, width: u32, height: u32, gap: u32, count: u32) -> impl Iterator<Item = Cell> {
    let cell_width = span(width, gap, count);
    (0..count).map(move |c| Cell::new(x0 + c * (cell_width + gap), y, cell_width, height))
}

/// Equal-sized `rows` × `cols` grid filled row-major with up to `cells` cells.
fn uniform_grid(band: Cell, gap: u32, rows: u32, cols: u32, cells: u32) -> Vec<Cell> {
    let cell_height = span(band.height, gap, rows);
    (0..rows)
        .flat_map(|r| {
            let y = band.y + r * (cell_height + gap);
            row(band.x, y, band.width, cell_height, gap, cols)
        })
        .take(cells as usize)
        .collect()
}

/// Two rows of height `floor(H/2) - gap`, each filling the full band width.
fn stacked_rows(band: Cell, gap: u32, top: u32, bottom: u32) -> Vec<Cell> {
    let height = (band.height / 2).saturating_sub(gap);
    let bottom_y = band.y + height + gap;
    row(band.x, band.y, band.width, height, gap, top)
        .chain(row(band.x, bottom_y, band.width, height, gap, bottom))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
