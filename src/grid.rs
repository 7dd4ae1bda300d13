//! Grid-heuristic placement engine.
//!
//! Each sheet is discretized into a coarse occupancy grid. The engine
//! scans row-major for the first free cell, evaluates every remaining
//! piece in both orientations at that position, and greedily places
//! the best-scoring candidate. Cells with no fitting piece are marked
//! used so the scan always terminates.

use crate::adjust::adjust;
use crate::geometry::fit_score;
use crate::packer::{Packer, PanelStore, compute_stats};
use crate::types::{
    AdjustedPanel, CalculationResult, Cut, PanelLayout, RequiredPanel, Settings, StockPanel,
};

/// Occupancy-grid cell size, in sheet units. Coarser than the blade
/// kerf ever is, chosen for scan speed over placement precision.
const CELL: f64 = 10.0;
/// Discretization bound per axis; sheets exceeding it abort the
/// calculation.
const MAX_CELLS_PER_AXIS: usize = 1000;

/// A sheet's occupancy grid: a flat, index-addressed cell array with
/// a resumable row-major scan cursor.
struct SpaceGrid {
    cols: usize,
    rows: usize,
    cells: Vec<bool>,
    cursor: usize,
}

#[derive(Debug)]
struct GridTooLarge {
    cols: usize,
    rows: usize,
}

impl SpaceGrid {
    fn new(sheet_length: f64, sheet_width: f64) -> Result<Self, GridTooLarge> {
        let cols = (sheet_length / CELL).ceil() as usize;
        let rows = (sheet_width / CELL).ceil() as usize;
        if cols > MAX_CELLS_PER_AXIS || rows > MAX_CELLS_PER_AXIS {
            return Err(GridTooLarge { cols, rows });
        }
        Ok(Self {
            cols,
            rows,
            cells: vec![false; cols * rows],
            cursor: 0,
        })
    }

    /// Marks every cell covered by the region as occupied, clamped to
    /// the grid bounds.
    fn mark(&mut self, x: f64, y: f64, w: f64, l: f64) {
        let start_col = (x / CELL).floor() as usize;
        let start_row = (y / CELL).floor() as usize;
        let end_col = (((x + w) / CELL).ceil() as usize).min(self.cols);
        let end_row = (((y + l) / CELL).ceil() as usize).min(self.rows);

        for row in start_row..end_row {
            for col in start_col..end_col {
                self.cells[row * self.cols + col] = true;
            }
        }
    }

    /// True when every cell covered by the region is inside the grid
    /// and unoccupied.
    fn is_free(&self, x: f64, y: f64, w: f64, l: f64) -> bool {
        let start_col = (x / CELL).floor() as usize;
        let start_row = (y / CELL).floor() as usize;
        let end_col = ((x + w) / CELL).ceil() as usize;
        let end_row = ((y + l) / CELL).ceil() as usize;

        if end_col > self.cols || end_row > self.rows {
            return false;
        }
        for row in start_row..end_row {
            for col in start_col..end_col {
                if self.cells[row * self.cols + col] {
                    return false;
                }
            }
        }
        true
    }

    /// Next unoccupied cell position in row-major order, resuming from
    /// the previous scan position. `None` once the grid is exhausted.
    fn next_position(&mut self) -> Option<(f64, f64)> {
        while self.cursor < self.cells.len() {
            let idx = self.cursor;
            self.cursor += 1;
            if !self.cells[idx] {
                let col = idx % self.cols;
                let row = idx / self.cols;
                return Some((col as f64 * CELL, row as f64 * CELL));
            }
        }
        None
    }
}

/// Grid-heuristic engine behind the [`Packer`] contract.
#[derive(Debug, Default)]
pub struct GridPacker {
    store: PanelStore,
    settings: Settings,
}

impl GridPacker {
    pub fn new(settings: Settings) -> Self {
        Self {
            store: PanelStore::default(),
            settings,
        }
    }

    /// Expands required panels into per-unit adjusted panels, largest
    /// area first. Multi-quantity panels get numbered labels.
    fn expand_required(&self) -> Vec<AdjustedPanel> {
        let mut units = Vec::new();
        for panel in &self.store.required {
            let adjusted = adjust(panel, &self.settings);
            for i in 0..panel.quantity {
                let label = if panel.quantity > 1 {
                    Some(format!(
                        "{} {}/{}",
                        panel.label.as_deref().unwrap_or("Panel"),
                        i + 1,
                        panel.quantity
                    ))
                } else {
                    panel.label.clone()
                };
                units.push(AdjustedPanel {
                    label,
                    ..adjusted.clone()
                });
            }
        }
        units.sort_by(|a, b| b.area().total_cmp(&a.area()));
        units
    }

    /// Attempts the panel at the given position in one orientation,
    /// checking sheet bounds and grid occupancy with kerf clearance.
    fn try_fit(
        &self,
        panel: &AdjustedPanel,
        x: f64,
        y: f64,
        rotated: bool,
        grid: &SpaceGrid,
        sheet_length: f64,
        sheet_width: f64,
    ) -> Option<Cut> {
        let (panel_length, panel_width) = if rotated {
            (panel.width, panel.length)
        } else {
            (panel.length, panel.width)
        };
        if panel_length <= 0.0 || panel_width <= 0.0 {
            return None;
        }

        let total_w = panel_width + self.settings.kerf_width;
        let total_l = panel_length + self.settings.kerf_width;
        if x + total_w > sheet_length || y + total_l > sheet_width {
            return None;
        }
        if !grid.is_free(x, y, total_w, total_l) {
            return None;
        }

        Some(Cut {
            x,
            y,
            width: panel_width,
            length: panel_length,
            label: panel.label.clone(),
            color: panel.color.clone(),
            rotated,
        })
    }

    /// Best orientation of one panel at a position; rotation wins only
    /// on a strictly better score.
    fn best_orientation(
        &self,
        panel: &AdjustedPanel,
        x: f64,
        y: f64,
        grid: &SpaceGrid,
        sheet_length: f64,
        sheet_width: f64,
        existing_cuts: &[Cut],
    ) -> Option<Cut> {
        let normal = self.try_fit(panel, x, y, false, grid, sheet_length, sheet_width);
        let rotated = if panel.can_rotate {
            self.try_fit(panel, x, y, true, grid, sheet_length, sheet_width)
        } else {
            None
        };

        match (normal, rotated) {
            (None, None) => None,
            (Some(n), None) => Some(n),
            (None, Some(r)) => Some(r),
            (Some(n), Some(r)) => {
                let normal_score = fit_score(&n, existing_cuts, sheet_length, sheet_width);
                let rotated_score = fit_score(&r, existing_cuts, sheet_length, sheet_width);
                if rotated_score > normal_score {
                    Some(r)
                } else {
                    Some(n)
                }
            }
        }
    }

    /// Highest-scoring panel/orientation for the position across all
    /// remaining panels. Ties keep the first panel index encountered.
    fn best_panel_for_position(
        &self,
        x: f64,
        y: f64,
        panels: &[AdjustedPanel],
        grid: &SpaceGrid,
        sheet_length: f64,
        sheet_width: f64,
        existing_cuts: &[Cut],
    ) -> Option<(usize, Cut)> {
        let mut best: Option<(usize, Cut)> = None;
        let mut best_score = f64::NEG_INFINITY;

        for (i, panel) in panels.iter().enumerate() {
            if let Some(fit) =
                self.best_orientation(panel, x, y, grid, sheet_length, sheet_width, existing_cuts)
            {
                let score = fit_score(&fit, existing_cuts, sheet_length, sheet_width);
                if score > best_score {
                    best_score = score;
                    best = Some((i, fit));
                }
            }
        }
        best
    }

    fn calculate_layout(&self) -> CalculationResult {
        let instances = self.store.stock_instances();
        let mut remaining = self.expand_required();
        let total_required_area: f64 = remaining.iter().map(|p| p.area()).sum();

        let mut layouts: Vec<PanelLayout> = Vec::new();

        for sheet in &instances {
            if remaining.is_empty() {
                break;
            }

            let mut grid = match SpaceGrid::new(sheet.length, sheet.width) {
                Ok(grid) => grid,
                Err(GridTooLarge { cols, rows }) => {
                    tracing::error!(
                        cols,
                        rows,
                        sheet_length = sheet.length,
                        sheet_width = sheet.width,
                        "sheet dimensions exceed grid bound, aborting calculation"
                    );
                    return CalculationResult::empty();
                }
            };

            let mut cuts: Vec<Cut> = Vec::new();
            while let Some((x, y)) = grid.next_position() {
                match self.best_panel_for_position(
                    x,
                    y,
                    &remaining,
                    &grid,
                    sheet.length,
                    sheet.width,
                    &cuts,
                ) {
                    Some((panel_index, fit)) => {
                        grid.mark(
                            fit.x,
                            fit.y,
                            fit.width + self.settings.kerf_width,
                            fit.length + self.settings.kerf_width,
                        );
                        cuts.push(fit);
                        remaining.remove(panel_index);
                        if remaining.is_empty() {
                            break;
                        }
                    }
                    None => {
                        // Nothing fits here; retire the single cell so
                        // the scan makes progress.
                        grid.mark(x, y, CELL, CELL);
                    }
                }
            }

            layouts.push(PanelLayout {
                length: sheet.length,
                width: sheet.width,
                cuts,
            });
        }

        let stats = compute_stats(
            &instances[..layouts.len()],
            &layouts,
            total_required_area,
            &self.settings,
        );
        CalculationResult {
            layouts,
            remaining_panels: remaining,
            stats,
        }
    }
}

impl Packer for GridPacker {
    fn add_stock_panels(&mut self, panels: &[StockPanel]) {
        self.store.stock.extend_from_slice(panels);
    }

    fn add_required_panels(&mut self, panels: &[RequiredPanel]) {
        self.store.required.extend_from_slice(panels);
    }

    fn stock_panels(&self) -> Vec<StockPanel> {
        self.store.stock.clone()
    }

    fn required_panels(&self) -> Vec<RequiredPanel> {
        self.store.required.clone()
    }

    fn clear_stock_panels(&mut self) {
        self.store.stock.clear();
    }

    fn clear_required_panels(&mut self) {
        self.store.required.clear();
    }

    fn pack(&mut self) -> CalculationResult {
        self.calculate_layout()
    }
}
