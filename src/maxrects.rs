//! Maximal-rectangles placement engine.
//!
//! Each sheet maintains an exact set of maximal free rectangles.
//! Insertion evaluates every free rectangle under a selectable fit
//! rule; after a placement every intersecting free rectangle is split
//! into up to four residuals and the list is pruned of rectangles
//! contained in another.
//!
//! Kerf convention: `MaxRectsBin` works entirely in kerf-padded
//! dimensions. The free list is seeded with the sheet extended by one
//! kerf on each axis, callers pass padded piece sizes to `insert`, and
//! no fit rule re-adds the padding.

use crate::adjust::adjust;
use crate::geometry::{Rect, common_interval};
use crate::packer::{Packer, PanelStore, compute_stats};
use crate::types::{
    AdjustedPanel, CalculationResult, Cut, PanelLayout, RequiredPanel, Settings, StockPanel,
};

/// Free-rectangle selection rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FitRule {
    /// Minimize the smaller leftover margin, tie-break on the larger.
    #[default]
    BestShortSide,
    /// Minimize the larger leftover margin, tie-break on the smaller.
    BestLongSide,
    /// Minimize leftover area, tie-break on the short-side margin.
    BestArea,
    /// Minimize the resulting top edge, tie-break on x.
    BottomLeft,
    /// Maximize shared edge length with sheet borders and placed pieces.
    ContactPoint,
}

/// One sheet's free/used rectangle sets, in padded coordinates.
struct MaxRectsBin {
    bin_length: f64,
    bin_width: f64,
    free: Vec<Rect>,
    used: Vec<Rect>,
}

impl MaxRectsBin {
    fn new(sheet_length: f64, sheet_width: f64, kerf: f64) -> Self {
        let bin_length = sheet_length + kerf;
        let bin_width = sheet_width + kerf;
        Self {
            bin_length,
            bin_width,
            free: vec![Rect::new(0.0, 0.0, bin_length, bin_width)],
            used: Vec::new(),
        }
    }

    /// Places a `w`×`h` (padded) rectangle under the given rule.
    /// Returns the placed node, or `None` when no free rectangle can
    /// hold it.
    fn insert(&mut self, w: f64, h: f64, rule: FitRule) -> Option<Rect> {
        let node = self.find_position(w, h, rule)?;
        self.place(node);
        Some(node)
    }

    fn find_position(&self, w: f64, h: f64, rule: FitRule) -> Option<Rect> {
        match rule {
            FitRule::BestShortSide => self.find_best_short_side(w, h),
            FitRule::BestLongSide => self.find_best_long_side(w, h),
            FitRule::BestArea => self.find_best_area(w, h),
            FitRule::BottomLeft => self.find_bottom_left(w, h),
            FitRule::ContactPoint => self.find_contact_point(w, h),
        }
    }

    fn find_best_short_side(&self, w: f64, h: f64) -> Option<Rect> {
        let mut best: Option<Rect> = None;
        let mut best_short = f64::INFINITY;
        let mut best_long = f64::INFINITY;

        for free in &self.free {
            if free.w >= w && free.h >= h {
                let leftover_x = free.w - w;
                let leftover_y = free.h - h;
                let short = leftover_x.min(leftover_y);
                let long = leftover_x.max(leftover_y);
                if short < best_short || (short == best_short && long < best_long) {
                    best = Some(Rect::new(free.x, free.y, w, h));
                    best_short = short;
                    best_long = long;
                }
            }
        }
        best
    }

    fn find_best_long_side(&self, w: f64, h: f64) -> Option<Rect> {
        let mut best: Option<Rect> = None;
        let mut best_short = f64::INFINITY;
        let mut best_long = f64::INFINITY;

        for free in &self.free {
            if free.w >= w && free.h >= h {
                let leftover_x = free.w - w;
                let leftover_y = free.h - h;
                let short = leftover_x.min(leftover_y);
                let long = leftover_x.max(leftover_y);
                if long < best_long || (long == best_long && short < best_short) {
                    best = Some(Rect::new(free.x, free.y, w, h));
                    best_short = short;
                    best_long = long;
                }
            }
        }
        best
    }

    fn find_best_area(&self, w: f64, h: f64) -> Option<Rect> {
        let mut best: Option<Rect> = None;
        let mut best_area = f64::INFINITY;
        let mut best_short = f64::INFINITY;

        for free in &self.free {
            if free.w >= w && free.h >= h {
                let area_fit = free.area() - w * h;
                let short = (free.w - w).min(free.h - h);
                if area_fit < best_area || (area_fit == best_area && short < best_short) {
                    best = Some(Rect::new(free.x, free.y, w, h));
                    best_area = area_fit;
                    best_short = short;
                }
            }
        }
        best
    }

    fn find_bottom_left(&self, w: f64, h: f64) -> Option<Rect> {
        let mut best: Option<Rect> = None;
        let mut best_top = f64::INFINITY;
        let mut best_x = f64::INFINITY;

        for free in &self.free {
            if free.w >= w && free.h >= h {
                let top = free.y + h;
                if top < best_top || (top == best_top && free.x < best_x) {
                    best = Some(Rect::new(free.x, free.y, w, h));
                    best_top = top;
                    best_x = free.x;
                }
            }
        }
        best
    }

    fn find_contact_point(&self, w: f64, h: f64) -> Option<Rect> {
        let mut best: Option<Rect> = None;
        let mut best_score = -1.0;

        for free in &self.free {
            if free.w >= w && free.h >= h {
                let score = self.contact_score(free.x, free.y, w, h);
                if score > best_score {
                    best = Some(Rect::new(free.x, free.y, w, h));
                    best_score = score;
                }
            }
        }
        best
    }

    /// Total edge length the candidate would share with the bin
    /// borders and already-placed rectangles.
    fn contact_score(&self, x: f64, y: f64, w: f64, h: f64) -> f64 {
        let mut score = 0.0;

        if x == 0.0 || x + w == self.bin_length {
            score += h;
        }
        if y == 0.0 || y + h == self.bin_width {
            score += w;
        }

        for used in &self.used {
            if used.x == x + w || used.x + used.w == x {
                score += common_interval(used.y, used.y + used.h, y, y + h);
            }
            if used.y == y + h || used.y + used.h == y {
                score += common_interval(used.x, used.x + used.w, x, x + w);
            }
        }
        score
    }

    /// Splits every intersecting free rectangle around the node and
    /// prunes contained rectangles. Builds a fresh list instead of
    /// mutating in place while iterating.
    fn place(&mut self, node: Rect) {
        let mut next: Vec<Rect> = Vec::with_capacity(self.free.len() + 4);
        for free in &self.free {
            if free.intersects(&node) {
                split_free_rect(*free, node, &mut next);
            } else {
                next.push(*free);
            }
        }
        prune(&mut next);
        self.free = next;
        self.used.push(node);
    }
}

/// Residual free rectangles above, below, left and right of the used
/// region. Callers must have established that the two intersect.
fn split_free_rect(free: Rect, used: Rect, out: &mut Vec<Rect>) {
    if used.y > free.y && used.y < free.y + free.h {
        out.push(Rect::new(free.x, free.y, free.w, used.y - free.y));
    }
    if used.y + used.h < free.y + free.h {
        out.push(Rect::new(
            free.x,
            used.y + used.h,
            free.w,
            free.y + free.h - (used.y + used.h),
        ));
    }
    if used.x > free.x && used.x < free.x + free.w {
        out.push(Rect::new(free.x, free.y, used.x - free.x, free.h));
    }
    if used.x + used.w < free.x + free.w {
        out.push(Rect::new(
            used.x + used.w,
            free.y,
            free.x + free.w - (used.x + used.w),
            free.h,
        ));
    }
}

/// Drops every rectangle fully contained within another. The first of
/// two identical rectangles survives.
fn prune(rects: &mut Vec<Rect>) {
    let mut kept: Vec<Rect> = Vec::with_capacity(rects.len());
    'outer: for i in 0..rects.len() {
        for j in 0..rects.len() {
            if i == j {
                continue;
            }
            if rects[i].contained_in(&rects[j]) && (rects[i] != rects[j] || j < i) {
                continue 'outer;
            }
        }
        kept.push(rects[i]);
    }
    *rects = kept;
}

/// Maximal-rectangles engine behind the [`Packer`] contract.
#[derive(Debug, Default)]
pub struct MaxRectsPacker {
    store: PanelStore,
    settings: Settings,
    rule: FitRule,
}

impl MaxRectsPacker {
    pub fn new(settings: Settings) -> Self {
        Self {
            store: PanelStore::default(),
            settings,
            rule: FitRule::default(),
        }
    }

    pub fn with_rule(settings: Settings, rule: FitRule) -> Self {
        Self {
            store: PanelStore::default(),
            settings,
            rule,
        }
    }

    fn calculate_layout(&self) -> CalculationResult {
        let kerf = self.settings.kerf_width;
        let instances = self.store.stock_instances();

        // Adjusted panels with their outstanding quantities.
        let mut groups: Vec<(AdjustedPanel, u32)> = self
            .store
            .required
            .iter()
            .map(|p| (adjust(p, &self.settings), p.quantity))
            .collect();
        let total_required_area: f64 = groups
            .iter()
            .map(|(panel, qty)| panel.area() * f64::from(*qty))
            .sum();

        let mut layouts: Vec<PanelLayout> = Vec::new();

        for sheet in &instances {
            if groups.iter().all(|(_, qty)| *qty == 0) {
                break;
            }

            let mut bin = MaxRectsBin::new(sheet.length, sheet.width, kerf);
            let mut cuts: Vec<Cut> = Vec::new();

            for (panel, qty) in groups.iter_mut() {
                if panel.width <= 0.0 || panel.length <= 0.0 {
                    continue;
                }
                // The full outstanding quantity is attempted on this
                // sheet; the first failed unit parks the rest for the
                // next sheet.
                while *qty > 0 {
                    if let Some(node) = bin.insert(panel.width + kerf, panel.length + kerf, self.rule)
                    {
                        cuts.push(Cut {
                            x: node.x,
                            y: node.y,
                            width: panel.width,
                            length: panel.length,
                            label: panel.label.clone(),
                            color: panel.color.clone(),
                            rotated: false,
                        });
                        *qty -= 1;
                    } else if panel.can_rotate
                        && let Some(node) =
                            bin.insert(panel.length + kerf, panel.width + kerf, self.rule)
                    {
                        cuts.push(Cut {
                            x: node.x,
                            y: node.y,
                            width: panel.length,
                            length: panel.width,
                            label: panel.label.clone(),
                            color: panel.color.clone(),
                            rotated: true,
                        });
                        *qty -= 1;
                    } else {
                        break;
                    }
                }
            }

            layouts.push(PanelLayout {
                length: sheet.length,
                width: sheet.width,
                cuts,
            });
        }

        let mut remaining_panels: Vec<AdjustedPanel> = Vec::new();
        for (panel, qty) in groups {
            for _ in 0..qty {
                remaining_panels.push(panel.clone());
            }
        }

        let stats = compute_stats(
            &instances[..layouts.len()],
            &layouts,
            total_required_area,
            &self.settings,
        );
        CalculationResult {
            layouts,
            remaining_panels,
            stats,
        }
    }
}

impl Packer for MaxRectsPacker {
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
