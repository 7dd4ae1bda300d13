//! Pure geometry and scoring primitives shared by both placement
//! engines.

use crate::types::Cut;

/// An axis-aligned region of a sheet. The x axis spans the sheet's
/// length, the y axis its width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Separating-axis overlap test. Touching edges do not count as
    /// an intersection.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(other.x >= self.x + self.w
            || other.x + other.w <= self.x
            || other.y >= self.y + self.h
            || other.y + other.h <= self.y)
    }

    pub fn contained_in(&self, other: &Rect) -> bool {
        self.x >= other.x
            && self.y >= other.y
            && self.x + self.w <= other.x + other.w
            && self.y + self.h <= other.y + other.h
    }
}

/// Overlap length of two 1D intervals, zero when disjoint.
pub fn common_interval(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> f64 {
    if a_end < b_start || b_end < a_start {
        return 0.0;
    }
    a_end.min(b_end) - a_start.max(b_start)
}

// Tuned scoring weights. These have no derivation; they are kept
// exactly as shipped so layouts stay reproducible.
const EDGE_BONUS: f64 = 20.0;
const ALIGN_BONUS: f64 = 15.0;
const WASTE_PENALTY: f64 = 30.0;
/// Gaps narrower than this against a sheet edge are considered an
/// unusable waste strip.
const MIN_USEFUL_STRIP: f64 = 50.0;
/// Two cut edges closer than this count as aligned.
const ALIGN_EPS: f64 = 1.0;

/// Scores a candidate placement for the grid engine. Base score is
/// piece/sheet area efficiency as a percentage, with bonuses for
/// touching sheet edges and aligning with existing cut edges, and a
/// penalty for each narrow waste strip left against a sheet edge.
pub fn fit_score(fit: &Cut, existing_cuts: &[Cut], sheet_length: f64, sheet_width: f64) -> f64 {
    let efficiency = (fit.width * fit.length) / (sheet_length * sheet_width);
    let mut score = efficiency * 100.0;

    if fit.x == 0.0 {
        score += EDGE_BONUS;
    }
    if fit.y == 0.0 {
        score += EDGE_BONUS;
    }
    if fit.x + fit.width == sheet_length {
        score += EDGE_BONUS;
    }
    if fit.y + fit.length == sheet_width {
        score += EDGE_BONUS;
    }

    for cut in existing_cuts {
        // Horizontal edge alignment
        if (fit.y - (cut.y + cut.length)).abs() < ALIGN_EPS {
            score += ALIGN_BONUS;
        }
        if (fit.y + fit.length - cut.y).abs() < ALIGN_EPS {
            score += ALIGN_BONUS;
        }
        // Vertical edge alignment
        if (fit.x - (cut.x + cut.width)).abs() < ALIGN_EPS {
            score += ALIGN_BONUS;
        }
        if (fit.x + fit.width - cut.x).abs() < ALIGN_EPS {
            score += ALIGN_BONUS;
        }
    }

    if fit.x > 0.0 && fit.x < MIN_USEFUL_STRIP {
        score -= WASTE_PENALTY;
    }
    if sheet_length - (fit.x + fit.width) > 0.0
        && sheet_length - (fit.x + fit.width) < MIN_USEFUL_STRIP
    {
        score -= WASTE_PENALTY;
    }
    if fit.y > 0.0 && fit.y < MIN_USEFUL_STRIP {
        score -= WASTE_PENALTY;
    }
    if sheet_width - (fit.y + fit.length) > 0.0
        && sheet_width - (fit.y + fit.length) < MIN_USEFUL_STRIP
    {
        score -= WASTE_PENALTY;
    }

    score
}
