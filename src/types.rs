use serde::{Deserialize, Serialize};

/// A sheet of raw material available to cut pieces from. `quantity`
/// identical instances exist; the engines expand it during packing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPanel {
    pub length: f64,
    pub width: f64,
    pub quantity: u32,
    /// Cost per sheet, used only when `Settings::calculate_price` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl StockPanel {
    pub fn new(length: f64, width: f64, quantity: u32) -> Self {
        Self {
            length,
            width,
            quantity,
            price: None,
        }
    }

    pub fn area(&self) -> f64 {
        self.length * self.width
    }
}

impl std::fmt::Display for StockPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.length, self.width)
    }
}

/// A finished piece that must be cut from some stock panel, with its
/// nominal (pre-adjustment) dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredPanel {
    pub length: f64,
    pub width: f64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl RequiredPanel {
    pub fn new(length: f64, width: f64, quantity: u32) -> Self {
        Self {
            length,
            width,
            quantity,
            label: None,
            color: None,
        }
    }
}

/// One unit of a required panel after edge-trim/banding adjustment.
/// `original_length`/`original_width` keep the nominal size for
/// leftover reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedPanel {
    pub length: f64,
    pub width: f64,
    pub original_length: f64,
    pub original_width: f64,
    pub can_rotate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl AdjustedPanel {
    pub fn area(&self) -> f64 {
        self.length * self.width
    }
}

/// A placed piece. The x axis spans the sheet's `length`, the y axis
/// its `width`; an unrotated cut occupies `width` along x and `length`
/// along y, a rotated one the transpose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cut {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub length: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub rotated: bool,
}

impl Cut {
    pub fn perimeter(&self) -> f64 {
        2.0 * (self.width + self.length)
    }
}

/// The cuts placed on one opened sheet instance, in placement order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelLayout {
    pub length: f64,
    pub width: f64,
    pub cuts: Vec<Cut>,
}

/// Aggregate figures over a whole calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_stock_area: f64,
    pub total_required_area: f64,
    /// Required area over opened stock area, as a percentage.
    pub material_yield: f64,
    /// Number of sheets that received at least one cut.
    pub stock_panels_used: usize,
    /// Sum of cut perimeters.
    pub total_cut_length: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// One layout per opened sheet instance, in opening order.
    pub layouts: Vec<PanelLayout>,
    /// Units that could not be placed on any available sheet.
    pub remaining_panels: Vec<AdjustedPanel>,
    pub stats: Stats,
}

impl CalculationResult {
    /// The all-zero result returned when a calculation aborts.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn total_cuts(&self) -> usize {
        self.layouts.iter().map(|l| l.cuts.len()).sum()
    }
}

/// Placement engine selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    #[default]
    GridHeuristic,
    MaximalRectangles,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::GridHeuristic => "grid-heuristic",
            EngineKind::MaximalRectangles => "maximal-rectangles",
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-owned settings for one calculation. All lengths are in the
/// caller's display unit; the engines never convert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineKind,
    /// Blade clearance added around every placed piece.
    pub kerf_width: f64,
    /// When true, grain direction must be preserved and pieces never rotate.
    pub consider_grain: bool,
    pub calculate_price: bool,
    pub include_edge_banding: bool,
    pub edge_banding_thickness: f64,
    pub include_edge_trimming: bool,
    pub edge_trim_amount: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            kerf_width: 0.0,
            consider_grain: false,
            calculate_price: false,
            include_edge_banding: false,
            edge_banding_thickness: 0.0,
            include_edge_trimming: false,
            edge_trim_amount: 0.0,
        }
    }
}
