//! The shared packer contract: the trait both placement engines
//! implement, the accumulated panel lists behind it, and the
//! statistics computed over a finished calculation.

use crate::types::{CalculationResult, PanelLayout, RequiredPanel, Settings, Stats, StockPanel};

/// Uniform capability set of a placement engine. Callers accumulate
/// stock and required panels, then call [`Packer::pack`]; the result
/// is freshly allocated and owned by the caller. `reset` clears both
/// lists for reuse.
///
/// A packer instance holds no other mutable state between calls;
/// callers sharing one instance across threads must serialize access
/// themselves.
pub trait Packer {
    fn add_stock_panels(&mut self, panels: &[StockPanel]);
    fn add_required_panels(&mut self, panels: &[RequiredPanel]);

    /// Defensive copy of the accumulated stock list.
    fn stock_panels(&self) -> Vec<StockPanel>;
    /// Defensive copy of the accumulated required list.
    fn required_panels(&self) -> Vec<RequiredPanel>;

    fn clear_stock_panels(&mut self);
    fn clear_required_panels(&mut self);

    fn pack(&mut self) -> CalculationResult;

    fn reset(&mut self) {
        self.clear_stock_panels();
        self.clear_required_panels();
    }
}

/// Panel lists accumulated between `add_*` calls and `pack`, stored
/// exactly as supplied. Both engines embed one of these.
#[derive(Debug, Clone, Default)]
pub(crate) struct PanelStore {
    pub stock: Vec<StockPanel>,
    pub required: Vec<RequiredPanel>,
}

impl PanelStore {
    /// Expands stock quantities into one entry per sheet instance, in
    /// stock-list traversal order.
    pub fn stock_instances(&self) -> Vec<StockPanel> {
        let mut instances = Vec::new();
        for panel in &self.stock {
            for _ in 0..panel.quantity {
                instances.push(StockPanel {
                    quantity: 1,
                    ..panel.clone()
                });
            }
        }
        instances
    }
}

/// Whole-computation errors. Anything recoverable within one sheet's
/// placement attempt is handled locally by the engines and never
/// surfaces here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackerError {
    /// The requested engine identifier is not registered.
    UnknownEngine {
        requested: String,
        valid: Vec<&'static str>,
    },
}

impl std::fmt::Display for PackerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackerError::UnknownEngine { requested, valid } => {
                write!(
                    f,
                    "unknown packer engine '{}', available engines: {}",
                    requested,
                    valid.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for PackerError {}

/// Aggregates statistics over the opened sheet instances and their
/// layouts. `total_required_area` is the adjusted piece area summed
/// over the full demand, placed or not.
pub(crate) fn compute_stats(
    opened: &[StockPanel],
    layouts: &[PanelLayout],
    total_required_area: f64,
    settings: &Settings,
) -> Stats {
    let total_stock_area: f64 = opened.iter().map(|s| s.area()).sum();
    let total_cut_length: f64 = layouts
        .iter()
        .flat_map(|l| &l.cuts)
        .map(|c| c.perimeter())
        .sum();

    Stats {
        total_stock_area,
        total_required_area,
        material_yield: if total_stock_area > 0.0 {
            total_required_area / total_stock_area * 100.0
        } else {
            0.0
        },
        stock_panels_used: layouts.iter().filter(|l| !l.cuts.is_empty()).count(),
        total_cut_length,
        estimated_cost: settings
            .calculate_price
            .then(|| opened.iter().map(|s| s.price.unwrap_or(0.0)).sum()),
    }
}
