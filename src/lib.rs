//! 2D cutting-stock optimization: assigns required rectangular pieces
//! to stock sheets, minimizing waste under blade-kerf spacing, optional
//! edge-banding/trimming adjustments, and grain-direction restrictions.
//!
//! Two interchangeable engines implement the [`packer::Packer`]
//! contract: a grid-based greedy heuristic ([`grid`]) and a
//! maximal-free-rectangles heuristic family ([`maxrects`]). Callers
//! select one through [`factory`] and usually just call
//! [`factory::pack`].

pub mod adjust;
pub mod factory;
pub mod geometry;
pub mod grid;
pub mod maxrects;
pub mod packer;
pub mod render;
pub mod types;

pub use factory::{create_packer, create_packer_by_name, engine_names, pack};
pub use maxrects::FitRule;
pub use packer::{Packer, PackerError};
pub use types::{
    AdjustedPanel, CalculationResult, Cut, EngineKind, PanelLayout, RequiredPanel, Settings,
    Stats, StockPanel,
};
