//! Engine selection: a closed registry mapping configuration
//! identifiers to packer constructors, and the one-shot [`pack`]
//! entry point the presentation layer calls.

use crate::grid::GridPacker;
use crate::maxrects::MaxRectsPacker;
use crate::packer::{Packer, PackerError};
use crate::types::{CalculationResult, EngineKind, RequiredPanel, Settings, StockPanel};

type Constructor = fn(Settings) -> Box<dyn Packer>;

/// The closed set of registered engines. Identifiers match the
/// serde names of [`EngineKind`].
const ENGINES: &[(&str, Constructor)] = &[
    ("grid-heuristic", |settings| {
        Box::new(GridPacker::new(settings))
    }),
    ("maximal-rectangles", |settings| {
        Box::new(MaxRectsPacker::new(settings))
    }),
];

/// All registered engine identifiers, in registration order.
pub fn engine_names() -> Vec<&'static str> {
    ENGINES.iter().map(|(name, _)| *name).collect()
}

/// Constructs the engine for a typed selector. Infallible: the enum
/// is the registry's closed key set.
pub fn create_packer(kind: EngineKind, settings: Settings) -> Box<dyn Packer> {
    match kind {
        EngineKind::GridHeuristic => Box::new(GridPacker::new(settings)),
        EngineKind::MaximalRectangles => Box::new(MaxRectsPacker::new(settings)),
    }
}

/// Constructs an engine from a configuration string. Unknown
/// identifiers fail with the requested name and the valid set.
pub fn create_packer_by_name(
    name: &str,
    settings: Settings,
) -> Result<Box<dyn Packer>, PackerError> {
    match ENGINES.iter().find(|(n, _)| *n == name) {
        Some((_, build)) => Ok(build(settings)),
        None => Err(PackerError::UnknownEngine {
            requested: name.to_string(),
            valid: engine_names(),
        }),
    }
}

impl std::str::FromStr for EngineKind {
    type Err = PackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grid-heuristic" => Ok(EngineKind::GridHeuristic),
            "maximal-rectangles" => Ok(EngineKind::MaximalRectangles),
            _ => Err(PackerError::UnknownEngine {
                requested: s.to_string(),
                valid: engine_names(),
            }),
        }
    }
}

/// Runs one complete calculation: constructs the engine selected by
/// `settings.engine`, loads both panel lists, and packs. The result
/// is owned by the caller.
pub fn pack(
    stock: &[StockPanel],
    required: &[RequiredPanel],
    settings: &Settings,
) -> CalculationResult {
    let mut packer = create_packer(settings.engine, settings.clone());
    packer.add_stock_panels(stock);
    packer.add_required_panels(required);
    packer.pack()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cut;

    const ENGINE_KINDS: [EngineKind; 2] =
        [EngineKind::GridHeuristic, EngineKind::MaximalRectangles];

    /// Validates a complete result:
    /// 1. Every cut lies within its sheet's bounds
    /// 2. No two cuts on a sheet violate the kerf clearance
    /// 3. Placed plus remaining units equals the total demand
    fn assert_result_valid(
        result: &CalculationResult,
        settings: &Settings,
        total_units: u32,
        engine: EngineKind,
    ) {
        let eps = 1e-9;
        for (si, layout) in result.layouts.iter().enumerate() {
            for (ci, cut) in layout.cuts.iter().enumerate() {
                assert!(
                    cut.x >= -eps && cut.y >= -eps,
                    "{engine}: sheet {si} cut {ci} has negative origin ({}, {})",
                    cut.x,
                    cut.y
                );
                assert!(
                    cut.x + cut.width <= layout.length + eps,
                    "{engine}: sheet {si} cut {ci} exceeds sheet length: {} + {} > {}",
                    cut.x,
                    cut.width,
                    layout.length
                );
                assert!(
                    cut.y + cut.length <= layout.width + eps,
                    "{engine}: sheet {si} cut {ci} exceeds sheet width: {} + {} > {}",
                    cut.y,
                    cut.length,
                    layout.width
                );
            }
            assert_kerf_clearance(si, &layout.cuts, settings.kerf_width, engine);
        }

        let placed = result.total_cuts();
        assert_eq!(
            placed + result.remaining_panels.len(),
            total_units as usize,
            "{engine}: {placed} placed + {} remaining != {total_units} required",
            result.remaining_panels.len()
        );
    }

    /// Each cut carries a kerf margin to its right and below; padded
    /// rectangles of two cuts may not overlap.
    fn assert_kerf_clearance(sheet_idx: usize, cuts: &[Cut], kerf: f64, engine: EngineKind) {
        let eps = 1e-9;
        for i in 0..cuts.len() {
            for j in (i + 1)..cuts.len() {
                let a = &cuts[i];
                let b = &cuts[j];
                let overlaps = a.x < b.x + b.width + kerf - eps
                    && b.x < a.x + a.width + kerf - eps
                    && a.y < b.y + b.length + kerf - eps
                    && b.y < a.y + a.length + kerf - eps;
                assert!(
                    !overlaps,
                    "{engine}: sheet {sheet_idx}: cut {i} ({}x{} @ ({},{})) too close to cut {j} ({}x{} @ ({},{}))",
                    a.width, a.length, a.x, a.y, b.width, b.length, b.x, b.y
                );
            }
        }
    }

    fn settings_for(engine: EngineKind) -> Settings {
        Settings {
            engine,
            ..Settings::default()
        }
    }

    #[test]
    fn test_create_packer_by_name() {
        for name in engine_names() {
            assert!(create_packer_by_name(name, Settings::default()).is_ok());
        }
    }

    #[test]
    fn test_unknown_engine_is_a_configuration_error() {
        let err = create_packer_by_name("guillotine", Settings::default())
            .err()
            .unwrap();
        match err {
            PackerError::UnknownEngine { requested, valid } => {
                assert_eq!(requested, "guillotine");
                assert_eq!(valid, vec!["grid-heuristic", "maximal-rectangles"]);
            }
        }
    }

    #[test]
    fn test_engine_kind_from_str_round_trip() {
        for kind in ENGINE_KINDS {
            assert_eq!(kind.as_str().parse::<EngineKind>().unwrap(), kind);
        }
        assert!("Guillotine".parse::<EngineKind>().is_err());
    }

    #[test]
    fn test_accumulated_lists_are_returned_as_copies() {
        let mut packer = create_packer(EngineKind::GridHeuristic, Settings::default());
        let stock = vec![StockPanel::new(2440.0, 1220.0, 2)];
        let required = vec![RequiredPanel::new(600.0, 400.0, 3)];
        packer.add_stock_panels(&stock);
        packer.add_required_panels(&required);
        assert_eq!(packer.stock_panels(), stock);
        assert_eq!(packer.required_panels(), required);

        packer.clear_stock_panels();
        assert!(packer.stock_panels().is_empty());
        assert_eq!(packer.required_panels(), required);
    }

    /// One 600x400 piece on a 2440x1220 sheet: single cut at the
    /// origin and a yield just above 8%.
    #[test]
    fn test_single_piece_scenario() {
        for engine in ENGINE_KINDS {
            let settings = settings_for(engine);
            let result = pack(
                &[StockPanel::new(2440.0, 1220.0, 1)],
                &[RequiredPanel::new(600.0, 400.0, 1)],
                &settings,
            );
            assert_result_valid(&result, &settings, 1, engine);

            assert_eq!(result.layouts.len(), 1, "{engine}");
            assert_eq!(result.layouts[0].cuts.len(), 1, "{engine}");
            let cut = &result.layouts[0].cuts[0];
            assert_eq!((cut.x, cut.y), (0.0, 0.0), "{engine}");
            assert_eq!(cut.length, 600.0, "{engine}");
            assert_eq!(cut.width, 400.0, "{engine}");
            assert!(result.remaining_panels.is_empty(), "{engine}");

            let expected_yield = 240_000.0 / (2440.0 * 1220.0) * 100.0;
            assert!(
                (result.stats.material_yield - expected_yield).abs() < 1e-6,
                "{engine}: yield {}",
                result.stats.material_yield
            );
        }
    }

    /// 600x600 and 500x500 on one 1000x1000 sheet: the combined area
    /// fits but no heuristic packs both; exactly one is parked.
    #[test]
    fn test_overdemand_parks_one_piece() {
        for engine in ENGINE_KINDS {
            let settings = settings_for(engine);
            let result = pack(
                &[StockPanel::new(1000.0, 1000.0, 1)],
                &[
                    RequiredPanel::new(600.0, 600.0, 1),
                    RequiredPanel::new(500.0, 500.0, 1),
                ],
                &settings,
            );
            assert_result_valid(&result, &settings, 2, engine);
            assert_eq!(result.remaining_panels.len(), 1, "{engine}");
            assert_eq!(result.total_cuts(), 1, "{engine}");
        }
    }

    /// A 600x400 piece on a 500x500 sheet fits in neither orientation
    /// and lands in the remaining list even with rotation allowed.
    #[test]
    fn test_unplaceable_in_both_orientations() {
        for engine in ENGINE_KINDS {
            let settings = settings_for(engine);
            let result = pack(
                &[StockPanel::new(500.0, 500.0, 1)],
                &[RequiredPanel::new(600.0, 400.0, 1)],
                &settings,
            );
            assert_result_valid(&result, &settings, 1, engine);
            assert_eq!(result.total_cuts(), 0, "{engine}");
            assert_eq!(result.remaining_panels.len(), 1, "{engine}");
            assert_eq!(result.remaining_panels[0].original_length, 600.0);
        }
    }

    /// Two 300x300 pieces with kerf 5: adjacent cuts keep at least the
    /// blade width between them.
    #[test]
    fn test_kerf_separation() {
        let settings = Settings {
            engine: EngineKind::MaximalRectangles,
            kerf_width: 5.0,
            ..Settings::default()
        };
        let result = pack(
            &[StockPanel::new(700.0, 300.0, 1)],
            &[RequiredPanel::new(300.0, 300.0, 2)],
            &settings,
        );
        assert_result_valid(&result, &settings, 2, EngineKind::MaximalRectangles);
        assert_eq!(result.total_cuts(), 2);

        let cuts = &result.layouts[0].cuts;
        let (left, right) = if cuts[0].x <= cuts[1].x {
            (&cuts[0], &cuts[1])
        } else {
            (&cuts[1], &cuts[0])
        };
        assert!(right.x - (left.x + left.width) >= 5.0 - 1e-9);
    }

    /// Same kerf property for the grid engine, on a sheet tall enough
    /// for the clearance below the pieces.
    #[test]
    fn test_kerf_separation_grid() {
        let settings = Settings {
            engine: EngineKind::GridHeuristic,
            kerf_width: 5.0,
            ..Settings::default()
        };
        let result = pack(
            &[StockPanel::new(700.0, 310.0, 1)],
            &[RequiredPanel::new(300.0, 300.0, 2)],
            &settings,
        );
        assert_result_valid(&result, &settings, 2, EngineKind::GridHeuristic);
        assert_eq!(result.total_cuts(), 2);

        let cuts = &result.layouts[0].cuts;
        let (left, right) = if cuts[0].x <= cuts[1].x {
            (&cuts[0], &cuts[1])
        } else {
            (&cuts[1], &cuts[0])
        };
        assert!(right.x - (left.x + left.width) >= 5.0 - 1e-9);
    }

    #[test]
    fn test_grain_respected_by_both_engines() {
        for engine in ENGINE_KINDS {
            let settings = Settings {
                engine,
                consider_grain: true,
                ..Settings::default()
            };
            let result = pack(
                &[StockPanel::new(2440.0, 1220.0, 2)],
                &[
                    RequiredPanel::new(800.0, 600.0, 3),
                    RequiredPanel::new(400.0, 300.0, 5),
                ],
                &settings,
            );
            assert_result_valid(&result, &settings, 8, engine);
            for cut in result.layouts.iter().flat_map(|l| &l.cuts) {
                assert!(!cut.rotated, "{engine}: grain-locked cut was rotated");
                // Unrotated cuts keep the requested orientation.
                assert!(
                    (cut.length, cut.width) == (800.0, 600.0)
                        || (cut.length, cut.width) == (400.0, 300.0),
                    "{engine}: unexpected cut size {}x{}",
                    cut.length,
                    cut.width
                );
            }
        }
    }

    #[test]
    fn test_deterministic_across_runs() {
        for engine in ENGINE_KINDS {
            let settings = Settings {
                engine,
                kerf_width: 3.0,
                ..Settings::default()
            };
            let stock = [
                StockPanel::new(2440.0, 1220.0, 3),
                StockPanel::new(1000.0, 1000.0, 2),
            ];
            let required = [
                RequiredPanel::new(800.0, 600.0, 4),
                RequiredPanel::new(600.0, 400.0, 6),
                RequiredPanel::new(350.0, 250.0, 8),
            ];
            let first = pack(&stock, &required, &settings);
            let second = pack(&stock, &required, &settings);
            assert_eq!(first, second, "{engine}: pack is not deterministic");
        }
    }

    /// Mixed batch across several sheets: conservation and clearance
    /// hold for every engine.
    #[test]
    fn test_mixed_batch_conservation() {
        for engine in ENGINE_KINDS {
            let settings = Settings {
                engine,
                kerf_width: 4.0,
                ..Settings::default()
            };
            let result = pack(
                &[StockPanel::new(2440.0, 1220.0, 4)],
                &[
                    RequiredPanel::new(1200.0, 600.0, 3),
                    RequiredPanel::new(700.0, 500.0, 5),
                    RequiredPanel::new(450.0, 450.0, 4),
                    RequiredPanel::new(300.0, 200.0, 8),
                ],
                &settings,
            );
            assert_result_valid(&result, &settings, 20, engine);
            assert!(result.stats.material_yield > 0.0, "{engine}");
            assert!(result.stats.total_cut_length > 0.0, "{engine}");
        }
    }

    #[test]
    fn test_price_aggregation_over_opened_sheets() {
        for engine in ENGINE_KINDS {
            let settings = Settings {
                engine,
                calculate_price: true,
                ..Settings::default()
            };
            let result = pack(
                &[StockPanel {
                    price: Some(42.5),
                    ..StockPanel::new(2440.0, 1220.0, 3)
                }],
                &[RequiredPanel::new(600.0, 400.0, 1)],
                &settings,
            );
            // One sheet opened, two untouched.
            assert_eq!(result.layouts.len(), 1, "{engine}");
            assert_eq!(result.stats.estimated_cost, Some(42.5), "{engine}");
        }
    }

    #[test]
    fn test_no_demand_yields_empty_result() {
        for engine in ENGINE_KINDS {
            let settings = settings_for(engine);
            let result = pack(&[StockPanel::new(2440.0, 1220.0, 1)], &[], &settings);
            assert!(result.layouts.is_empty(), "{engine}");
            assert!(result.remaining_panels.is_empty(), "{engine}");
            assert_eq!(result.stats.stock_panels_used, 0, "{engine}");
        }
    }
}
