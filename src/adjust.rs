use crate::types::{AdjustedPanel, RequiredPanel, Settings};

/// Converts a required panel's nominal dimensions into the dimensions
/// actually placed. Trimming grows each dimension by twice the trim
/// amount, banding (applied after trimming) shrinks each by twice the
/// banding thickness.
///
/// No lower bound is enforced: a banding thickness larger than half
/// the trimmed dimension yields a non-positive size, which placement
/// rejects as unplaceable rather than treating as fatal.
pub fn adjust(panel: &RequiredPanel, settings: &Settings) -> AdjustedPanel {
    let mut length = panel.length;
    let mut width = panel.width;

    if settings.include_edge_trimming {
        length += 2.0 * settings.edge_trim_amount;
        width += 2.0 * settings.edge_trim_amount;
    }

    if settings.include_edge_banding {
        length -= 2.0 * settings.edge_banding_thickness;
        width -= 2.0 * settings.edge_banding_thickness;
    }

    AdjustedPanel {
        length,
        width,
        original_length: panel.length,
        original_width: panel.width,
        can_rotate: !settings.consider_grain,
        label: panel.label.clone(),
        color: panel.color.clone(),
    }
}
