//! Parsed representation of a settings query string.

use alloc::collections::BTreeMap;
use alloc::string::String;

use crate::glyph::GapModel;
use crate::plan::ExportFormat;

/// Parsed stamp settings. Every field is optional; unset fields leave the
/// base [`LayoutParams`](crate::LayoutParams) untouched.
///
/// Produced by [`crate::query::parse()`], consumed by
/// [`apply()`](Self::apply) and [`date()`](Self::date).
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Instructions {
    /// Year in century (`yy`, `year`). Clamped on use.
    pub year: Option<i32>,
    /// Month (`mm`, `month`). Clamped on use.
    pub month: Option<i32>,
    /// Day (`dd`, `day`). Clamped on use.
    pub day: Option<i32>,
    /// Glyph height fraction (`scale`).
    pub scale: Option<f64>,
    /// Right margin in pixels (`margin`, `margin.right`).
    pub margin_right: Option<f64>,
    /// Bottom margin in pixels (`margin`, `margin.bottom`).
    pub margin_bottom: Option<f64>,
    /// Right margin as a fraction of width (`marginx`).
    pub margin_x: Option<f64>,
    /// Bottom margin as a fraction of height (`marginy`).
    pub margin_y: Option<f64>,
    /// Gap width ratio (`space`, `spaceratio`).
    pub space_ratio: Option<f64>,
    /// Gap model (`gap`).
    pub gap: Option<GapModel>,
    /// Wide-gap multiplier (`firstspace`).
    pub first_space_multiplier: Option<f64>,
    /// Bounding box outline (`bounds`).
    pub show_bounds: Option<bool>,
    /// Export format (`format`).
    pub format: Option<ExportFormat>,
    /// Unrecognized keys, preserved for the host.
    pub extras: BTreeMap<String, String>,
}

impl Default for Instructions {
    fn default() -> Self {
        Self::new()
    }
}

impl Instructions {
    /// Create empty instructions.
    pub fn new() -> Self {
        Self {
            year: None,
            month: None,
            day: None,
            scale: None,
            margin_right: None,
            margin_bottom: None,
            margin_x: None,
            margin_y: None,
            space_ratio: None,
            gap: None,
            first_space_multiplier: None,
            show_bounds: None,
            format: None,
            extras: BTreeMap::new(),
        }
    }

    /// Whether any layout field is set (date and format excluded).
    pub fn has_layout(&self) -> bool {
        self.scale.is_some()
            || self.margin_right.is_some()
            || self.margin_bottom.is_some()
            || self.margin_x.is_some()
            || self.margin_y.is_some()
            || self.space_ratio.is_some()
            || self.gap.is_some()
            || self.first_space_multiplier.is_some()
            || self.show_bounds.is_some()
    }

    /// Access unrecognized parameters preserved during parsing.
    pub fn extras(&self) -> &BTreeMap<String, String> {
        &self.extras
    }
}
