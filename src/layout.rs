//! Stamp layout: proportional glyph widths and right/bottom anchoring.
//!
//! Computes draw commands for a [`GlyphSequence`] on a canvas of known
//! size. Pure geometry, no pixel operations, no allocations, `no_std`
//! compatible.
//!
//! ```text
//!     canvas_w
//!     ┌───────────────────────────────────────────┐
//!     │                                           │
//!     │                    x_start                │
//!     │                    ┌─────────────────┐    │  ┬ glyph_h
//!     │                    │ ' 2 4 ␣␣ 5 ␣ 0 7│    │  ┴
//!     │                    └─────────────────┘    │  ┬ margin_bottom
//!     └───────────────────────────────────────────┘  ┴
//!                          ├──── total_w ────┤├───┤ margin_right
//! ```
//!
//! # Example
//!
//! ```
//! use zenstamp::{DateValue, GlyphMetrics, LayoutParams, Margins, build_sequence, layout};
//!
//! let mut metrics = GlyphMetrics::new();
//! for key in zenstamp::GlyphKey::ASSETS {
//!     metrics.insert(key, 60, 100);
//! }
//!
//! let params = LayoutParams::new(0.1).margins(Margins::pixels(20.0, 10.0));
//! let seq = build_sequence(DateValue::new(24, 5, 17));
//! let stamp = layout::compute(&seq, &params, 1000, 500, &metrics).unwrap();
//!
//! assert_eq!(stamp.glyph_height, 50.0);
//! assert_eq!(stamp.bounds.right(), 980.0);
//! assert_eq!(stamp.bounds.bottom(), 490.0);
//! ```

use core::fmt;

use num_traits::Float;

use crate::glyph::{GapModel, GlyphKey, GlyphSequence, MAX_GLYPHS};
use crate::orientation::Orientation;

/// Glyph whose aspect ratio sizes the gaps.
pub const REFERENCE_GLYPH: GlyphKey = GlyphKey::Digit(8);

/// Default widening of the year→month gap under [`GapModel::Widened`].
pub const DEFAULT_FIRST_SPACE_MULTIPLIER: f64 = 2.0;

/// Blank border reserved at the right and bottom edges.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Margins {
    /// Absolute pixels.
    Pixels { right: f64, bottom: f64 },
    /// Fraction of canvas width (`x`) and height (`y`), `0.0..=1.0`.
    Fraction { x: f64, y: f64 },
}

impl Margins {
    /// Pixel margins.
    pub fn pixels(right: f64, bottom: f64) -> Self {
        Self::Pixels { right, bottom }
    }

    /// Same pixel margin on both edges.
    pub fn uniform_pixels(margin: f64) -> Self {
        Self::Pixels {
            right: margin,
            bottom: margin,
        }
    }

    /// Fractional margins.
    pub fn fraction(x: f64, y: f64) -> Self {
        Self::Fraction { x, y }
    }

    /// Resolve to `(right, bottom)` pixels for a canvas size.
    pub fn resolve(&self, canvas_w: u32, canvas_h: u32) -> (f64, f64) {
        match *self {
            Self::Pixels { right, bottom } => (right, bottom),
            Self::Fraction { x, y } => (x * canvas_w as f64, y * canvas_h as f64),
        }
    }
}

/// Layout parameters for one stamp.
///
/// Values are taken as given; degenerate settings (zero scale, margins
/// larger than the canvas) produce zero-size or off-canvas layouts rather
/// than errors.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayoutParams {
    /// Glyph height as a fraction of canvas height, `(0, 1]`.
    pub scale: f64,
    pub margins: Margins,
    /// Gap width relative to the reference glyph's width, `0.0..=1.0`.
    pub space_ratio: f64,
    /// Multiplier for [`GlyphKey::WideSpace`]; ≥ 1.
    pub first_space_multiplier: f64,
    pub gap_model: GapModel,
    /// Glyph whose aspect ratio sizes the gaps. Defaults to [`REFERENCE_GLYPH`].
    pub reference_glyph: GlyphKey,
    /// Outline the stamp's bounding box when rendering.
    pub show_bounds: bool,
}

impl LayoutParams {
    /// Parameters with the given scale and landscape defaults for the rest.
    pub fn new(scale: f64) -> Self {
        Self {
            scale,
            margins: Margins::uniform_pixels(200.0),
            space_ratio: 0.35,
            first_space_multiplier: DEFAULT_FIRST_SPACE_MULTIPLIER,
            gap_model: GapModel::default(),
            reference_glyph: REFERENCE_GLYPH,
            show_bounds: false,
        }
    }

    /// Landscape preset: 5% glyph height, 200px margins.
    pub fn landscape() -> Self {
        Self::new(0.05)
    }

    /// Portrait preset: 2.5% glyph height, 100px margins.
    pub fn portrait() -> Self {
        Self::new(0.025).margins(Margins::uniform_pixels(100.0))
    }

    /// Preset for a detected orientation. `None` for
    /// [`Orientation::Unknown`]; callers keep whatever they already had.
    pub fn for_orientation(orientation: Orientation) -> Option<Self> {
        match orientation {
            Orientation::Landscape => Some(Self::landscape()),
            Orientation::Portrait => Some(Self::portrait()),
            Orientation::Unknown => None,
        }
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn space_ratio(mut self, ratio: f64) -> Self {
        self.space_ratio = ratio;
        self
    }

    pub fn first_space_multiplier(mut self, multiplier: f64) -> Self {
        self.first_space_multiplier = multiplier;
        self
    }

    pub fn gap_model(mut self, gap: GapModel) -> Self {
        self.gap_model = gap;
        self
    }

    /// Size gaps from a different glyph than [`REFERENCE_GLYPH`].
    pub fn reference_glyph(mut self, key: GlyphKey) -> Self {
        self.reference_glyph = key;
        self
    }

    pub fn show_bounds(mut self, show: bool) -> Self {
        self.show_bounds = show;
        self
    }
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self::landscape()
    }
}

/// Pixel dimensions of the 11 glyph assets.
///
/// Only the aspect ratio is used. Entries with zero width or height are
/// treated as unavailable.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlyphMetrics {
    sizes: [Option<(u32, u32)>; 11],
}

impl GlyphMetrics {
    /// No glyphs known.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an asset's pixel size. Ignored for space keys.
    pub fn insert(&mut self, key: GlyphKey, width: u32, height: u32) {
        if let Some(i) = key.asset_index() {
            self.sizes[i] = (width > 0 && height > 0).then_some((width, height));
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: GlyphKey, width: u32, height: u32) -> Self {
        self.insert(key, width, height);
        self
    }

    /// `width / height` of an asset, if known.
    pub fn aspect_ratio(&self, key: GlyphKey) -> Option<f64> {
        let (w, h) = self.sizes[key.asset_index()?]?;
        Some(w as f64 / h as f64)
    }

    /// First asset key (in [`GlyphKey::ASSETS`] order) with no usable size.
    pub fn first_missing(&self) -> Option<GlyphKey> {
        GlyphKey::ASSETS
            .iter()
            .copied()
            .find(|&k| self.aspect_ratio(k).is_none())
    }

    pub fn is_complete(&self) -> bool {
        self.first_missing().is_none()
    }
}

/// One glyph to draw, in canvas units.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrawCommand {
    pub key: GlyphKey,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DrawCommand {
    /// Round to whole pixels. Edges are rounded independently so adjacent
    /// glyphs neither overlap nor leave a seam.
    pub fn snapped(&self) -> PixelRect {
        PixelRect::from_edges(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// Integer pixel rectangle. Position may be negative (off-canvas).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        let (l, t) = (Float::round(left) as i64, Float::round(top) as i64);
        let (r, b) = (Float::round(right) as i64, Float::round(bottom) as i64);
        Self {
            x: l,
            y: t,
            width: r.saturating_sub(l).clamp(0, u32::MAX as i64) as u32,
            height: b.saturating_sub(t).clamp(0, u32::MAX as i64) as u32,
        }
    }
}

/// Stamp bounding box: `(x_start, y_top, total_w, glyph_h)`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn snapped(&self) -> PixelRect {
        PixelRect::from_edges(self.x, self.y, self.right(), self.bottom())
    }
}

/// Result of [`compute`]: draw commands plus the overall box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StampLayout {
    commands: [DrawCommand; MAX_GLYPHS],
    count: u8,
    /// Where the stamp sits; stroke this for visual debugging.
    pub bounds: BoundingBox,
    /// Glyph height in canvas units.
    pub glyph_height: f64,
    /// Cursor position after walking the whole sequence, gaps included.
    pub end_x: f64,
}

impl StampLayout {
    /// Draw commands, left to right.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands[..self.count as usize]
    }

    /// Total stamp width, gaps included.
    pub fn total_width(&self) -> f64 {
        self.bounds.width
    }
}

/// Layout failure. No partial output is produced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// A required glyph asset is not available.
    AssetMissing(GlyphKey),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssetMissing(key) => write!(f, "glyph asset missing: {key}"),
        }
    }
}

impl core::error::Error for LayoutError {}

/// Width of one sequence element at the given glyph height.
fn glyph_width(
    key: GlyphKey,
    glyph_h: f64,
    params: &LayoutParams,
    metrics: &GlyphMetrics,
) -> Result<f64, LayoutError> {
    let aspect = |k: GlyphKey| metrics.aspect_ratio(k).ok_or(LayoutError::AssetMissing(k));
    match key {
        GlyphKey::Space => Ok(glyph_h * aspect(params.reference_glyph)? * params.space_ratio),
        GlyphKey::WideSpace => Ok(glyph_h
            * aspect(params.reference_glyph)?
            * params.space_ratio
            * params.first_space_multiplier),
        other => Ok(glyph_h * aspect(other)?),
    }
}

/// Compute draw commands for a glyph sequence on a `canvas_w × canvas_h` canvas.
///
/// All 11 assets must be present in `metrics`, even ones this date does
/// not use; otherwise fails with [`LayoutError::AssetMissing`] naming the
/// first missing key.
pub fn compute(
    sequence: &GlyphSequence,
    params: &LayoutParams,
    canvas_w: u32,
    canvas_h: u32,
    metrics: &GlyphMetrics,
) -> Result<StampLayout, LayoutError> {
    if let Some(key) = metrics.first_missing() {
        return Err(LayoutError::AssetMissing(key));
    }

    // Step 1: glyph height from canvas height.
    let glyph_h = canvas_h as f64 * params.scale;

    // Step 2: per-element widths.
    let mut widths = [0.0f64; MAX_GLYPHS];
    for (slot, key) in widths.iter_mut().zip(sequence.iter()) {
        *slot = glyph_width(key, glyph_h, params, metrics)?;
    }
    let widths = &widths[..sequence.len()];

    // Step 3: total width.
    let total_w: f64 = widths.iter().sum();

    // Step 4: anchor right/bottom.
    let (margin_right, margin_bottom) = params.margins.resolve(canvas_w, canvas_h);
    let x_start = canvas_w as f64 - margin_right - total_w;
    let y_top = canvas_h as f64 - margin_bottom - glyph_h;

    // Step 5: walk left to right.
    let blank = DrawCommand {
        key: GlyphKey::Space,
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };
    let mut commands = [blank; MAX_GLYPHS];
    let mut count = 0usize;
    let mut x = x_start;
    for (key, &w) in sequence.iter().zip(widths) {
        if !key.is_space() {
            commands[count] = DrawCommand {
                key,
                x,
                y: y_top,
                width: w,
                height: glyph_h,
            };
            count += 1;
        }
        x += w;
    }

    let layout = StampLayout {
        commands,
        count: count as u8,
        bounds: BoundingBox {
            x: x_start,
            y: y_top,
            width: total_w,
            height: glyph_h,
        },
        glyph_height: glyph_h,
        end_x: x,
    };
    log::trace!(
        "stamp layout on {canvas_w}x{canvas_h}: {} glyphs, bounds {:?}",
        count,
        layout.bounds
    );
    Ok(layout)
}
