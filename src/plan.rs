//! Stamp pipeline: date + parameters → layout → draw calls on a canvas.
//!
//! The rendering surface and glyph images belong to the host. They are
//! reached through [`Canvas`] and [`GlyphAtlas`]; the core only issues
//! `clear_rect`, `draw_image`, and `stroke_rect`.

use crate::glyph::{DateValue, GlyphKey, GlyphSequence, MAX_GLYPHS};
use crate::layout::{self, BoundingBox, GlyphMetrics, LayoutError, LayoutParams, StampLayout};
use crate::orientation::{Orientation, detect_orientation};

/// A 2D drawing surface.
///
/// Coordinates are canvas pixels as `f64`; implementations decide how to
/// rasterize fractional positions.
pub trait Canvas {
    /// Image type accepted by [`draw_image`](Self::draw_image).
    type Image: ?Sized;

    /// Canvas `(width, height)` in pixels.
    fn size(&self) -> (u32, u32);

    /// Reset a region to transparent.
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Draw `image` scaled into the given rectangle.
    fn draw_image(&mut self, image: &Self::Image, x: f64, y: f64, width: f64, height: f64);

    /// Outline a rectangle (used for the debug bounding box).
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
}

/// Named glyph images supplied by the host.
pub trait GlyphAtlas {
    type Image: ?Sized;

    /// Image for an asset-backed key, if loaded.
    fn glyph(&self, key: GlyphKey) -> Option<&Self::Image>;

    /// Pixel `(width, height)` of a loaded glyph.
    fn glyph_size(&self, key: GlyphKey) -> Option<(u32, u32)>;

    /// Sizes of all loaded assets, for [`layout::compute`].
    fn metrics(&self) -> GlyphMetrics {
        let mut m = GlyphMetrics::new();
        for key in GlyphKey::ASSETS {
            if let Some((w, h)) = self.glyph_size(key) {
                m.insert(key, w, h);
            }
        }
        m
    }
}

/// Output encoding for a stamped photo.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Lossless.
    #[default]
    Png,
    /// Lossy at [`JPEG_QUALITY`].
    Jpeg,
}

/// JPEG quality used for export (maximum).
pub const JPEG_QUALITY: u8 = 100;

impl ExportFormat {
    /// Default download name: `dated_image.png` / `dated_image.jpg`.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Png => "dated_image.png",
            Self::Jpeg => "dated_image.jpg",
        }
    }

    /// Match a file extension or format name, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("png") {
            Some(Self::Png)
        } else if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") {
            Some(Self::Jpeg)
        } else {
            None
        }
    }
}

/// A date stamp to place on a photo.
///
/// # Example
///
/// ```
/// use zenstamp::{DateValue, GlyphKey, GlyphMetrics, Orientation, Stamp};
///
/// let metrics = GlyphKey::ASSETS
///     .iter()
///     .fold(GlyphMetrics::new(), |m, &k| m.with(k, 3, 5));
///
/// let (stamp, orientation) = Stamp::for_photo(4000, 3000, &[], DateValue::new(24, 5, 17));
/// assert_eq!(orientation, Orientation::Landscape);
///
/// let layout = stamp.layout(4000, 3000, &metrics).unwrap();
/// assert_eq!(layout.glyph_height, 150.0);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Stamp {
    pub date: DateValue,
    pub params: LayoutParams,
}

impl Stamp {
    /// Stamp with default (landscape) parameters.
    pub fn new(date: DateValue) -> Self {
        Self {
            date,
            params: LayoutParams::default(),
        }
    }

    /// Stamp with orientation-based defaults for a photo.
    ///
    /// Unknown orientation keeps [`LayoutParams::default`].
    pub fn for_photo(
        width: u32,
        height: u32,
        bytes: &[u8],
        date: DateValue,
    ) -> (Self, Orientation) {
        let orientation = detect_orientation(width, height, bytes);
        let mut stamp = Self::new(date);
        stamp.apply_orientation(orientation);
        (stamp, orientation)
    }

    /// Replace parameters with the preset for `orientation`.
    /// Does nothing for [`Orientation::Unknown`].
    pub fn apply_orientation(&mut self, orientation: Orientation) {
        if let Some(p) = LayoutParams::for_orientation(orientation) {
            self.params = p;
        }
    }

    pub fn params(mut self, params: LayoutParams) -> Self {
        self.params = params;
        self
    }

    pub fn date(mut self, date: DateValue) -> Self {
        self.date = date;
        self
    }

    /// Glyph sequence under the configured gap model.
    pub fn sequence(&self) -> GlyphSequence {
        GlyphSequence::build(self.date, self.params.gap_model)
    }

    /// Lay the stamp out on a `canvas_w × canvas_h` canvas.
    pub fn layout(
        &self,
        canvas_w: u32,
        canvas_h: u32,
        metrics: &GlyphMetrics,
    ) -> Result<StampLayout, LayoutError> {
        layout::compute(&self.sequence(), &self.params, canvas_w, canvas_h, metrics)
    }
}

/// Render one full frame: clear, photo, optional bounds, glyphs.
///
/// - `photo = None`: the canvas is cleared and `Ok(None)` returned.
/// - Otherwise the frame is drawn by [`draw_stamp`].
pub fn render_frame<C, A>(
    canvas: &mut C,
    photo: Option<&C::Image>,
    atlas: &A,
    stamp: &Stamp,
) -> Result<Option<StampLayout>, LayoutError>
where
    C: Canvas,
    A: GlyphAtlas<Image = C::Image>,
{
    match photo {
        Some(photo) => draw_stamp(canvas, photo, atlas, stamp).map(Some),
        None => {
            let full = full_canvas(canvas);
            canvas.clear_rect(full.x, full.y, full.width, full.height);
            Ok(None)
        }
    }
}

/// Draw `photo` across the whole canvas with the stamp on top.
///
/// On layout or glyph lookup failure the canvas is cleared and the error
/// returned. Nothing else is drawn: every glyph image is resolved before
/// the first draw call, so a frame is either complete or absent.
pub fn draw_stamp<C, A>(
    canvas: &mut C,
    photo: &C::Image,
    atlas: &A,
    stamp: &Stamp,
) -> Result<StampLayout, LayoutError>
where
    C: Canvas,
    A: GlyphAtlas<Image = C::Image>,
{
    let full = full_canvas(canvas);
    let (cw, ch) = canvas.size();

    let resolved = stamp
        .layout(cw, ch, &atlas.metrics())
        .and_then(|l| resolve_glyphs(atlas, &l).map(|images| (l, images)));
    let (layout, images) = match resolved {
        Ok(v) => v,
        Err(e) => {
            log::debug!("stamp not rendered: {e}");
            canvas.clear_rect(full.x, full.y, full.width, full.height);
            return Err(e);
        }
    };

    canvas.clear_rect(full.x, full.y, full.width, full.height);
    canvas.draw_image(photo, full.x, full.y, full.width, full.height);

    if stamp.params.show_bounds {
        let b = layout.bounds;
        canvas.stroke_rect(b.x, b.y, b.width, b.height);
    }

    for (cmd, image) in layout.commands().iter().zip(images.into_iter().flatten()) {
        canvas.draw_image(image, cmd.x, cmd.y, cmd.width, cmd.height);
    }

    Ok(layout)
}

fn full_canvas<C: Canvas + ?Sized>(canvas: &C) -> BoundingBox {
    let (cw, ch) = canvas.size();
    BoundingBox {
        x: 0.0,
        y: 0.0,
        width: cw as f64,
        height: ch as f64,
    }
}

/// Look up the image for every draw command, failing on the first gap.
fn resolve_glyphs<'a, A>(
    atlas: &'a A,
    layout: &StampLayout,
) -> Result<[Option<&'a A::Image>; MAX_GLYPHS], LayoutError>
where
    A: GlyphAtlas + ?Sized,
{
    let mut images = [None; MAX_GLYPHS];
    for (slot, cmd) in images.iter_mut().zip(layout.commands()) {
        *slot = Some(atlas.glyph(cmd.key).ok_or(LayoutError::AssetMissing(cmd.key))?);
    }
    Ok(images)
}
