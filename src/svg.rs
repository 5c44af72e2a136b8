//! SVG backend: records canvas calls as an SVG document.
//!
//! Glyphs and the photo are referenced by URL rather than embedded, so the
//! output previews a stamp against the same asset directory the raster
//! backend reads (`assets/0.png` … `assets/apostrophe.png`).
//!
//! # Example
//!
//! ```
//! use zenstamp::svg::{SvgAssets, render_stamp_svg};
//! use zenstamp::{DateValue, GlyphKey, Stamp};
//!
//! let mut assets = SvgAssets::new("assets");
//! for key in GlyphKey::ASSETS {
//!     assets.set_size(key, 60, 100);
//! }
//!
//! let stamp = Stamp::new(DateValue::new(24, 5, 17));
//! let svg = render_stamp_svg(1600, 1200, "photo.jpg", &assets, &stamp).unwrap();
//! assert!(svg.starts_with("<svg"));
//! assert!(svg.contains("assets/apostrophe.png"));
//! ```

use crate::glyph::GlyphKey;
use crate::layout::LayoutError;
use crate::plan::{Canvas, GlyphAtlas, Stamp, render_frame};

/// Bounding-box stroke, matching the raster backend (white, 40% alpha, 1px).
const BOUNDS_STYLE: &str =
    r#"fill="none" stroke="rgb(255,255,255)" stroke-opacity="0.4" stroke-width="1""#;

/// Glyph references for the SVG backend: one URL and pixel size per asset.
#[derive(Clone, Debug)]
pub struct SvgAssets {
    hrefs: Vec<String>,
    sizes: [Option<(u32, u32)>; 11],
}

impl SvgAssets {
    /// Assets named `<dir>/<name>.png`. Sizes must be supplied separately.
    pub fn new(dir: &str) -> Self {
        let dir = dir.trim_end_matches('/');
        let hrefs = GlyphKey::ASSETS
            .iter()
            .map(|k| match k.asset_name() {
                Some(name) if dir.is_empty() => format!("{name}.png"),
                Some(name) => format!("{dir}/{name}.png"),
                None => String::new(),
            })
            .collect();
        Self {
            hrefs,
            sizes: [None; 11],
        }
    }

    /// Record a glyph's pixel size (from the host's image loader).
    pub fn set_size(&mut self, key: GlyphKey, width: u32, height: u32) {
        if let Some(i) = key.asset_index() {
            self.sizes[i] = Some((width, height));
        }
    }
}

impl GlyphAtlas for SvgAssets {
    type Image = str;

    fn glyph(&self, key: GlyphKey) -> Option<&str> {
        let i = key.asset_index()?;
        self.sizes[i]?;
        self.hrefs.get(i).map(String::as_str)
    }

    fn glyph_size(&self, key: GlyphKey) -> Option<(u32, u32)> {
        self.sizes[key.asset_index()?]
    }
}

/// Canvas that appends SVG elements. Images are drawn by URL.
#[derive(Clone, Debug)]
pub struct SvgCanvas {
    width: u32,
    height: u32,
    body: String,
}

impl SvgCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            body: String::with_capacity(1024),
        }
    }

    /// Complete SVG document for everything drawn since the last full clear.
    pub fn finish(&self) -> String {
        let mut svg = String::with_capacity(self.body.len() + 256);
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        ));
        svg.push('\n');
        svg.push_str(&self.body);
        svg.push_str("</svg>\n");
        svg
    }

    fn covers_canvas(&self, x: f64, y: f64, width: f64, height: f64) -> bool {
        x <= 0.0 && y <= 0.0 && x + width >= self.width as f64 && y + height >= self.height as f64
    }
}

impl Canvas for SvgCanvas {
    type Image = str;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        // Partial clears have no retained-mode equivalent.
        if self.covers_canvas(x, y, width, height) {
            self.body.clear();
        }
    }

    fn draw_image(&mut self, href: &str, x: f64, y: f64, width: f64, height: f64) {
        self.body.push_str(&format!(
            r#"<image href="{}" x="{x:.2}" y="{y:.2}" width="{width:.2}" height="{height:.2}" preserveAspectRatio="none"/>"#,
            escape_xml(href)
        ));
        self.body.push('\n');
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.body.push_str(&format!(
            r#"<rect x="{x:.2}" y="{y:.2}" width="{width:.2}" height="{height:.2}" {BOUNDS_STYLE}/>"#
        ));
        self.body.push('\n');
    }
}

/// Render a stamped photo as an SVG document.
pub fn render_stamp_svg(
    width: u32,
    height: u32,
    photo_href: &str,
    assets: &SvgAssets,
    stamp: &Stamp,
) -> Result<String, LayoutError> {
    let mut canvas = SvgCanvas::new(width, height);
    render_frame(&mut canvas, Some(photo_href), assets, stamp)?;
    Ok(canvas.finish())
}

/// Escape special characters for XML attribute values.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
