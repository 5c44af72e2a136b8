//! Raster backend: composite onto an [`RgbaImage`] and export PNG / JPEG.
//!
//! # Example
//!
//! ```no_run
//! use zenstamp::raster::{GlyphImages, stamp_photo};
//! use zenstamp::{DateValue, ExportFormat};
//!
//! let glyphs = GlyphImages::load_dir("assets").unwrap();
//! let photo = std::fs::read("photo.jpg").unwrap();
//! let date = DateValue::new(24, 5, 17);
//! let out = stamp_photo(&photo, &glyphs, date, None, ExportFormat::Jpeg).unwrap();
//! std::fs::write(ExportFormat::Jpeg.file_name(), out.bytes).unwrap();
//! ```

use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageError, ImageFormat, Pixel, Rgba, RgbaImage};

use crate::glyph::{DateValue, GlyphKey};
use crate::layout::{BoundingBox, LayoutError, LayoutParams, StampLayout};
use crate::orientation::Orientation;
use crate::plan::{Canvas, ExportFormat, GlyphAtlas, JPEG_QUALITY, Stamp, draw_stamp};

/// Bounding-box stroke color: white at 40% alpha.
pub const BOUNDS_COLOR: Rgba<u8> = Rgba([255, 255, 255, 102]);

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Errors from the host-side pipeline.
#[derive(Debug, thiserror::Error)]
pub enum StampError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode photo: {0}")]
    DecodePhoto(#[source] ImageError),
    #[error("failed to encode output: {0}")]
    Encode(#[source] ImageError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Canvas backed by an RGBA buffer.
///
/// Fractional coordinates are snapped to whole pixels; images are resized
/// with a triangle filter and alpha-composited.
#[derive(Clone, Debug)]
pub struct RasterCanvas {
    image: RgbaImage,
}

impl RasterCanvas {
    /// Transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Apply `f` to every pixel inside the snapped rect, clipped to the canvas.
    fn for_each_in(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        mut f: impl FnMut(&mut Rgba<u8>),
    ) {
        let r = BoundingBox { x, y, width, height }.snapped();
        let (cw, ch) = self.image.dimensions();
        let x0 = r.x.clamp(0, cw as i64) as u32;
        let y0 = r.y.clamp(0, ch as i64) as u32;
        let x1 = (r.x + r.width as i64).clamp(0, cw as i64) as u32;
        let y1 = (r.y + r.height as i64).clamp(0, ch as i64) as u32;
        for py in y0..y1 {
            for px in x0..x1 {
                f(self.image.get_pixel_mut(px, py));
            }
        }
    }

    fn blend_at(&mut self, x: i64, y: i64, color: Rgba<u8>) {
        let (cw, ch) = self.image.dimensions();
        if x >= 0 && y >= 0 && x < cw as i64 && y < ch as i64 {
            self.image.get_pixel_mut(x as u32, y as u32).blend(&color);
        }
    }
}

impl Canvas for RasterCanvas {
    type Image = RgbaImage;

    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.for_each_in(x, y, width, height, |p| *p = TRANSPARENT);
    }

    fn draw_image(&mut self, image: &RgbaImage, x: f64, y: f64, width: f64, height: f64) {
        let r = BoundingBox { x, y, width, height }.snapped();
        if r.width == 0 || r.height == 0 {
            return;
        }
        if image.dimensions() == (r.width, r.height) {
            imageops::overlay(&mut self.image, image, r.x, r.y);
        } else {
            let scaled = imageops::resize(image, r.width, r.height, FilterType::Triangle);
            imageops::overlay(&mut self.image, &scaled, r.x, r.y);
        }
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let r = BoundingBox { x, y, width, height }.snapped();
        if r.width == 0 || r.height == 0 {
            return;
        }
        let right = r.x + r.width as i64 - 1;
        let bottom = r.y + r.height as i64 - 1;
        for px in r.x..=right {
            self.blend_at(px, r.y, BOUNDS_COLOR);
            if bottom != r.y {
                self.blend_at(px, bottom, BOUNDS_COLOR);
            }
        }
        // Corners already covered by the horizontal edges.
        for py in (r.y + 1)..bottom {
            self.blend_at(r.x, py, BOUNDS_COLOR);
            if right != r.x {
                self.blend_at(right, py, BOUNDS_COLOR);
            }
        }
    }
}

/// The 11 glyph images, decoded to RGBA.
#[derive(Clone, Debug, Default)]
pub struct GlyphImages {
    images: [Option<RgbaImage>; 11],
}

impl GlyphImages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `<dir>/<name>.png` for every asset key.
    ///
    /// Missing files are logged and left absent; layout then reports
    /// [`LayoutError::AssetMissing`]. Unreadable or undecodable files are
    /// errors.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, StampError> {
        let dir = dir.as_ref();
        let mut glyphs = Self::new();
        for key in GlyphKey::ASSETS {
            let Some(name) = key.asset_name() else {
                continue;
            };
            let path = dir.join(format!("{name}.png"));
            let bytes = match std::fs::read(&path) {
                Ok(b) => b,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::warn!("glyph asset {} not found", path.display());
                    continue;
                }
                Err(source) => return Err(StampError::Io { path, source }),
            };
            let image = image::load_from_memory(&bytes)
                .map_err(|source| StampError::Decode {
                    path: path.clone(),
                    source,
                })?
                .to_rgba8();
            log::debug!("loaded glyph {key} ({}x{})", image.width(), image.height());
            glyphs.insert(key, image);
        }
        Ok(glyphs)
    }

    /// Set the image for an asset key. Ignored for space keys.
    pub fn insert(&mut self, key: GlyphKey, image: RgbaImage) {
        if let Some(i) = key.asset_index() {
            self.images[i] = Some(image);
        }
    }
}

impl GlyphAtlas for GlyphImages {
    type Image = RgbaImage;

    fn glyph(&self, key: GlyphKey) -> Option<&RgbaImage> {
        self.images[key.asset_index()?].as_ref()
    }

    fn glyph_size(&self, key: GlyphKey) -> Option<(u32, u32)> {
        self.glyph(key).map(RgbaImage::dimensions)
    }
}

/// Encode a composite. JPEG drops alpha and uses [`JPEG_QUALITY`].
pub fn encode(image: &RgbaImage, format: ExportFormat) -> Result<Vec<u8>, StampError> {
    let mut out = Vec::new();
    match format {
        ExportFormat::Png => image
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .map_err(StampError::Encode)?,
        ExportFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
                .encode_image(&rgb)
                .map_err(StampError::Encode)?;
        }
    }
    Ok(out)
}

/// Output of [`stamp_photo`].
#[derive(Clone, Debug)]
pub struct StampedPhoto {
    pub bytes: Vec<u8>,
    pub orientation: Orientation,
    pub layout: StampLayout,
}

/// Decode a photo, stamp it, and encode the result.
///
/// `params = None` uses the preset for the detected orientation (landscape
/// when unknown). Pass `Some` to override.
pub fn stamp_photo(
    photo: &[u8],
    glyphs: &GlyphImages,
    date: DateValue,
    params: Option<LayoutParams>,
    format: ExportFormat,
) -> Result<StampedPhoto, StampError> {
    let decoded = decode_photo(photo)?;
    let (w, h) = decoded.dimensions();

    let (mut stamp, orientation) = Stamp::for_photo(w, h, photo, date);
    if let Some(p) = params {
        stamp.params = p;
    }

    let (image, layout) = composite(&decoded, glyphs, &stamp)?;
    let bytes = encode(&image, format)?;
    Ok(StampedPhoto {
        bytes,
        orientation,
        layout,
    })
}

/// Decode a photo in any enabled format to RGBA.
pub fn decode_photo(bytes: &[u8]) -> Result<RgbaImage, StampError> {
    Ok(image::load_from_memory(bytes)
        .map_err(StampError::DecodePhoto)?
        .to_rgba8())
}

/// Render `photo` with `stamp` into a new RGBA image of the same size.
pub fn composite(
    photo: &RgbaImage,
    glyphs: &GlyphImages,
    stamp: &Stamp,
) -> Result<(RgbaImage, StampLayout), StampError> {
    let mut canvas = RasterCanvas::new(photo.width(), photo.height());
    let layout = draw_stamp(&mut canvas, photo, glyphs, stamp)?;
    Ok((canvas.into_image(), layout))
}
