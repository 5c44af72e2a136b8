//! Seven-segment date stamp layout with EXIF orientation detection.
//!
//! Pure geometry in the core: no pixel operations, no allocations, `no_std`
//! compatible. Pixels are the host's business, reached through the
//! [`Canvas`] and [`GlyphAtlas`] traits.
//!
//! # Modules
//!
//! - [`exif`]: JPEG marker scan for the EXIF orientation tag
//! - [`orientation`]: Landscape / portrait classification
//! - [`glyph`]: Glyph keys, clamped dates, glyph sequences
//! - [`layout`]: Proportional widths and right/bottom anchoring
//! - [`plan`]: Stamp builder, canvas traits, frame rendering
//! - `svg` (feature `svg`): SVG document backend
//! - `query` (feature `query`): Query-string settings
//! - `raster` (feature `raster`): `image` crate backend, PNG / JPEG export
//!
//! # Example
//!
//! ```
//! use zenstamp::{DateValue, GlyphKey, GlyphMetrics, Stamp};
//!
//! let metrics = GlyphKey::ASSETS
//!     .iter()
//!     .fold(GlyphMetrics::new(), |m, &k| m.with(k, 60, 100));
//!
//! // 3000×4000 portrait photo, no EXIF.
//! let (stamp, _) = Stamp::for_photo(3000, 4000, &[], DateValue::new(24, 5, 17));
//! let layout = stamp.layout(3000, 4000, &metrics).unwrap();
//!
//! assert_eq!(layout.glyph_height, 100.0);
//! assert_eq!(layout.bounds.right(), 2900.0);
//! assert_eq!(layout.commands().len(), 6);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod exif;
pub mod glyph;
pub mod layout;
pub mod orientation;
pub mod plan;

#[cfg(feature = "query")]
pub mod query;
#[cfg(feature = "raster")]
pub mod raster;
#[cfg(feature = "svg")]
pub mod svg;

pub use glyph::{DateValue, GapModel, GlyphKey, GlyphSequence, MAX_GLYPHS, build_sequence};
pub use layout::{
    BoundingBox, DrawCommand, GlyphMetrics, LayoutError, LayoutParams, Margins, PixelRect,
    REFERENCE_GLYPH, StampLayout,
};
pub use orientation::{Orientation, detect_orientation};
pub use plan::{
    Canvas, ExportFormat, GlyphAtlas, JPEG_QUALITY, Stamp, draw_stamp, render_frame,
};
