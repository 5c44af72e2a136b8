//! Landscape / portrait detection from aspect ratio, with the EXIF
//! orientation tag as a tie-breaker for near-square images.
//!
//! ```text
//!     ratio = w / h
//!
//!     0 ──── 1/1.03 ──── 1 ──── 1.03 ──── ∞
//!      portrait   │   unknown   │  landscape
//!                 └─── EXIF ────┘
//!                 6, 8     → portrait
//!                 1, 2, 3, 4 → landscape
//!                 else     → unknown
//! ```

use crate::exif;

/// Aspect ratio at or beyond which an image is classified without EXIF.
pub const ASPECT_TOLERANCE: f64 = 1.03;

/// Coarse photo orientation, used to pick default stamp parameters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    Landscape,
    Portrait,
    /// Near-square with no usable EXIF hint.
    #[default]
    Unknown,
}

impl Orientation {
    /// Classify by `width / height` alone.
    ///
    /// Zero height with nonzero width is landscape; `0×0` is unknown.
    pub fn from_ratio(width: u32, height: u32) -> Self {
        let ratio = width as f64 / height as f64;
        if ratio >= ASPECT_TOLERANCE {
            Self::Landscape
        } else if ratio <= 1.0 / ASPECT_TOLERANCE {
            Self::Portrait
        } else {
            Self::Unknown
        }
    }

    /// Map an EXIF orientation value to a classification.
    ///
    /// 6 and 8 (rotated a quarter turn) are portrait. 1–4 (no quarter turn)
    /// are landscape. 5, 7, out-of-range values, and no hint stay unknown.
    pub fn from_exif_hint(hint: Option<u16>) -> Self {
        match hint {
            Some(6 | 8) => Self::Portrait,
            Some(1..=4) => Self::Landscape,
            _ => Self::Unknown,
        }
    }

    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

/// Classify a photo from its decoded dimensions and raw encoded bytes.
///
/// The byte stream is only inspected when the aspect ratio falls inside
/// the tolerance band. Pure; never fails.
pub fn detect_orientation(width: u32, height: u32, bytes: &[u8]) -> Orientation {
    let by_ratio = Orientation::from_ratio(width, height);
    if by_ratio.is_known() {
        log::debug!("orientation {by_ratio:?} from {width}x{height}");
        return by_ratio;
    }

    let hint = exif::read_orientation_hint(bytes);
    let resolved = Orientation::from_exif_hint(hint);
    log::debug!("near-square {width}x{height}, EXIF hint {hint:?} → {resolved:?}");
    resolved
}
