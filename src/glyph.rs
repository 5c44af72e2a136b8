//! Glyph keys, clamped date values, and the ordered glyph sequence.
//!
//! The stamp reads `'YY M DD` left to right. Year digits are always two
//! glyphs, month is one or two glyphs without padding, day is always two
//! glyphs with zero padding.
//!
//! ```
//! use zenstamp::{DateValue, GapModel, GlyphKey, GlyphSequence};
//!
//! let seq = GlyphSequence::build(DateValue::new(24, 5, 7), GapModel::Widened);
//! assert_eq!(
//!     seq.as_slice(),
//!     &[
//!         GlyphKey::Apostrophe,
//!         GlyphKey::Digit(2),
//!         GlyphKey::Digit(4),
//!         GlyphKey::WideSpace,
//!         GlyphKey::Digit(5),
//!         GlyphKey::Space,
//!         GlyphKey::Digit(0),
//!         GlyphKey::Digit(7),
//!     ]
//! );
//! ```

use core::fmt;

/// Identifies one element of a stamp: an asset-backed glyph or a gap.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GlyphKey {
    /// Digit glyph `0`–`9`. Values above 9 never come out of [`GlyphSequence`].
    Digit(u8),
    /// The leading `'` before the year.
    Apostrophe,
    /// Normal inter-group gap. Not asset-backed.
    Space,
    /// Widened year→month gap. Not asset-backed.
    WideSpace,
}

impl GlyphKey {
    /// The 11 asset-backed keys, in asset index order.
    pub const ASSETS: [GlyphKey; 11] = [
        GlyphKey::Digit(0),
        GlyphKey::Digit(1),
        GlyphKey::Digit(2),
        GlyphKey::Digit(3),
        GlyphKey::Digit(4),
        GlyphKey::Digit(5),
        GlyphKey::Digit(6),
        GlyphKey::Digit(7),
        GlyphKey::Digit(8),
        GlyphKey::Digit(9),
        GlyphKey::Apostrophe,
    ];

    /// Whether this key is a gap (advances the cursor, draws nothing).
    pub fn is_space(self) -> bool {
        matches!(self, Self::Space | Self::WideSpace)
    }

    /// Asset name without extension (`"0"`..`"9"`, `"apostrophe"`).
    /// `None` for spaces and out-of-range digits.
    pub fn asset_name(self) -> Option<&'static str> {
        const DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];
        match self {
            Self::Digit(d) => DIGITS.get(d as usize).copied(),
            Self::Apostrophe => Some("apostrophe"),
            Self::Space | Self::WideSpace => None,
        }
    }

    /// Inverse of [`asset_name`](Self::asset_name).
    pub fn from_asset_name(name: &str) -> Option<Self> {
        Self::ASSETS
            .iter()
            .copied()
            .find(|k| k.asset_name() == Some(name))
    }

    /// Position in [`ASSETS`](Self::ASSETS), if asset-backed.
    pub(crate) fn asset_index(self) -> Option<usize> {
        match self {
            Self::Digit(d) if d <= 9 => Some(d as usize),
            Self::Apostrophe => Some(10),
            _ => None,
        }
    }
}

impl fmt::Display for GlyphKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digit(d) if *d <= 9 => write!(f, "{d}"),
            Self::Digit(d) => write!(f, "digit({d})"),
            Self::Apostrophe => f.write_str("apostrophe"),
            Self::Space => f.write_str("space"),
            Self::WideSpace => f.write_str("space-wide"),
        }
    }
}

/// A stamp date. Constructed values are always in range.
///
/// Out-of-range inputs are clamped, never rejected: year-in-century to
/// `0..=99`, month to `1..=12`, day to `1..=31`. No calendar validation
/// (February 31 is accepted).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DateValue {
    year: u8,
    month: u8,
    day: u8,
}

impl DateValue {
    /// Create a date, clamping each field into range.
    pub fn new(year: i32, month: i32, day: i32) -> Self {
        Self {
            year: year.clamp(0, 99) as u8,
            month: month.clamp(1, 12) as u8,
            day: day.clamp(1, 31) as u8,
        }
    }

    /// Year within the century, `0..=99`.
    pub fn year(self) -> u8 {
        self.year
    }

    /// Month, `1..=12`.
    pub fn month(self) -> u8 {
        self.month
    }

    /// Day, `1..=31`.
    pub fn day(self) -> u8 {
        self.day
    }
}

impl Default for DateValue {
    /// `'00 1 01`, the value an empty form produces.
    fn default() -> Self {
        Self::new(0, 1, 1)
    }
}

/// How the two inter-group gaps are represented.
///
/// The two models are not pixel-equivalent for the same space ratio.
/// `Paired` doubles both gaps; `Widened` scales only the first gap by
/// [`LayoutParams::first_space_multiplier`](crate::LayoutParams).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum GapModel {
    /// Two [`GlyphKey::Space`] in each gap.
    Paired,
    /// One [`GlyphKey::WideSpace`] between year and month, one
    /// [`GlyphKey::Space`] between month and day.
    #[default]
    Widened,
}

/// Upper bound on sequence length (`'` + 2 + 2 + 2 + 2 + 2 under `Paired`, plus slack).
pub const MAX_GLYPHS: usize = 12;

/// Ordered glyph keys, left to right. Fixed capacity, no allocation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GlyphSequence {
    keys: [GlyphKey; MAX_GLYPHS],
    len: u8,
}

impl GlyphSequence {
    /// Build the sequence for a date under the given gap model.
    pub fn build(date: DateValue, gap: GapModel) -> Self {
        let mut seq = Self {
            keys: [GlyphKey::Space; MAX_GLYPHS],
            len: 0,
        };

        seq.push(GlyphKey::Apostrophe);
        seq.push(GlyphKey::Digit(date.year / 10));
        seq.push(GlyphKey::Digit(date.year % 10));

        match gap {
            GapModel::Paired => {
                seq.push(GlyphKey::Space);
                seq.push(GlyphKey::Space);
            }
            GapModel::Widened => seq.push(GlyphKey::WideSpace),
        }

        if date.month >= 10 {
            seq.push(GlyphKey::Digit(date.month / 10));
        }
        seq.push(GlyphKey::Digit(date.month % 10));

        seq.push(GlyphKey::Space);
        if gap == GapModel::Paired {
            seq.push(GlyphKey::Space);
        }

        seq.push(GlyphKey::Digit(date.day / 10));
        seq.push(GlyphKey::Digit(date.day % 10));
        seq
    }

    fn push(&mut self, key: GlyphKey) {
        // Capacity covers the longest date under either model.
        debug_assert!((self.len as usize) < MAX_GLYPHS);
        if let Some(slot) = self.keys.get_mut(self.len as usize) {
            *slot = key;
            self.len += 1;
        }
    }

    /// The keys in rendering order.
    pub fn as_slice(&self) -> &[GlyphKey] {
        &self.keys[..self.len as usize]
    }

    /// Iterate keys in rendering order.
    pub fn iter(&self) -> impl Iterator<Item = GlyphKey> + '_ {
        self.as_slice().iter().copied()
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of keys that produce a draw command.
    pub fn drawn_count(&self) -> usize {
        self.iter().filter(|k| !k.is_space()).count()
    }
}

/// Build a sequence with the default gap model.
pub fn build_sequence(date: DateValue) -> GlyphSequence {
    GlyphSequence::build(date, GapModel::default())
}
