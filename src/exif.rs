//! JPEG marker scan for the EXIF orientation tag (`0x0112`).
//!
//! Reads exactly one tag from IFD0 of the first `Exif` APP1 segment.
//! Everything else in the file is skipped by segment length.
//!
//! ```text
//!     FF D8                      SOI
//!     FF E0 len  JFIF...         APP0   (skipped)
//!     FF E1 len  "http://ns..."  APP1   (not Exif → skipped)
//!     FF E1 len  "Exif\0\0"      APP1   ← TIFF header starts here
//!                II|MM 002A off  byte order, magic, IFD0 offset
//!                count, 12-byte entries { tag, type, count, value }
//!     FF DA                      SOS    (stop)
//! ```
//!
//! [`scan`] reports why a stream could not be read; [`read_orientation_hint`]
//! folds every failure into `None`.

use core::fmt;

/// Orientation tag id in IFD0.
pub const TAG_ORIENTATION: u16 = 0x0112;

const SOI: u16 = 0xFFD8;
const EOI: u16 = 0xFFD9;
const SOS: u16 = 0xFFDA;
const APP1: u16 = 0xFFE1;
const TEM: u16 = 0xFF01;
const EXIF_ID: &[u8; 6] = b"Exif\0\0";
const TIFF_MAGIC: u16 = 0x002A;
const LITTLE_ENDIAN_MARK: u16 = 0x4949;
const IFD_ENTRY_LEN: usize = 12;

/// Why a byte stream yielded no orientation hint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParseError {
    /// Stream does not start with the SOI marker.
    NotJpeg,
    /// A read ran past the end of the stream or segment.
    Truncated,
    /// Expected a marker (`0xFF..`) at this offset.
    BadMarker { offset: usize },
    /// Segment length field below the 2-byte minimum.
    BadSegmentLength { offset: usize },
    /// TIFF header magic was not `0x002A`.
    BadTiffMagic,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotJpeg => f.write_str("missing JPEG start-of-image marker"),
            Self::Truncated => f.write_str("truncated JPEG or EXIF data"),
            Self::BadMarker { offset } => write!(f, "expected marker at byte {offset}"),
            Self::BadSegmentLength { offset } => {
                write!(f, "invalid segment length at byte {offset}")
            }
            Self::BadTiffMagic => f.write_str("invalid TIFF header magic"),
        }
    }
}

impl core::error::Error for ParseError {}

/// Bounds-checked reads over a byte slice.
#[derive(Copy, Clone)]
struct Reader<'a> {
    bytes: &'a [u8],
    little: bool,
}

impl<'a> Reader<'a> {
    fn big_endian(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            little: false,
        }
    }

    fn array<const N: usize>(&self, offset: usize) -> Result<[u8; N], ParseError> {
        let end = offset.checked_add(N).ok_or(ParseError::Truncated)?;
        self.bytes
            .get(offset..end)
            .and_then(|s| s.try_into().ok())
            .ok_or(ParseError::Truncated)
    }

    fn u16(&self, offset: usize) -> Result<u16, ParseError> {
        let b = self.array::<2>(offset)?;
        Ok(if self.little {
            u16::from_le_bytes(b)
        } else {
            u16::from_be_bytes(b)
        })
    }

    fn u32(&self, offset: usize) -> Result<u32, ParseError> {
        let b = self.array::<4>(offset)?;
        Ok(if self.little {
            u32::from_le_bytes(b)
        } else {
            u32::from_be_bytes(b)
        })
    }
}

/// Scan a JPEG stream for the IFD0 orientation value.
///
/// `Ok(None)` means the stream was readable but carried no orientation
/// (no Exif segment before SOS, or no `0x0112` entry). Only the first
/// `Exif` APP1 segment is consulted.
pub fn scan(bytes: &[u8]) -> Result<Option<u16>, ParseError> {
    let r = Reader::big_endian(bytes);
    if r.u16(0).map_err(|_| ParseError::NotJpeg)? != SOI {
        return Err(ParseError::NotJpeg);
    }

    let mut offset = 2;
    while offset < bytes.len() {
        let marker = r.u16(offset)?;
        if marker & 0xFF00 != 0xFF00 {
            return Err(ParseError::BadMarker { offset });
        }
        // Fill byte before the real marker.
        if marker == 0xFFFF {
            offset += 1;
            continue;
        }
        offset += 2;

        match marker {
            SOS | EOI => return Ok(None),
            TEM | 0xFFD0..=0xFFD7 => continue,
            _ => {}
        }

        let len = r.u16(offset)? as usize;
        if len < 2 {
            return Err(ParseError::BadSegmentLength { offset });
        }
        let segment_end = offset + len;

        if marker == APP1 {
            // A declared length past the end of a cut-off file still leaves
            // whatever IFD0 bytes made it; reads past them fail as Truncated.
            let payload = bytes
                .get(offset + 2..segment_end.min(bytes.len()))
                .ok_or(ParseError::Truncated)?;
            if let Some(tiff) = payload.strip_prefix(EXIF_ID.as_slice()) {
                return read_ifd0_orientation(tiff);
            }
        }

        offset = segment_end;
    }

    Ok(None)
}

/// Read tag `0x0112` from IFD0. Offsets are relative to the TIFF header.
fn read_ifd0_orientation(tiff: &[u8]) -> Result<Option<u16>, ParseError> {
    let little = Reader::big_endian(tiff).u16(0)? == LITTLE_ENDIAN_MARK;
    let r = Reader { bytes: tiff, little };

    if r.u16(2)? != TIFF_MAGIC {
        return Err(ParseError::BadTiffMagic);
    }

    let ifd0 = usize::try_from(r.u32(4)?).map_err(|_| ParseError::Truncated)?;
    let count = r.u16(ifd0)? as usize;
    let entries = ifd0.checked_add(2).ok_or(ParseError::Truncated)?;

    for i in 0..count {
        let entry = i
            .checked_mul(IFD_ENTRY_LEN)
            .and_then(|o| o.checked_add(entries))
            .ok_or(ParseError::Truncated)?;
        if r.u16(entry)? == TAG_ORIENTATION {
            // SHORT values are left-justified in the 4-byte value field.
            let value = entry.checked_add(8).ok_or(ParseError::Truncated)?;
            return r.u16(value).map(Some);
        }
    }

    Ok(None)
}

/// Orientation hint (normally 1–8) from a JPEG stream, or `None`.
///
/// Never fails: malformed, truncated, and non-JPEG input all give `None`.
pub fn read_orientation_hint(bytes: &[u8]) -> Option<u16> {
    match scan(bytes) {
        Ok(hint) => hint,
        Err(e) => {
            log::debug!("no EXIF orientation hint: {e}");
            None
        }
    }
}
