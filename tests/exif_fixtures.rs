//! EXIF orientation scan against hand-built JPEG streams.
//!
//! Each fixture is assembled segment by segment so the marker walk sees
//! realistic layouts: JFIF APP0 first, XMP APP1 ahead of the Exif APP1,
//! fill bytes, both TIFF byte orders, and truncations at every length.

use zenstamp::exif::{self, ParseError};
use zenstamp::{Orientation, detect_orientation};

// ---- Fixture builders ----

fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
    let len = (payload.len() + 2) as u16;
    let mut out = vec![0xFF, marker];
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(payload);
    out
}

fn jfif_app0() -> Vec<u8> {
    segment(0xE0, b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0")
}

fn xmp_app1() -> Vec<u8> {
    segment(
        0xE1,
        b"http://ns.adobe.com/xap/1.0/\0<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"/>",
    )
}

/// TIFF block with IFD0 holding `entries` (tag, SHORT value).
fn tiff(little: bool, entries: &[(u16, u16)]) -> Vec<u8> {
    let u16b = |v: u16| if little { v.to_le_bytes() } else { v.to_be_bytes() };
    let u32b = |v: u32| if little { v.to_le_bytes() } else { v.to_be_bytes() };

    let mut t = Vec::new();
    t.extend_from_slice(if little { b"II" } else { b"MM" });
    t.extend_from_slice(&u16b(0x002A));
    t.extend_from_slice(&u32b(8));
    t.extend_from_slice(&u16b(entries.len() as u16));
    for &(tag, value) in entries {
        t.extend_from_slice(&u16b(tag));
        t.extend_from_slice(&u16b(3)); // SHORT
        t.extend_from_slice(&u32b(1));
        t.extend_from_slice(&u16b(value));
        t.extend_from_slice(&[0, 0]);
    }
    t.extend_from_slice(&u32b(0)); // no IFD1
    t
}

fn exif_app1(little: bool, entries: &[(u16, u16)]) -> Vec<u8> {
    let mut payload = b"Exif\0\0".to_vec();
    payload.extend(tiff(little, entries));
    segment(0xE1, &payload)
}

fn jpeg(segments: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8];
    for s in segments {
        out.extend_from_slice(s);
    }
    // SOS with a stub header, then scan data and EOI.
    out.extend(segment(0xDA, &[1, 1, 0, 0, 0x3F, 0]));
    out.extend_from_slice(&[0x12, 0x34, 0xFF, 0x00, 0x56, 0xFF, 0xD9]);
    out
}

// ---- Hints ----

#[test]
fn camera_layout_both_byte_orders() {
    for little in [true, false] {
        let bytes = jpeg(&[
            jfif_app0(),
            exif_app1(little, &[(0x010F, 7), (0x0112, 6), (0x0132, 9)]),
        ]);
        assert_eq!(exif::scan(&bytes), Ok(Some(6)), "little={little}");
    }
}

#[test]
fn xmp_before_exif_is_skipped() {
    let bytes = jpeg(&[jfif_app0(), xmp_app1(), exif_app1(false, &[(0x0112, 8)])]);
    assert_eq!(exif::read_orientation_hint(&bytes), Some(8));
}

#[test]
fn only_first_exif_segment_counts() {
    let bytes = jpeg(&[exif_app1(true, &[(0x0100, 1)]), exif_app1(true, &[(0x0112, 6)])]);
    assert_eq!(exif::scan(&bytes), Ok(None));
}

#[test]
fn fill_bytes_between_segments() {
    // Two fill bytes ahead of the APP1 marker.
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xFF];
    bytes.extend(exif_app1(true, &[(0x0112, 3)]));
    assert_eq!(exif::scan(&bytes), Ok(Some(3)));
}

#[test]
fn no_exif_before_sos() {
    let mut bytes = jpeg(&[jfif_app0()]);
    // Exif after the scan must not be found.
    bytes.extend(exif_app1(true, &[(0x0112, 6)]));
    assert_eq!(exif::scan(&bytes), Ok(None));
}

#[test]
fn unusual_hint_values_are_reported() {
    let bytes = jpeg(&[exif_app1(false, &[(0x0112, 0x1234)])]);
    assert_eq!(exif::read_orientation_hint(&bytes), Some(0x1234));
}

#[test]
fn oversized_app1_in_cut_off_file() {
    // Declared length 0x4000, but the stream ends right after IFD0.
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x40, 0x00];
    bytes.extend_from_slice(b"Exif\0\0");
    bytes.extend(tiff(false, &[(0x0112, 6)]));
    assert_eq!(exif::scan(&bytes), Ok(Some(6)));
    assert_eq!(detect_orientation(1000, 990, &bytes), Orientation::Portrait);
}

// ---- Failures ----

#[test]
fn wrong_soi() {
    let mut bytes = jpeg(&[exif_app1(true, &[(0x0112, 6)])]);
    bytes[1] = 0xD9;
    assert_eq!(exif::scan(&bytes), Err(ParseError::NotJpeg));
    assert_eq!(exif::read_orientation_hint(&bytes), None);
    assert_eq!(exif::read_orientation_hint(&[]), None);
    assert_eq!(exif::read_orientation_hint(b"\x89PNG\r\n\x1a\n"), None);
}

#[test]
fn bad_tiff_magic() {
    let mut app1 = exif_app1(true, &[(0x0112, 6)]);
    // "Exif\0\0" + "II" then the magic.
    app1[4 + 6 + 2] = 0x2B;
    assert_eq!(exif::scan(&jpeg(&[app1])), Err(ParseError::BadTiffMagic));
}

#[test]
fn short_segment_length() {
    let bytes = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x01, 0xFF, 0xD9];
    assert!(matches!(
        exif::scan(&bytes),
        Err(ParseError::BadSegmentLength { .. })
    ));
}

#[test]
fn every_truncation_is_handled() {
    let full = jpeg(&[jfif_app0(), xmp_app1(), exif_app1(true, &[(0x0112, 6)])]);
    for n in 0..full.len() {
        // Must not panic; a cut stream never reports a wrong value.
        let hint = exif::read_orientation_hint(&full[..n]);
        assert!(matches!(hint, None | Some(6)), "n={n}: {hint:?}");
    }
}

// ---- Orientation ----

#[test]
fn near_square_uses_hint() {
    let rotated = jpeg(&[exif_app1(true, &[(0x0112, 6)])]);
    assert_eq!(detect_orientation(1000, 990, &rotated), Orientation::Portrait);

    let upright = jpeg(&[exif_app1(false, &[(0x0112, 1)])]);
    assert_eq!(detect_orientation(1000, 990, &upright), Orientation::Landscape);

    let transposed = jpeg(&[exif_app1(false, &[(0x0112, 5)])]);
    assert_eq!(detect_orientation(1000, 990, &transposed), Orientation::Unknown);

    assert_eq!(detect_orientation(1000, 990, &[]), Orientation::Unknown);
}

#[test]
fn clear_ratio_ignores_hint() {
    let rotated = jpeg(&[exif_app1(true, &[(0x0112, 6)])]);
    assert_eq!(detect_orientation(1000, 500, &rotated), Orientation::Landscape);
    assert_eq!(detect_orientation(500, 1000, &[]), Orientation::Portrait);
}
