//! Query string tokenizer and value parsers.
//!
//! Minimal percent-decoding and key-value extraction without external dependencies.

use alloc::string::String;
use alloc::vec::Vec;

use super::ParseWarning;
use super::instructions::Instructions;
use crate::glyph::GapModel;
use crate::plan::ExportFormat;

/// Parse a settings query string into Instructions + warnings.
pub(crate) fn parse_query(query: &str) -> (Instructions, Vec<ParseWarning>) {
    let mut inst = Instructions::new();
    let mut warnings = Vec::new();

    for pair in split_query(query) {
        let (raw_key, raw_value) = split_pair(pair);
        let key = percent_decode(raw_key);
        let value = percent_decode(raw_value);
        let key_lower = key.to_ascii_lowercase();

        dispatch_key(&key_lower, &value, &mut inst, &mut warnings);
    }

    (inst, warnings)
}

fn dispatch_key(key: &str, value: &str, inst: &mut Instructions, warnings: &mut Vec<ParseWarning>) {
    match key {
        // Date
        "yy" | "year" => set_int(&mut inst.year, key, value, warnings),
        "mm" | "month" => set_int(&mut inst.month, key, value, warnings),
        "dd" | "day" => set_int(&mut inst.day, key, value, warnings),

        // Size
        "scale" => set_number(
            &mut inst.scale,
            parse_scale(value),
            key,
            value,
            warnings,
            "expected number in (0, 1]",
        ),

        // Margins
        "margin" => {
            if let Some(px) = parse_non_negative(value) {
                set_or_warn(&mut inst.margin_right, Some(px), key, value, warnings);
                inst.margin_bottom = Some(px);
            } else {
                invalid(key, value, "expected non-negative pixels", warnings);
            }
        }
        "margin.right" => set_number(
            &mut inst.margin_right,
            parse_non_negative(value),
            key,
            value,
            warnings,
            "expected non-negative pixels",
        ),
        "margin.bottom" => set_number(
            &mut inst.margin_bottom,
            parse_non_negative(value),
            key,
            value,
            warnings,
            "expected non-negative pixels",
        ),
        "marginx" => set_number(
            &mut inst.margin_x,
            parse_unit(value),
            key,
            value,
            warnings,
            "expected fraction 0-1",
        ),
        "marginy" => set_number(
            &mut inst.margin_y,
            parse_unit(value),
            key,
            value,
            warnings,
            "expected fraction 0-1",
        ),

        // Gaps
        "space" | "spaceratio" => set_number(
            &mut inst.space_ratio,
            parse_unit(value),
            key,
            value,
            warnings,
            "expected fraction 0-1",
        ),
        "firstspace" => set_number(
            &mut inst.first_space_multiplier,
            parse_f64(value).filter(|&v| v >= 1.0),
            key,
            value,
            warnings,
            "expected number >= 1",
        ),
        "gap" => {
            if let Some(g) = parse_gap(value) {
                set_or_warn(&mut inst.gap, Some(g), key, value, warnings);
            } else {
                invalid(key, value, "expected paired|widened", warnings);
            }
        }

        // Rendering
        "bounds" => {
            if let Some(b) = parse_bool(value) {
                set_or_warn(&mut inst.show_bounds, Some(b), key, value, warnings);
            } else {
                invalid(key, value, "expected true|false|1|0|yes|no|on|off", warnings);
            }
        }
        "format" => {
            if let Some(f) = ExportFormat::from_extension(value.trim()) {
                set_or_warn(&mut inst.format, Some(f), key, value, warnings);
            } else {
                invalid(key, value, "expected png|jpeg|jpg", warnings);
            }
        }

        _ => {
            inst.extras.insert(String::from(key), String::from(value));
            warnings.push(ParseWarning::KeyNotRecognized {
                key: String::from(key),
                value: String::from(value),
            });
        }
    }
}

/// Set a field, warning on duplicate.
fn set_or_warn<T>(
    field: &mut Option<T>,
    parsed: Option<T>,
    key: &str,
    value: &str,
    warnings: &mut Vec<ParseWarning>,
) {
    if let Some(v) = parsed {
        if field.is_some() {
            warnings.push(ParseWarning::DuplicateKey {
                key: String::from(key),
                value: String::from(value),
            });
        }
        *field = Some(v);
    }
}

fn set_int(field: &mut Option<i32>, key: &str, value: &str, warnings: &mut Vec<ParseWarning>) {
    match parse_i32(value) {
        Some(v) => set_or_warn(field, Some(v), key, value, warnings),
        None => invalid(key, value, "expected integer", warnings),
    }
}

fn set_number(
    field: &mut Option<f64>,
    parsed: Option<f64>,
    key: &str,
    value: &str,
    warnings: &mut Vec<ParseWarning>,
    reason: &'static str,
) {
    match parsed {
        Some(v) => set_or_warn(field, Some(v), key, value, warnings),
        None => invalid(key, value, reason, warnings),
    }
}

fn invalid(key: &str, value: &str, reason: &'static str, warnings: &mut Vec<ParseWarning>) {
    warnings.push(ParseWarning::ValueInvalid {
        key: static_key(key),
        value: String::from(value),
        reason,
    });
}

// ---- Value parsers ----

/// Integer, tolerating a fractional part (`"5.0"` → 5) the way a slider
/// value round-trips through a form.
fn parse_i32(s: &str) -> Option<i32> {
    let s = s.trim();
    s.parse::<i32>().ok().or_else(|| {
        // `as` truncates toward zero and saturates.
        let v = s.parse::<f64>().ok().filter(|v| v.is_finite())?;
        Some(v as i32)
    })
}

fn parse_f64(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_scale(s: &str) -> Option<f64> {
    parse_f64(s).filter(|&v| v > 0.0 && v <= 1.0)
}

fn parse_unit(s: &str) -> Option<f64> {
    parse_f64(s).filter(|&v| (0.0..=1.0).contains(&v))
}

fn parse_non_negative(s: &str) -> Option<f64> {
    parse_f64(s).filter(|&v| v >= 0.0)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_gap(s: &str) -> Option<GapModel> {
    match s.trim().to_ascii_lowercase().as_str() {
        "paired" | "double" => Some(GapModel::Paired),
        "widened" | "wide" => Some(GapModel::Widened),
        _ => None,
    }
}

// ---- Query string tokenizer ----

/// Split query string on '&'.
fn split_query(query: &str) -> impl Iterator<Item = &str> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query.split('&').filter(|s| !s.is_empty())
}

/// Split a single "key=value" pair on the first '='.
fn split_pair(pair: &str) -> (&str, &str) {
    pair.split_once('=').unwrap_or((pair, ""))
}

/// Percent-decode a URL component. Also handles '+' as space.
fn percent_decode(s: &str) -> String {
    let mut bytes = Vec::with_capacity(s.len());
    let raw = s.as_bytes();
    let mut i = 0;
    while i < raw.len() {
        match raw[i] {
            b'+' => {
                bytes.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < raw.len() => {
                if let (Some(hi), Some(lo)) = (hex_digit(raw[i + 1]), hex_digit(raw[i + 2])) {
                    bytes.push(hi << 4 | lo);
                    i += 3;
                } else {
                    bytes.push(b'%');
                    i += 1;
                }
            }
            b => {
                bytes.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Canonical `&'static str` for known key names used in warnings.
fn static_key(key: &str) -> &'static str {
    match key {
        "yy" | "year" => "yy",
        "mm" | "month" => "mm",
        "dd" | "day" => "dd",
        "scale" => "scale",
        "margin" => "margin",
        "margin.right" => "margin.right",
        "margin.bottom" => "margin.bottom",
        "marginx" => "marginx",
        "marginy" => "marginy",
        "space" | "spaceratio" => "space",
        "firstspace" => "firstspace",
        "gap" => "gap",
        "bounds" => "bounds",
        "format" => "format",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_fields() {
        let (inst, warnings) = parse_query("yy=24&mm=5&dd=17");
        assert_eq!((inst.year, inst.month, inst.day), (Some(24), Some(5), Some(17)));
        assert!(warnings.is_empty());
    }

    #[test]
    fn parse_date_aliases_and_case() {
        let (inst, _) = parse_query("YEAR=9&Month=12&day=1");
        assert_eq!((inst.year, inst.month, inst.day), (Some(9), Some(12), Some(1)));
    }

    #[test]
    fn out_of_range_date_is_kept_for_clamping() {
        let (inst, warnings) = parse_query("yy=150&mm=0&dd=32");
        assert_eq!((inst.year, inst.month, inst.day), (Some(150), Some(0), Some(32)));
        assert!(warnings.is_empty());
    }

    #[test]
    fn fractional_integer_truncates() {
        let (inst, _) = parse_query("mm=5.0&dd=7.9");
        assert_eq!((inst.month, inst.day), (Some(5), Some(7)));
    }

    #[test]
    fn margin_sets_both_edges() {
        let (inst, _) = parse_query("margin=120");
        assert_eq!(inst.margin_right, Some(120.0));
        assert_eq!(inst.margin_bottom, Some(120.0));
    }

    #[test]
    fn scale_out_of_range_warns() {
        let (inst, warnings) = parse_query("scale=0&space=1.5");
        assert_eq!(inst.scale, None);
        assert_eq!(inst.space_ratio, None);
        assert!(warnings.iter().any(|w| matches!(
            w,
            ParseWarning::ValueInvalid { key: "scale", .. }
        )));
        assert!(warnings.iter().any(|w| matches!(
            w,
            ParseWarning::ValueInvalid { key: "space", .. }
        )));
    }

    #[test]
    fn non_finite_numbers_rejected() {
        let (inst, warnings) = parse_query("margin=NaN&marginx=inf");
        assert_eq!(inst.margin_right, None);
        assert_eq!(inst.margin_x, None);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn parse_gap_and_bounds() {
        let (inst, _) = parse_query("gap=Paired&bounds=on&firstspace=1.5");
        assert_eq!(inst.gap, Some(GapModel::Paired));
        assert_eq!(inst.show_bounds, Some(true));
        assert_eq!(inst.first_space_multiplier, Some(1.5));
    }

    #[test]
    fn first_space_below_one_warns() {
        let (inst, warnings) = parse_query("firstspace=0.5");
        assert_eq!(inst.first_space_multiplier, None);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn parse_format() {
        let (inst, _) = parse_query("format=JPG");
        assert_eq!(inst.format, Some(ExportFormat::Jpeg));

        let (inst, warnings) = parse_query("format=gif");
        assert_eq!(inst.format, None);
        assert!(matches!(
            warnings.as_slice(),
            [ParseWarning::ValueInvalid { key: "format", .. }]
        ));
    }

    #[test]
    fn unknown_key_warns_and_is_preserved() {
        let (inst, warnings) = parse_query("scale=0.05&foobar=baz");
        assert_eq!(inst.extras().get("foobar").map(String::as_str), Some("baz"));
        assert!(warnings.iter().any(|w| matches!(
            w,
            ParseWarning::KeyNotRecognized { key, .. } if key == "foobar"
        )));
    }

    #[test]
    fn percent_decoding_works() {
        let (inst, _) = parse_query("margin%2Eright=15&gap=%77idened");
        assert_eq!(inst.margin_right, Some(15.0));
        assert_eq!(inst.gap, Some(GapModel::Widened));
    }

    #[test]
    fn percent_decoding_keeps_utf8() {
        assert_eq!(percent_decode("caf%C3%A9+au+lait"), "café au lait");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
    }

    #[test]
    fn leading_question_mark_stripped() {
        let (inst, _) = parse_query("?yy=24&mm=5");
        assert_eq!(inst.year, Some(24));
        assert_eq!(inst.month, Some(5));
    }

    #[test]
    fn duplicate_key_warns() {
        let (inst, warnings) = parse_query("scale=0.05&scale=0.02");
        // Last value wins
        assert_eq!(inst.scale, Some(0.02));
        assert!(
            warnings
                .iter()
                .any(|w| matches!(w, ParseWarning::DuplicateKey { .. }))
        );
    }

    #[test]
    fn alias_duplicates_warn() {
        let (_, warnings) = parse_query("yy=1&year=2");
        assert_eq!(warnings.len(), 1);
    }
}
