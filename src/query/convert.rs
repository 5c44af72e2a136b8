//! Layer parsed instructions over layout parameters.

use crate::glyph::DateValue;
use crate::layout::{LayoutParams, Margins};

use super::instructions::Instructions;

impl Instructions {
    /// Apply the set fields over `base`.
    ///
    /// Margin resolution:
    /// - `marginx`/`marginy` switch to fractional margins. An axis left
    ///   unset keeps the base fraction, or 0 if the base was in pixels.
    /// - Otherwise `margin`/`margin.right`/`margin.bottom` set pixel margins.
    ///   An axis left unset keeps the base pixels, or 0 if the base was
    ///   fractional.
    ///
    /// Fractions take precedence when both kinds are present.
    pub fn apply(&self, base: LayoutParams) -> LayoutParams {
        let mut p = base;

        if let Some(s) = self.scale {
            p.scale = s;
        }
        if let Some(r) = self.space_ratio {
            p.space_ratio = r;
        }
        if let Some(g) = self.gap {
            p.gap_model = g;
        }
        if let Some(m) = self.first_space_multiplier {
            p.first_space_multiplier = m;
        }
        if let Some(b) = self.show_bounds {
            p.show_bounds = b;
        }

        p.margins = self.resolve_margins(base.margins);
        p
    }

    fn resolve_margins(&self, base: Margins) -> Margins {
        if self.margin_x.is_some() || self.margin_y.is_some() {
            let (bx, by) = match base {
                Margins::Fraction { x, y } => (x, y),
                Margins::Pixels { .. } => (0.0, 0.0),
            };
            return Margins::Fraction {
                x: self.margin_x.unwrap_or(bx),
                y: self.margin_y.unwrap_or(by),
            };
        }

        if self.margin_right.is_some() || self.margin_bottom.is_some() {
            let (br, bb) = match base {
                Margins::Pixels { right, bottom } => (right, bottom),
                Margins::Fraction { .. } => (0.0, 0.0),
            };
            return Margins::Pixels {
                right: self.margin_right.unwrap_or(br),
                bottom: self.margin_bottom.unwrap_or(bb),
            };
        }

        base
    }

    /// Date from the set fields, falling back per field to `fallback`.
    /// Always clamped.
    pub fn date(&self, fallback: DateValue) -> DateValue {
        DateValue::new(
            self.year.unwrap_or(fallback.year() as i32),
            self.month.unwrap_or(fallback.month() as i32),
            self.day.unwrap_or(fallback.day() as i32),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::glyph::{DateValue, GapModel};
    use crate::layout::{LayoutParams, Margins};
    use crate::query::parse;

    fn apply(query: &str, base: LayoutParams) -> LayoutParams {
        parse(query).instructions.apply(base)
    }

    #[test]
    fn has_layout_ignores_date_and_format() {
        assert!(!parse("").instructions.has_layout());
        assert!(!parse("yy=1&mm=2&dd=3&format=png&foo=bar").instructions.has_layout());
        assert!(parse("scale=0.1").instructions.has_layout());
        assert!(parse("marginy=0.1").instructions.has_layout());
        assert!(parse("bounds=false").instructions.has_layout());
    }

    #[test]
    fn empty_query_is_identity() {
        let base = LayoutParams::portrait();
        assert_eq!(apply("", base), base);
    }

    #[test]
    fn scalar_fields_override() {
        let p = apply(
            "scale=0.08&space=0.5&gap=paired&firstspace=3&bounds=yes",
            LayoutParams::landscape(),
        );
        assert_eq!(p.scale, 0.08);
        assert_eq!(p.space_ratio, 0.5);
        assert_eq!(p.gap_model, GapModel::Paired);
        assert_eq!(p.first_space_multiplier, 3.0);
        assert!(p.show_bounds);
    }

    #[test]
    fn single_pixel_edge_keeps_other_edge() {
        let p = apply("margin.bottom=40", LayoutParams::landscape());
        assert_eq!(p.margins, Margins::pixels(200.0, 40.0));
    }

    #[test]
    fn fraction_switches_mode() {
        let p = apply("marginx=0.05", LayoutParams::landscape());
        assert_eq!(p.margins, Margins::fraction(0.05, 0.0));

        let base = LayoutParams::landscape().margins(Margins::fraction(0.1, 0.2));
        let p = apply("marginy=0.3", base);
        assert_eq!(p.margins, Margins::fraction(0.1, 0.3));
    }

    #[test]
    fn fraction_wins_over_pixels() {
        let p = apply("margin=50&marginx=0.1&marginy=0.1", LayoutParams::landscape());
        assert_eq!(p.margins, Margins::fraction(0.1, 0.1));
    }

    #[test]
    fn pixels_from_fraction_base() {
        let base = LayoutParams::landscape().margins(Margins::fraction(0.1, 0.2));
        let p = apply("margin.right=30", base);
        assert_eq!(p.margins, Margins::pixels(30.0, 0.0));
    }

    #[test]
    fn date_falls_back_per_field_and_clamps() {
        let inst = parse("yy=150&dd=0").instructions;
        let d = inst.date(DateValue::new(24, 7, 15));
        assert_eq!((d.year(), d.month(), d.day()), (99, 7, 1));
    }
}
