//! Frame rendering through a recording canvas.
//!
//! Every call is captured with its rectangle so ordering, placement, and
//! the clear-then-redraw contract can be checked without pixels.

use zenstamp::*;

#[derive(Clone, Debug, PartialEq)]
enum Op {
    Clear(f64, f64, f64, f64),
    Image(&'static str, f64, f64, f64, f64),
    Stroke(f64, f64, f64, f64),
}

struct Recording {
    size: (u32, u32),
    ops: Vec<Op>,
}

impl Canvas for Recording {
    type Image = &'static str;

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(Op::Clear(x, y, w, h));
    }

    fn draw_image(&mut self, image: &&'static str, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(Op::Image(*image, x, y, w, h));
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(Op::Stroke(x, y, w, h));
    }
}

static NAMES: [&str; 11] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "apostrophe"];

/// All glyphs 30×60 except the apostrophe at 15×60.
struct Named {
    present: [bool; 11],
}

impl Named {
    fn all() -> Self {
        Self { present: [true; 11] }
    }
}

impl GlyphAtlas for Named {
    type Image = &'static str;

    fn glyph(&self, key: GlyphKey) -> Option<&&'static str> {
        let i = GlyphKey::ASSETS.iter().position(|&k| k == key)?;
        self.present[i].then(|| &NAMES[i])
    }

    fn glyph_size(&self, key: GlyphKey) -> Option<(u32, u32)> {
        self.glyph(key)?;
        Some(if key == GlyphKey::Apostrophe { (15, 60) } else { (30, 60) })
    }
}

fn canvas(w: u32, h: u32) -> Recording {
    Recording {
        size: (w, h),
        ops: Vec::new(),
    }
}

#[test]
fn full_frame_sequence() {
    let mut c = canvas(1000, 480);
    let stamp = Stamp::new(DateValue::new(24, 5, 17)).params(
        LayoutParams::new(0.125)
            .margins(Margins::pixels(20.0, 10.0))
            .space_ratio(0.5)
            .show_bounds(true),
    );
    let layout = render_frame(&mut c, Some(&"photo"), &Named::all(), &stamp)
        .unwrap()
        .unwrap();

    // glyph_h 60; digit 30, apostrophe 15; space 15, wide space 30.
    // ' 2 4 [30] 5 [15] 1 7  → 15 + 60 + 30 + 30 + 15 + 60 = 210
    let x0 = 1000.0 - 20.0 - 210.0;
    let y0 = 480.0 - 10.0 - 60.0;
    assert_eq!(layout.total_width(), 210.0);

    assert_eq!(
        c.ops,
        vec![
            Op::Clear(0.0, 0.0, 1000.0, 480.0),
            Op::Image("photo", 0.0, 0.0, 1000.0, 480.0),
            Op::Stroke(x0, y0, 210.0, 60.0),
            Op::Image("apostrophe", x0, y0, 15.0, 60.0),
            Op::Image("2", x0 + 15.0, y0, 30.0, 60.0),
            Op::Image("4", x0 + 45.0, y0, 30.0, 60.0),
            Op::Image("5", x0 + 105.0, y0, 30.0, 60.0),
            Op::Image("1", x0 + 150.0, y0, 30.0, 60.0),
            Op::Image("7", x0 + 180.0, y0, 30.0, 60.0),
        ]
    );
}

#[test]
fn paired_gaps_double_each_space() {
    let mut c = canvas(1000, 480);
    let stamp = Stamp::new(DateValue::new(9, 11, 3)).params(
        LayoutParams::new(0.125)
            .margins(Margins::uniform_pixels(0.0))
            .space_ratio(0.5)
            .gap_model(GapModel::Paired),
    );
    let layout = render_frame(&mut c, Some(&"photo"), &Named::all(), &stamp)
        .unwrap()
        .unwrap();

    // ' 0 9 [15 15] 1 1 [15 15] 0 3
    let names: Vec<&str> = layout
        .commands()
        .iter()
        .map(|cmd| NAMES[GlyphKey::ASSETS.iter().position(|&k| k == cmd.key).unwrap()])
        .collect();
    assert_eq!(names, ["apostrophe", "0", "9", "1", "1", "0", "3"]);
    assert_eq!(layout.total_width(), 15.0 + 6.0 * 30.0 + 4.0 * 15.0);
    assert!(!c.ops.iter().any(|op| matches!(op, Op::Stroke(..))));
}

#[test]
fn rerender_is_idempotent() {
    let stamp = Stamp::new(DateValue::new(99, 12, 31));
    let mut a = canvas(4000, 3000);
    let mut b = canvas(4000, 3000);
    render_frame(&mut a, Some(&"p"), &Named::all(), &stamp).unwrap();
    render_frame(&mut b, Some(&"p"), &Named::all(), &stamp).unwrap();
    render_frame(&mut b, Some(&"p"), &Named::all(), &stamp).unwrap();

    // Second frame on `b` starts with a full clear and repeats the first.
    let n = a.ops.len();
    assert_eq!(b.ops.len(), 2 * n);
    assert_eq!(&b.ops[n..], a.ops.as_slice());
}

#[test]
fn missing_glyph_clears_only() {
    let mut atlas = Named::all();
    atlas.present[9] = false;
    let mut c = canvas(800, 600);
    // Date does not use 9; the missing asset still blocks layout.
    let stamp = Stamp::new(DateValue::new(24, 5, 17));

    let err = render_frame(&mut c, Some(&"photo"), &atlas, &stamp).unwrap_err();
    assert_eq!(err, LayoutError::AssetMissing(GlyphKey::Digit(9)));
    assert_eq!(c.ops, vec![Op::Clear(0.0, 0.0, 800.0, 600.0)]);
}

#[test]
fn no_photo_clears_only() {
    let mut c = canvas(800, 600);
    let out = render_frame(&mut c, None, &Named::all(), &Stamp::new(DateValue::default())).unwrap();
    assert!(out.is_none());
    assert_eq!(c.ops, vec![Op::Clear(0.0, 0.0, 800.0, 600.0)]);
}

#[test]
fn portrait_photo_gets_portrait_preset() {
    let (stamp, orientation) = Stamp::for_photo(3000, 4000, &[], DateValue::new(24, 5, 17));
    assert_eq!(orientation, Orientation::Portrait);

    let mut c = canvas(3000, 4000);
    let layout = render_frame(&mut c, Some(&"p"), &Named::all(), &stamp)
        .unwrap()
        .unwrap();
    assert_eq!(layout.glyph_height, 100.0);
    assert_eq!(layout.bounds.right(), 2900.0);
    assert_eq!(layout.bounds.bottom(), 3900.0);
}

#[test]
fn draw_stamp_is_the_photo_frame() {
    let stamp =
        Stamp::new(DateValue::new(24, 5, 17)).params(LayoutParams::new(0.125).show_bounds(true));
    let mut framed = canvas(1000, 480);
    let mut drawn = canvas(1000, 480);
    let a = render_frame(&mut framed, Some(&"photo"), &Named::all(), &stamp)
        .unwrap()
        .unwrap();
    let b = draw_stamp(&mut drawn, &"photo", &Named::all(), &stamp).unwrap();

    assert_eq!(a, b);
    assert_eq!(framed.ops, drawn.ops);

    let mut atlas = Named::all();
    atlas.present[0] = false;
    let mut failed = canvas(1000, 480);
    let err = draw_stamp(&mut failed, &"photo", &atlas, &stamp).unwrap_err();
    assert_eq!(err, LayoutError::AssetMissing(GlyphKey::Digit(0)));
    assert_eq!(failed.ops, vec![Op::Clear(0.0, 0.0, 1000.0, 480.0)]);
}
