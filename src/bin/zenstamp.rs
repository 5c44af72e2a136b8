use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use log::LevelFilter;

use zenstamp::raster::{self, GlyphImages, StampError};
use zenstamp::query::Instructions;
use zenstamp::{DateValue, ExportFormat, GapModel, LayoutParams, Margins, Stamp, query};

#[derive(Parser)]
#[command(name = "zenstamp")]
#[command(version, about = "Stamp a seven-segment date onto a photo")]
struct Args {
    /// Photo to stamp (PNG or JPEG)
    input: PathBuf,

    /// Output path [default: dated_image.png / dated_image.jpg]
    #[arg(short, long, env = "ZENSTAMP_OUTPUT")]
    output: Option<PathBuf>,

    /// Output format [default: from --output extension, else png]
    #[arg(short, long, value_enum, env = "ZENSTAMP_FORMAT")]
    format: Option<Format>,

    /// Directory holding 0.png … 9.png and apostrophe.png
    #[arg(long, default_value = "assets", env = "ZENSTAMP_ASSETS")]
    assets: PathBuf,

    /// Year in century (0-99)
    #[arg(long, env = "ZENSTAMP_YEAR", allow_negative_numbers = true)]
    year: Option<i32>,

    /// Month (1-12)
    #[arg(long, env = "ZENSTAMP_MONTH", allow_negative_numbers = true)]
    month: Option<i32>,

    /// Day (1-31)
    #[arg(long, env = "ZENSTAMP_DAY", allow_negative_numbers = true)]
    day: Option<i32>,

    /// Settings as a query string, e.g. "yy=24&mm=5&dd=17&scale=0.04"
    #[arg(long, env = "ZENSTAMP_PARAMS")]
    params: Option<String>,

    /// Glyph height as a fraction of photo height
    #[arg(long, env = "ZENSTAMP_SCALE")]
    scale: Option<f64>,

    /// Right and bottom margin in pixels
    #[arg(long, env = "ZENSTAMP_MARGIN", conflicts_with_all = ["margin_x", "margin_y"])]
    margin: Option<f64>,

    /// Right margin as a fraction of photo width
    #[arg(long, env = "ZENSTAMP_MARGIN_X")]
    margin_x: Option<f64>,

    /// Bottom margin as a fraction of photo height
    #[arg(long, env = "ZENSTAMP_MARGIN_Y")]
    margin_y: Option<f64>,

    /// Gap width relative to the reference glyph
    #[arg(long, env = "ZENSTAMP_SPACE")]
    space: Option<f64>,

    /// Gap model between date groups
    #[arg(long, value_enum, env = "ZENSTAMP_GAP")]
    gap: Option<Gap>,

    /// Widening of the year/month gap (widened model only)
    #[arg(long, env = "ZENSTAMP_FIRST_SPACE")]
    first_space: Option<f64>,

    /// Outline the stamp's bounding box
    #[arg(long, env = "ZENSTAMP_BOUNDS")]
    bounds: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Png,
    #[value(alias = "jpg")]
    Jpeg,
}

impl From<Format> for ExportFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Png => ExportFormat::Png,
            Format::Jpeg => ExportFormat::Jpeg,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Gap {
    Paired,
    Widened,
}

impl From<Gap> for GapModel {
    fn from(g: Gap) -> Self {
        match g {
            Gap::Paired => GapModel::Paired,
            Gap::Widened => GapModel::Widened,
        }
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Flags override whatever the presets and `--params` produced.
fn apply_flags(args: &Args, mut p: LayoutParams) -> LayoutParams {
    if let Some(s) = args.scale {
        p = p.scale(s);
    }
    if let Some(m) = args.margin {
        p = p.margins(Margins::uniform_pixels(m));
    }
    if args.margin_x.is_some() || args.margin_y.is_some() {
        let (bx, by) = match p.margins {
            Margins::Fraction { x, y } => (x, y),
            Margins::Pixels { .. } => (0.0, 0.0),
        };
        p = p.margins(Margins::fraction(
            args.margin_x.unwrap_or(bx),
            args.margin_y.unwrap_or(by),
        ));
    }
    if let Some(r) = args.space {
        p = p.space_ratio(r);
    }
    if let Some(g) = args.gap {
        p = p.gap_model(g.into());
    }
    if let Some(m) = args.first_space {
        p = p.first_space_multiplier(m);
    }
    if args.bounds {
        p = p.show_bounds(true);
    }
    p
}

/// Preset, then `--params`, then flags.
fn resolve_params(args: &Args, inst: &Instructions, preset: LayoutParams) -> LayoutParams {
    let base = if inst.has_layout() {
        inst.apply(preset)
    } else {
        log::debug!("--params sets no layout fields");
        preset
    };
    apply_flags(args, base)
}

/// Query date fields, then `--year` / `--month` / `--day`.
fn resolve_date(args: &Args, inst: &Instructions) -> DateValue {
    let date = inst.date(DateValue::default());
    DateValue::new(
        args.year.unwrap_or(date.year() as i32),
        args.month.unwrap_or(date.month() as i32),
        args.day.unwrap_or(date.day() as i32),
    )
}

fn output_format(args: &Args, from_query: Option<ExportFormat>) -> ExportFormat {
    args.format
        .map(ExportFormat::from)
        .or(from_query)
        .or_else(|| {
            args.output
                .as_deref()
                .and_then(Path::extension)
                .and_then(|e| e.to_str())
                .and_then(ExportFormat::from_extension)
        })
        .unwrap_or_default()
}

fn run(args: &Args) -> Result<(), StampError> {
    let bytes = std::fs::read(&args.input).map_err(|source| StampError::Io {
        path: args.input.clone(),
        source,
    })?;
    let glyphs = GlyphImages::load_dir(&args.assets)?;
    let photo = raster::decode_photo(&bytes)?;

    let settings = query::parse(args.params.as_deref().unwrap_or(""));
    for w in &settings.warnings {
        log::warn!("--params: {w}");
    }
    let inst = settings.instructions;

    let date = resolve_date(args, &inst);
    let (mut stamp, orientation) = Stamp::for_photo(photo.width(), photo.height(), &bytes, date);
    log::info!(
        "{}: {}x{}, {orientation:?}",
        args.input.display(),
        photo.width(),
        photo.height()
    );
    stamp.params = resolve_params(args, &inst, stamp.params);
    log::debug!("stamp {:?} with {:?}", stamp.date, stamp.params);

    let (image, layout) = raster::composite(&photo, &glyphs, &stamp)?;
    log::debug!("stamp bounds {:?}", layout.bounds);

    let format = output_format(args, inst.format);
    let encoded = raster::encode(&image, format)?;
    let out = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format.file_name()));
    std::fs::write(&out, encoded).map_err(|source| StampError::Write {
        path: out.clone(),
        source,
    })?;
    log::info!("wrote {}", out.display());
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("zenstamp: {e}");
            ExitCode::FAILURE
        }
    }
}
