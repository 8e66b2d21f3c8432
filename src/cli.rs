// ============================================================================
// Pexler CLI - headless batch editing via command-line arguments
// ============================================================================
//
// Usage examples:
//   pexler -i sprite.png --op rotate-90 -o rotated.png
//   pexler -i "tiles/*.png" --op flip-h --output-dir flipped/
//   pexler --new 16x16 --op fill=0,0,#202020 --op ellipse=2,2,13,13,#ffcc00 -o coin.png
//
// Operations run in the order given, each as one undo step on an in-memory
// document, then the result is encoded to the output format.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Instant;

use clap::{ArgGroup, Parser};

use crate::canvas::{Color, Point};
use crate::components::colors::parse_hex;
use crate::io::{self, SaveFormat};
use crate::ops::shapes::{ShapeFillMode, ShapeKind};
use crate::project::Document;
use crate::settings::{EditorSettings, MAX_CANVAS_SIDE};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// Pexler headless pixel-art processor.
#[derive(Parser, Debug)]
#[command(
    name = "pexler",
    version,
    about = "Pexler headless pixel-art batch editor",
    long_about = "Apply flips, rotations, fills and shapes to image files without\n\
                  opening an editor. Reads anything the image crate decodes; writes\n\
                  PNG, JPEG, WEBP, BMP, TGA, ICO and TIFF.\n\n\
                  Operations (repeat --op, applied in order):\n  \
                  flip-h | flip-v | rotate-90 | rotate-180 | rotate-270\n  \
                  fill=X,Y,#rrggbb\n  \
                  line=X0,Y0,X1,Y1,#rrggbb\n  \
                  rect=… | rect-filled=… | ellipse=… | ellipse-filled=…"
)]
#[command(group(ArgGroup::new("source").required(true).args(["input", "new"])))]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "tiles/*.png").
    #[arg(short, long, num_args = 1..)]
    pub input: Vec<String>,

    /// Start from a blank transparent canvas instead of input files, e.g. `32x32`.
    #[arg(long, value_name = "WxH")]
    pub new: Option<String>,

    /// Operation to apply; repeatable.
    #[arg(long = "op", value_name = "OP")]
    pub ops: Vec<CanvasOp>,

    /// Output file path. Only valid for a single input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format: png, jpeg, webp, bmp, tga, ico, tiff.
    /// When omitted, inferred from --output's extension, defaulting to png.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// JPEG quality (1–100).
    #[arg(short, long, default_value_t = io::DEFAULT_JPEG_QUALITY, value_name = "1-100")]
    pub quality: u8,

    /// Settings file supplying brush shape/size, paint mode and symmetry for shape ops.
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Print per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

// ============================================================================
// Operations
// ============================================================================

/// One `--op` argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CanvasOp {
    FlipHorizontal,
    FlipVertical,
    Rotate90,
    Rotate180,
    Rotate270,
    Fill { at: Point, color: Color },
    Shape { kind: ShapeKind, fill: ShapeFillMode, from: Point, to: Point, color: Color },
}

impl FromStr for CanvasOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, params) = match s.split_once('=') {
            Some((n, p)) => (n.trim(), Some(p)),
            None => (s, None),
        };

        let simple = match name {
            "flip-h" => Some(CanvasOp::FlipHorizontal),
            "flip-v" => Some(CanvasOp::FlipVertical),
            "rotate-90" => Some(CanvasOp::Rotate90),
            "rotate-180" => Some(CanvasOp::Rotate180),
            "rotate-270" => Some(CanvasOp::Rotate270),
            _ => None,
        };
        if let Some(op) = simple {
            return match params {
                None => Ok(op),
                Some(_) => Err(format!("'{}' takes no parameters", name)),
            };
        }

        let shape = match name {
            "line" => Some((ShapeKind::Line, ShapeFillMode::Outline)),
            "rect" => Some((ShapeKind::Rectangle, ShapeFillMode::Outline)),
            "rect-filled" => Some((ShapeKind::Rectangle, ShapeFillMode::Filled)),
            "ellipse" => Some((ShapeKind::Ellipse, ShapeFillMode::Outline)),
            "ellipse-filled" => Some((ShapeKind::Ellipse, ShapeFillMode::Filled)),
            "fill" => None,
            other => return Err(format!("unknown operation '{}'", other)),
        };

        let params = params.ok_or_else(|| format!("'{}' needs parameters, e.g. {}=…", name, name))?;
        let parts: Vec<&str> = params.split(',').map(str::trim).collect();
        let (coords, color) = match parts.split_last() {
            Some((color, coords)) => (coords, *color),
            None => return Err(format!("'{}': missing colour", name)),
        };
        let color = parse_hex(color).ok_or_else(|| format!("'{}': invalid colour '{}'", name, color))?;
        let nums = coords
            .iter()
            .map(|c| c.parse::<i32>().map_err(|_| format!("'{}': invalid coordinate '{}'", name, c)))
            .collect::<Result<Vec<i32>, String>>()?;

        match (shape, nums.as_slice()) {
            (None, [x, y]) => Ok(CanvasOp::Fill { at: Point::new(*x, *y), color }),
            (Some((kind, fill)), [x0, y0, x1, y1]) => Ok(CanvasOp::Shape {
                kind,
                fill,
                from: Point::new(*x0, *y0),
                to: Point::new(*x1, *y1),
                color,
            }),
            (None, _) => Err(format!("'{}' expects X,Y,#rrggbb", name)),
            (Some(_), _) => Err(format!("'{}' expects X0,Y0,X1,Y1,#rrggbb", name)),
        }
    }
}

impl CanvasOp {
    pub fn apply(&self, doc: &mut Document) {
        match *self {
            CanvasOp::FlipHorizontal => doc.flip_horizontal(),
            CanvasOp::FlipVertical => doc.flip_vertical(),
            CanvasOp::Rotate90 => doc.rotate_90(),
            CanvasOp::Rotate180 => doc.rotate_180(),
            CanvasOp::Rotate270 => doc.rotate_270(),
            CanvasOp::Fill { at, color } => {
                doc.fill_at(at, color);
            }
            CanvasOp::Shape { kind, fill, from, to, color } => doc.draw_shape(kind, fill, from, to, color),
        }
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    let save_format = parse_format(args.format.as_deref(), args.output.as_deref());

    let settings = match &args.settings {
        Some(path) => {
            if !path.exists() {
                eprintln!("error: settings file '{}' not found.", path.display());
                return ExitCode::FAILURE;
            }
            EditorSettings::load_from(path)
        }
        None => EditorSettings::default(),
    };

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!(
            "error: could not create output directory '{}': {}",
            dir.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    // -- Blank canvas mode ---------------------------------------------------
    if let Some(size_arg) = &args.new {
        let (w, h) = match parse_size(size_arg) {
            Ok(size) => size,
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::FAILURE;
            }
        };
        let output = match (&args.output, &args.output_dir) {
            (Some(out), _) => out.clone(),
            (None, Some(dir)) => dir.join(format!("untitled.{}", save_format.extension())),
            (None, None) => {
                eprintln!("error: --new needs --output or --output-dir.");
                return ExitCode::FAILURE;
            }
        };

        let start = Instant::now();
        let doc = Document::new(w, h).with_settings(&settings);
        return match finish(doc, &args.ops, &output, save_format, args.quality) {
            Ok(()) => {
                if args.verbose {
                    println!(
                        "  → {} ({:.0}ms)",
                        output.display(),
                        start.elapsed().as_secs_f64() * 1000.0
                    );
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    // -- File mode -------------------------------------------------------------
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    if let Err(e) = check_single_output(inputs.len(), args.output.as_deref()) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }

        let file_start = Instant::now();

        let Some(output_path) = build_output_path(
            input_path,
            args.output.as_deref(),
            args.output_dir.as_deref(),
            save_format,
        ) else {
            eprintln!(
                "  error: cannot determine output path for '{}'.",
                input_path.display()
            );
            any_failure = true;
            continue;
        };

        match run_one(input_path, &output_path, &args.ops, &settings, save_format, args.quality) {
            Ok(()) => {
                if args.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Per-file processing pipeline
// ============================================================================

fn run_one(
    input: &Path,
    output: &Path,
    ops: &[CanvasOp],
    settings: &EditorSettings,
    format: SaveFormat,
    quality: u8,
) -> Result<(), String> {
    let doc = Document::open(input)
        .map_err(|e| format!("load failed: {}", e))?
        .with_settings(settings);
    finish(doc, ops, output, format, quality)
}

fn finish(
    mut doc: Document,
    ops: &[CanvasOp],
    output: &Path,
    format: SaveFormat,
    quality: u8,
) -> Result<(), String> {
    for op in ops {
        op.apply(&mut doc);
    }
    io::save_image_as(&doc.canvas, output, format, quality)
        .map_err(|e| format!("save failed: {}", e))
}

// ============================================================================
// Helpers
// ============================================================================

/// Parse `WxH` (also `W×H` / `W,H`). Both sides must be in `1..=MAX_CANVAS_SIDE`.
pub fn parse_size(arg: &str) -> Result<(u32, u32), String> {
    let arg = arg.trim();
    let (w, h) = arg
        .split_once(['x', 'X', '×', ','])
        .ok_or_else(|| format!("invalid size '{}', expected WxH", arg))?;
    let side = |v: &str| {
        v.trim()
            .parse::<u32>()
            .ok()
            .filter(|n| (1..=MAX_CANVAS_SIDE).contains(n))
            .ok_or_else(|| format!("invalid size '{}': sides must be 1..={}", arg, MAX_CANVAS_SIDE))
    };
    Ok((side(w)?, side(h)?))
}

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// `--format` wins; otherwise the output extension; otherwise PNG.
fn parse_format(format_arg: Option<&str>, output: Option<&Path>) -> SaveFormat {
    if let Some(f) = format_arg {
        return SaveFormat::from_extension(f).unwrap_or_default();
    }
    output.map(SaveFormat::from_path).unwrap_or_default()
}

/// `--output` names one file, so it cannot take several inputs, even when
/// `--output-dir` is also given.
fn check_single_output(input_count: usize, output: Option<&Path>) -> Result<(), String> {
    match output {
        Some(_) if input_count > 1 => Err(format!(
            "{} input files given but --output only accepts a single file path.\n\
             Use --output-dir on its own to specify a destination directory for batch processing.",
            input_count
        )),
        _ => Ok(()),
    }
}

/// Compute the output path for a single input file.
///
/// Priority:
/// 1. `--output` (explicit path, used for single-file input)
/// 2. `--output-dir` (batch directory, derives filename from input stem)
/// 3. Fallback: same directory as input, same stem, new extension
///    (appends `_out` to stem if it would collide with the input path)
fn build_output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
    format: SaveFormat,
) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let ext = format.extension();
    let stem = input.file_stem()?.to_string_lossy().into_owned();

    if let Some(dir) = output_dir {
        return Some(dir.join(format!("{}.{}", stem, ext)));
    }

    let parent = input.parent().unwrap_or(Path::new("."));
    let candidate = parent.join(format!("{}.{}", stem, ext));

    if candidate == input {
        Some(parent.join(format!("{}_out.{}", stem, ext)))
    } else {
        Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_ops() {
        assert_eq!("flip-h".parse::<CanvasOp>(), Ok(CanvasOp::FlipHorizontal));
        assert_eq!(" rotate-270 ".parse::<CanvasOp>(), Ok(CanvasOp::Rotate270));
        assert!("rotate-90=1".parse::<CanvasOp>().is_err());
        assert!("rotate-45".parse::<CanvasOp>().is_err());
    }

    #[test]
    fn test_parse_fill_and_shapes() {
        assert_eq!(
            "fill=1,2,#ff0000".parse::<CanvasOp>(),
            Ok(CanvasOp::Fill { at: Point::new(1, 2), color: Color::rgb(255, 0, 0) })
        );
        assert_eq!(
            "ellipse-filled=0, 0, 9, 5, 00ff00".parse::<CanvasOp>(),
            Ok(CanvasOp::Shape {
                kind: ShapeKind::Ellipse,
                fill: ShapeFillMode::Filled,
                from: Point::new(0, 0),
                to: Point::new(9, 5),
                color: Color::rgb(0, 255, 0),
            })
        );
        assert!("line=-1,0,4,4,#000000".parse::<CanvasOp>().is_ok());
    }

    #[test]
    fn test_parse_bad_params() {
        assert!("fill".parse::<CanvasOp>().is_err());
        assert!("fill=1,#fff".parse::<CanvasOp>().is_err());
        assert!("fill=1,2,#zzzzzz".parse::<CanvasOp>().is_err());
        assert!("rect=0,0,3,#ffffff".parse::<CanvasOp>().is_err());
        assert!("rect=0,a,3,3,#ffffff".parse::<CanvasOp>().is_err());
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("32x16"), Ok((32, 16)));
        assert_eq!(parse_size("8X8"), Ok((8, 8)));
        assert_eq!(parse_size("4×2"), Ok((4, 2)));
        assert!(parse_size("0x4").is_err());
        assert!(parse_size("32").is_err());
        assert!(parse_size("99999x1").is_err());
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(parse_format(Some("JPG"), None), SaveFormat::Jpeg);
        assert_eq!(parse_format(None, Some(Path::new("a.bmp"))), SaveFormat::Bmp);
        assert_eq!(parse_format(Some("nope"), None), SaveFormat::Png);
        assert_eq!(parse_format(None, None), SaveFormat::Png);
    }

    #[test]
    fn test_build_output_path() {
        let input = Path::new("art/sprite.png");
        assert_eq!(
            build_output_path(input, Some(Path::new("x.png")), None, SaveFormat::Png),
            Some(PathBuf::from("x.png"))
        );
        assert_eq!(
            build_output_path(input, None, Some(Path::new("out")), SaveFormat::Bmp),
            Some(PathBuf::from("out/sprite.bmp"))
        );
        assert_eq!(
            build_output_path(input, None, None, SaveFormat::Png),
            Some(PathBuf::from("art/sprite_out.png"))
        );
        assert_eq!(
            build_output_path(input, None, None, SaveFormat::Tga),
            Some(PathBuf::from("art/sprite.tga"))
        );
    }

    #[test]
    fn test_output_file_rejects_batches() {
        assert!(check_single_output(1, Some(Path::new("out.png"))).is_ok());
        assert!(check_single_output(3, None).is_ok());
        assert!(check_single_output(2, Some(Path::new("out.png"))).is_err());
    }

    #[test]
    fn test_output_file_with_dir_and_batch_fails_run() {
        let dir = std::env::temp_dir().join(format!("pexler_cli_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut buf = crate::canvas::PixelBuffer::new(2, 2);
        buf.set_pixel(0, 0, Color::WHITE, crate::canvas::PaintMode::Overwrite);
        let a = dir.join("a.png");
        let b = dir.join("b.png");
        io::save_image(&buf, &a).unwrap();
        io::save_image(&buf, &b).unwrap();
        let out = dir.join("out.png");
        let out_dir = dir.join("batch");

        let args = CliArgs::try_parse_from([
            "pexler",
            "-i",
            a.to_str().unwrap(),
            b.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "--output-dir",
            out_dir.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(run(args), ExitCode::FAILURE);
        assert!(!out.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_ops_apply_to_document() {
        let mut doc = Document::new(4, 2);
        "fill=0,0,#0000ff".parse::<CanvasOp>().unwrap().apply(&mut doc);
        "rotate-90".parse::<CanvasOp>().unwrap().apply(&mut doc);
        "line=0,0,1,0,#ffffff".parse::<CanvasOp>().unwrap().apply(&mut doc);
        assert_eq!((doc.canvas.width(), doc.canvas.height()), (2, 4));
        assert_eq!(doc.canvas.get_pixel(1, 0), Color::WHITE);
        assert_eq!(doc.canvas.get_pixel(1, 3), Color::rgb(0, 0, 255));
        assert_eq!(doc.history.undo_count(), 3);
    }

    #[test]
    fn test_clap_args() {
        let args = CliArgs::try_parse_from([
            "pexler", "--new", "8x8", "--op", "flip-h", "--op", "fill=0,0,#ffffff", "-o", "out.png",
        ])
        .unwrap();
        assert_eq!(args.ops.len(), 2);
        assert_eq!(args.new.as_deref(), Some("8x8"));

        assert!(CliArgs::try_parse_from(["pexler", "-o", "out.png"]).is_err());
        assert!(CliArgs::try_parse_from(["pexler", "--new", "8x8", "--op", "spin"]).is_err());
    }
}
