use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

// ============================================================================
// COLOR & POINT
// ============================================================================

/// Straight (non-premultiplied) RGBA colour, 8 bits per channel.
///
/// Field names double as the palette file format (`{"r":..,"g":..,"b":..,"a":..}`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn from_bytes(b: [u8; 4]) -> Self {
        Self { r: b[0], g: b[1], b: b[2], a: b[3] }
    }
}

impl From<Rgba<u8>> for Color {
    fn from(p: Rgba<u8>) -> Self {
        Color::from_bytes(p.0)
    }
}

impl From<Color> for Rgba<u8> {
    fn from(c: Color) -> Self {
        Rgba(c.to_bytes())
    }
}

/// Integer pixel coordinate. Also used for brush offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point::new(0, 0);

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

// ============================================================================
// PAINT MODE
// ============================================================================

/// How a pixel write combines the source colour with what is already there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PaintMode {
    /// Replace the destination bytes unconditionally.
    #[default]
    Overwrite,
    /// Alpha-over compositing of the source onto the destination.
    Blend,
}

impl PaintMode {
    pub fn label(&self) -> &'static str {
        match self {
            PaintMode::Overwrite => "Overwrite",
            PaintMode::Blend => "Blend",
        }
    }

    pub fn all() -> &'static [PaintMode] {
        &[PaintMode::Overwrite, PaintMode::Blend]
    }

    /// Settings-file token.
    pub fn name(&self) -> &'static str {
        match self {
            PaintMode::Overwrite => "overwrite",
            PaintMode::Blend => "blend",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "overwrite" => Some(PaintMode::Overwrite),
            "blend" => Some(PaintMode::Blend),
            _ => None,
        }
    }
}

/// Alpha-over `src` onto `dst`.
///
/// `rgb = round((src*sa + dst*(255-sa)) / 255)`, `a = round(sa + da - sa*da/255)`,
/// rounding half away from zero and clamped to the channel range.
pub fn blend_over(dst: Color, src: Color) -> Color {
    // Fast paths: these are exact under the formula anyway.
    if src.a == 255 {
        return src;
    }
    if src.a == 0 {
        return dst;
    }

    let sa = src.a as f64;
    let inv = 255.0 - sa;
    let channel = |s: u8, d: u8| -> u8 {
        ((s as f64 * sa + d as f64 * inv) / 255.0).round().clamp(0.0, 255.0) as u8
    };
    let da = dst.a as f64;
    let a = (sa + da - sa * da / 255.0).round().clamp(0.0, 255.0) as u8;

    Color {
        r: channel(src.r, dst.r),
        g: channel(src.g, dst.g),
        b: channel(src.b, dst.b),
        a,
    }
}

// ============================================================================
// PIXEL BUFFER – flat row-major RGBA8 storage
// ============================================================================

/// Single flat RGBA8 image addressed by `(width, height)`.
///
/// `pixels.len() == width * height * 4` at all times; dimensions and storage
/// are only ever replaced together. `version` increases on every mutation so
/// renderers can cheaply detect staleness.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    version: u64,
}

impl PixelBuffer {
    // ---- construction -------------------------------------------------------

    /// Zero-filled (fully transparent) buffer. Both dimensions must be ≥ 1.
    pub fn new(width: u32, height: u32) -> Self {
        assert_dimensions(width, height);
        Self {
            width,
            height,
            pixels: vec![0; byte_len(width, height)],
            version: 1,
        }
    }

    /// Wrap an existing RGBA8 byte vector. Panics if the length does not match.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        assert_dimensions(width, height);
        assert_eq!(
            pixels.len(),
            byte_len(width, height),
            "PixelBuffer::from_raw: {} bytes for {}×{}",
            pixels.len(),
            width,
            height
        );
        Self { width, height, pixels, version: 1 }
    }

    pub fn from_rgba_image(img: &RgbaImage) -> Self {
        Self::from_raw(img.width(), img.height(), img.as_raw().clone())
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        // Length invariant makes `from_raw` infallible here.
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    /// Replace the contents with a fresh transparent `width × height` buffer.
    pub fn create_new(&mut self, width: u32, height: u32) {
        assert_dimensions(width, height);
        self.width = width;
        self.height = height;
        self.pixels = vec![0; byte_len(width, height)];
        self.bump_version();
    }

    // ---- accessors ----------------------------------------------------------

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Raw row-major RGBA8 bytes.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable raw bytes for bulk kernels. Callers must `bump_version()` afterwards.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn bump_version(&mut self) {
        self.version += 1;
    }

    pub fn memory_bytes(&self) -> usize {
        self.pixels.len()
    }

    // ---- pixel access -------------------------------------------------------

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Byte offset of `(x, y)`, or `None` when outside the canvas.
    #[inline]
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    /// Read a pixel; off-canvas reads return transparent black.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Color {
        match self.index(x, y) {
            Some(i) => Color::from_bytes([
                self.pixels[i],
                self.pixels[i + 1],
                self.pixels[i + 2],
                self.pixels[i + 3],
            ]),
            None => Color::TRANSPARENT,
        }
    }

    /// Write a pixel; off-canvas writes are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color, mode: PaintMode) {
        let Some(i) = self.index(x, y) else { return };
        let out = match mode {
            PaintMode::Overwrite => color,
            PaintMode::Blend => blend_over(self.get_pixel(x, y), color),
        };
        self.pixels[i..i + 4].copy_from_slice(&out.to_bytes());
        self.bump_version();
    }

    // ---- wholesale replacement ------------------------------------------------

    /// Independent copy of the current bytes.
    pub fn snapshot(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Restore bytes captured by [`snapshot`](Self::snapshot) at the current size.
    pub fn restore_snapshot(&mut self, data: &[u8]) {
        assert_eq!(
            data.len(),
            self.pixels.len(),
            "restore_snapshot: snapshot size does not match the {}×{} buffer",
            self.width,
            self.height
        );
        self.pixels.copy_from_slice(data);
        self.bump_version();
    }

    /// Replace dimensions and bytes together (copies `data`).
    pub fn set_image_data(&mut self, data: &[u8], width: u32, height: u32) {
        self.replace(data.to_vec(), width, height);
    }

    /// Like [`set_image_data`](Self::set_image_data) but takes ownership of the bytes.
    pub fn replace(&mut self, data: Vec<u8>, width: u32, height: u32) {
        assert_dimensions(width, height);
        assert_eq!(
            data.len(),
            byte_len(width, height),
            "set_image_data: {} bytes for {}×{}",
            data.len(),
            width,
            height
        );
        self.width = width;
        self.height = height;
        self.pixels = data;
        self.bump_version();
    }
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::new(32, 32)
    }
}

#[inline]
fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

fn assert_dimensions(width: u32, height: u32) {
    assert!(
        width >= 1 && height >= 1,
        "PixelBuffer: dimensions must be at least 1×1 (got {}×{})",
        width,
        height
    );
}

// ============================================================================
// SYMMETRY
// ============================================================================

/// Mirror drawing configuration.
///
/// `horizontal` mirrors across the horizontal centre line (top↔bottom),
/// `vertical` across the vertical centre line (left↔right). With both on,
/// the diagonal mirror is added as well.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Symmetry {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Symmetry {
    pub const NONE: Symmetry = Symmetry { horizontal: false, vertical: false };
    pub const BOTH: Symmetry = Symmetry { horizontal: true, vertical: true };

    pub fn is_active(self) -> bool {
        self.horizontal || self.vertical
    }

    /// Every pixel a single action at `(x, y)` touches on a `w × h` canvas.
    ///
    /// The original point always comes first. Mirrors landing on the point
    /// itself (centre lines of odd-sized canvases) are skipped, so the result
    /// never repeats a point. Off-canvas input yields only itself.
    pub fn points(self, x: i32, y: i32, w: u32, h: u32) -> SymmetryPoints {
        let mut out = SymmetryPoints { data: [Point::new(x, y); 4], len: 1 };

        let on_canvas = x >= 0 && y >= 0 && (x as u32) < w && (y as u32) < h;
        if !on_canvas || !self.is_active() {
            return out;
        }

        let in_bounds = |px: i32, py: i32| px >= 0 && py >= 0 && (px as u32) < w && (py as u32) < h;
        let mirror_x = (w as i32 - 1) - x;
        let mirror_y = (h as i32 - 1) - y;

        if self.horizontal && mirror_y != y && in_bounds(x, mirror_y) {
            out.push(Point::new(x, mirror_y));
        }
        if self.vertical && mirror_x != x && in_bounds(mirror_x, y) {
            out.push(Point::new(mirror_x, y));
        }
        if self.horizontal
            && self.vertical
            && mirror_x != x
            && mirror_y != y
            && in_bounds(mirror_x, mirror_y)
        {
            out.push(Point::new(mirror_x, mirror_y));
        }
        out
    }
}

/// Inline array of up to 4 mirrored positions (no heap allocation).
#[derive(Clone, Copy, Debug)]
pub struct SymmetryPoints {
    data: [Point; 4],
    len: usize,
}

impl SymmetryPoints {
    fn push(&mut self, p: Point) {
        self.data[self.len] = p;
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[Point] {
        &self.data[..self.len]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.as_slice().iter()
    }

    pub fn to_vec(&self) -> Vec<Point> {
        self.as_slice().to_vec()
    }
}

// ============================================================================
// Tests
// ============================================================================
