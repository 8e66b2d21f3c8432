use crate::canvas::{Color, PaintMode, PixelBuffer, Point, Symmetry};
use crate::ops::shapes::{ShapeFillMode, ShapeKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Pencil,
    Eraser,
    Fill,
    Eyedropper,
    Line,
    Rectangle,
    Ellipse,
}

impl Tool {
    pub fn label(&self) -> &'static str {
        match self {
            Tool::Pencil => "Pencil",
            Tool::Eraser => "Eraser",
            Tool::Fill => "Fill",
            Tool::Eyedropper => "Eyedropper",
            Tool::Line => "Line",
            Tool::Rectangle => "Rectangle",
            Tool::Ellipse => "Ellipse",
        }
    }

    pub fn all() -> &'static [Tool] {
        &[
            Tool::Pencil,
            Tool::Eraser,
            Tool::Fill,
            Tool::Eyedropper,
            Tool::Line,
            Tool::Rectangle,
            Tool::Ellipse,
        ]
    }

    /// The shape a drag with this tool commits, if any.
    pub fn shape_kind(&self) -> Option<ShapeKind> {
        match self {
            Tool::Line => Some(ShapeKind::Line),
            Tool::Rectangle => Some(ShapeKind::Rectangle),
            Tool::Ellipse => Some(ShapeKind::Ellipse),
            _ => None,
        }
    }

    /// Freehand tools stamp the brush along the pointer path.
    pub fn is_freehand(&self) -> bool {
        matches!(self, Tool::Pencil | Tool::Eraser)
    }

    /// Whether starting a stroke with this tool snapshots the canvas first.
    pub fn modifies_canvas(&self) -> bool {
        !matches!(self, Tool::Eyedropper)
    }

    /// Whether pointer motion during a stroke is meaningful.
    pub fn tracks_motion(&self) -> bool {
        !matches!(self, Tool::Fill | Tool::Eyedropper)
    }
}

// ============================================================================
// BRUSH SHAPES - pixel offset sets relative to the stamp centre
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum BrushShape {
    #[default]
    Square,
    Circle,
}

impl BrushShape {
    pub fn label(&self) -> &'static str {
        match self {
            BrushShape::Square => "Square",
            BrushShape::Circle => "Circle",
        }
    }

    pub fn all() -> &'static [BrushShape] {
        &[BrushShape::Square, BrushShape::Circle]
    }

    /// Lowercase config-file name.
    pub fn name(&self) -> &'static str {
        match self {
            BrushShape::Square => "square",
            BrushShape::Circle => "circle",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "square" => Some(BrushShape::Square),
            "circle" => Some(BrushShape::Circle),
            _ => None,
        }
    }
}

/// Offset range for an `size`-wide brush: `[-floor(N/2), N - floor(N/2) - 1]`.
/// Even sizes put the extra cell on the positive side.
#[inline]
fn offset_range(size: u32) -> std::ops::RangeInclusive<i32> {
    let n = size as i32;
    let half = n / 2;
    -half..=n - half - 1
}

/// All `size²` cells of a square brush, row by row.
pub fn square_brush_offsets(size: u32) -> Vec<Point> {
    let mut offsets = Vec::with_capacity(size as usize * size as usize);
    for dy in offset_range(size) {
        for dx in offset_range(size) {
            offsets.push(Point::new(dx, dy));
        }
    }
    offsets
}

/// Cells of the square range whose distance to the origin is at most `size / 2`.
pub fn circle_brush_offsets(size: u32) -> Vec<Point> {
    let radius = size as f64 / 2.0;
    let mut offsets = Vec::new();
    for dy in offset_range(size) {
        for dx in offset_range(size) {
            let dist = ((dx * dx + dy * dy) as f64).sqrt();
            if dist <= radius {
                offsets.push(Point::new(dx, dy));
            }
        }
    }
    offsets
}

pub fn brush_offsets(shape: BrushShape, size: u32) -> Vec<Point> {
    match shape {
        BrushShape::Square => square_brush_offsets(size),
        BrushShape::Circle => circle_brush_offsets(size),
    }
}

// ============================================================================
// TOOL PROPERTIES
// ============================================================================

pub const MIN_BRUSH_SIZE: u32 = 1;
pub const MAX_BRUSH_SIZE: u32 = 64;

#[derive(Clone, Debug, PartialEq)]
pub struct ToolProperties {
    pub brush_shape: BrushShape,
    /// Brush width in pixels, kept within `MIN_BRUSH_SIZE..=MAX_BRUSH_SIZE`.
    pub brush_size: u32,
    /// How the pencil composites onto the canvas. The eraser always overwrites.
    pub paint_mode: PaintMode,
    pub shape_fill: ShapeFillMode,
    /// Force 1:1 rectangles and ellipses.
    pub constrain_square: bool,
}

impl Default for ToolProperties {
    fn default() -> Self {
        Self {
            brush_shape: BrushShape::Square,
            brush_size: 1,
            paint_mode: PaintMode::Overwrite,
            shape_fill: ShapeFillMode::Outline,
            constrain_square: false,
        }
    }
}

impl ToolProperties {
    pub fn set_brush_size(&mut self, size: u32) {
        self.brush_size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
    }

    pub fn offsets(&self) -> Vec<Point> {
        brush_offsets(self.brush_shape, self.brush_size)
    }
}

/// Pixels already painted by the current operation. A brush dragged along a
/// line, mirrored dabs and rasterizers that revisit points all land on the
/// same cells; each cell composites once per operation.
#[derive(Clone, Debug)]
pub struct StrokeMask {
    width: u32,
    height: u32,
    painted: Vec<bool>,
}

impl StrokeMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            painted: vec![false; width as usize * height as usize],
        }
    }

    pub fn for_buffer(buffer: &PixelBuffer) -> Self {
        Self::new(buffer.width(), buffer.height())
    }

    /// Mark `(x, y)`; true only the first time an on-canvas cell is claimed.
    pub fn claim(&mut self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return false;
        }
        let i = y as usize * self.width as usize + x as usize;
        !std::mem::replace(&mut self.painted[i], true)
    }

    pub fn painted_count(&self) -> usize {
        self.painted.iter().filter(|&&p| p).count()
    }
}

/// Paint one brush dab at `center`: expand through `symmetry`, then apply
/// every brush offset around each mirrored point. Off-canvas cells and cells
/// already claimed in `mask` are skipped.
pub fn stamp(
    buffer: &mut PixelBuffer,
    center: Point,
    color: Color,
    mode: PaintMode,
    offsets: &[Point],
    symmetry: Symmetry,
    mask: &mut StrokeMask,
) {
    let (w, h) = (buffer.width(), buffer.height());
    for p in symmetry.points(center.x, center.y, w, h).iter() {
        for o in offsets {
            let (x, y) = (p.x + o.x, p.y + o.y);
            if mask.claim(x, y) {
                buffer.set_pixel(x, y, color, mode);
            }
        }
    }
}
