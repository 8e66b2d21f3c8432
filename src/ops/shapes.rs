// ============================================================================
// SHAPE RASTERIZATION - lines, rectangles, ellipses on the integer grid
// ============================================================================
//
// Every rasterizer is stateless and reports pixels through an `emit(x, y)`
// callback, so the same geometry drives direct painting, brush/symmetry
// expansion and preview overlays alike.

use crate::canvas::Point;

/// Shape primitives the shape tools can commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Line,
    Rectangle,
    Ellipse,
}

impl ShapeKind {
    pub fn label(&self) -> &'static str {
        match self {
            ShapeKind::Line => "Line",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Ellipse => "Ellipse",
        }
    }

    pub fn all() -> &'static [ShapeKind] {
        &[ShapeKind::Line, ShapeKind::Rectangle, ShapeKind::Ellipse]
    }

    /// Whether the 1:1 aspect constraint applies (lines keep their free angle).
    pub fn supports_square_constraint(&self) -> bool {
        !matches!(self, ShapeKind::Line)
    }
}

/// How a shape is painted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ShapeFillMode {
    #[default]
    Outline,
    Filled,
}

impl ShapeFillMode {
    pub fn label(&self) -> &'static str {
        match self {
            ShapeFillMode::Outline => "Outline",
            ShapeFillMode::Filled => "Filled",
        }
    }

    pub fn all() -> &'static [ShapeFillMode] {
        &[ShapeFillMode::Outline, ShapeFillMode::Filled]
    }
}

/// Rasterize `kind` spanning `a`..`b`. Lines ignore the fill mode.
pub fn rasterize_shape(
    kind: ShapeKind,
    fill: ShapeFillMode,
    a: Point,
    b: Point,
    emit: impl FnMut(i32, i32),
) {
    match (kind, fill) {
        (ShapeKind::Line, _) => bresenham_line(a, b, emit, false),
        (ShapeKind::Rectangle, ShapeFillMode::Outline) => rect_outline(a, b, emit),
        (ShapeKind::Rectangle, ShapeFillMode::Filled) => rect_filled(a, b, emit),
        (ShapeKind::Ellipse, ShapeFillMode::Outline) => ellipse_outline(a, b, emit),
        (ShapeKind::Ellipse, ShapeFillMode::Filled) => ellipse_filled(a, b, emit),
    }
}

// ---------------------------------------------------------------------------
//  Lines
// ---------------------------------------------------------------------------

/// Integer Bresenham line from `from` to `to`, both endpoints inclusive.
///
/// With `skip_first` the very first pixel is suppressed, so consecutive
/// freehand segments sharing an endpoint touch it only once. Swapping the
/// endpoints yields the same pixels in reverse order: the error term is
/// always walked from the lexicographically smaller endpoint, since the
/// textbook tie-breaking differs between the two directions.
pub fn bresenham_line(from: Point, to: Point, mut emit: impl FnMut(i32, i32), skip_first: bool) {
    let skip = usize::from(skip_first);

    if (to.x, to.y) < (from.x, from.y) {
        let len = (to.x - from.x).abs().max((to.y - from.y).abs()) as usize + 1;
        let mut pts = Vec::with_capacity(len);
        walk_line(to, from, |x, y| pts.push((x, y)));
        for &(x, y) in pts.iter().rev().skip(skip) {
            emit(x, y);
        }
        return;
    }

    let mut seen = 0usize;
    walk_line(from, to, |x, y| {
        if seen >= skip {
            emit(x, y);
        }
        seen += 1;
    });
}

fn walk_line(from: Point, to: Point, mut emit: impl FnMut(i32, i32)) {
    let (mut x0, mut y0) = (from.x, from.y);
    let (x1, y1) = (to.x, to.y);

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    loop {
        emit(x0, y0);
        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

// ---------------------------------------------------------------------------
//  Rectangles
// ---------------------------------------------------------------------------

/// Corners sorted into `(min_x, min_y, max_x, max_y)`.
#[inline]
fn normalize(a: Point, b: Point) -> (i32, i32, i32, i32) {
    (a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
}

/// Perimeter of the closed box spanned by `a` and `b`.
///
/// Top and bottom rows first, then the left and right columns without the
/// corners. Collapsed boxes emit a single pixel or a single run.
pub fn rect_outline(a: Point, b: Point, mut emit: impl FnMut(i32, i32)) {
    let (x0, y0, x1, y1) = normalize(a, b);

    if x0 == x1 && y0 == y1 {
        emit(x0, y0);
        return;
    }
    if y0 == y1 {
        (x0..=x1).for_each(|x| emit(x, y0));
        return;
    }
    if x0 == x1 {
        (y0..=y1).for_each(|y| emit(x0, y));
        return;
    }

    for x in x0..=x1 {
        emit(x, y0);
        emit(x, y1);
    }
    for y in (y0 + 1)..y1 {
        emit(x0, y);
        emit(x1, y);
    }
}

/// Every pixel of the closed box spanned by `a` and `b`, row by row.
pub fn rect_filled(a: Point, b: Point, mut emit: impl FnMut(i32, i32)) {
    let (x0, y0, x1, y1) = normalize(a, b);
    for y in y0..=y1 {
        for x in x0..=x1 {
            emit(x, y);
        }
    }
}

// ---------------------------------------------------------------------------
//  Ellipses (midpoint algorithm inscribed in the bounding box)
// ---------------------------------------------------------------------------

/// Handles the collapsed-box cases shared by both ellipse variants.
/// Returns `true` when the shape was fully emitted.
fn ellipse_degenerate(x0: i32, y0: i32, x1: i32, y1: i32, emit: &mut impl FnMut(i32, i32)) -> bool {
    match (x1 - x0, y1 - y0) {
        (0, 0) => emit(x0, y0),
        (0, _) => (y0..=y1).for_each(|y| emit(x0, y)),
        (_, 0) => (x0..=x1).for_each(|x| emit(x, y0)),
        _ => return false,
    }
    true
}

/// Walk an ellipse inscribed in `[x0,x1]×[y0,y1]` (both extents > 0).
///
/// `visit(false, cx0, cx1, cy0, cy1)` is called for each step of the main
/// loop with the current left/right bounds and the lower (`cy0`) / upper
/// (`cy1`) rows, which start at the vertical centre and move outwards.
/// `visit(true, ..)` then finishes rows near the vertical extremes that flat
/// ellipses never reach in the main loop; its pixels are `cx0 - 1` and `cx1 + 1`.
///
/// `cy0 + cy1` stays constant, so `cy0 - cy1 <= h` is exactly `cy0 <= y1`:
/// the tip loop never leaves the box. Arithmetic is in `i64` because the
/// error terms grow with the square of the extents.
fn walk_ellipse(
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    mut visit: impl FnMut(bool, i32, i32, i32, i32),
) {
    let w = (x1 - x0) as i64;
    let h = (y1 - y0) as i64;

    let odd = h & 1;
    let mut dx = 4 * (1 - w) * h * h;
    let mut dy = 4 * (odd + 1) * w * w;
    let mut err = dx + dy + odd * w * w;
    let step_y = 8 * w * w;
    let step_x = 8 * h * h;

    let mut cy0 = y0 + ((h + 1) / 2) as i32;
    let mut cy1 = y0 + (h / 2) as i32;
    let mut cx0 = x0;
    let mut cx1 = x1;

    loop {
        visit(false, cx0, cx1, cy0, cy1);

        let e2 = 2 * err;
        if e2 <= dy {
            cy0 += 1;
            cy1 -= 1;
            dy += step_y;
            err += dy;
        }
        if e2 >= dx || 2 * err > dy {
            cx0 += 1;
            cx1 -= 1;
            dx += step_x;
            err += dx;
        }
        if cx0 > cx1 {
            break;
        }
    }

    while (cy0 - cy1) as i64 <= h {
        visit(true, cx0, cx1, cy0, cy1);
        cy0 += 1;
        cy1 -= 1;
    }
}

/// Perimeter of the ellipse inscribed in the box spanned by `a` and `b`.
pub fn ellipse_outline(a: Point, b: Point, mut emit: impl FnMut(i32, i32)) {
    let (x0, y0, x1, y1) = normalize(a, b);
    if ellipse_degenerate(x0, y0, x1, y1, &mut emit) {
        return;
    }

    walk_ellipse(x0, y0, x1, y1, |tip, cx0, cx1, cy0, cy1| {
        if tip {
            emit(cx0 - 1, cy0);
            emit(cx1 + 1, cy0);
            emit(cx0 - 1, cy1);
            emit(cx1 + 1, cy1);
            return;
        }
        emit(cx1, cy0);
        if cx0 != cx1 {
            emit(cx0, cy0);
        }
        if cy0 != cy1 {
            emit(cx0, cy1);
            if cx0 != cx1 {
                emit(cx1, cy1);
            }
        }
    });
}

/// Solid ellipse inscribed in the box spanned by `a` and `b`, as horizontal spans.
/// Always a superset of [`ellipse_outline`] for the same corners.
pub fn ellipse_filled(a: Point, b: Point, mut emit: impl FnMut(i32, i32)) {
    let (x0, y0, x1, y1) = normalize(a, b);
    if ellipse_degenerate(x0, y0, x1, y1, &mut emit) {
        return;
    }

    walk_ellipse(x0, y0, x1, y1, |tip, cx0, cx1, cy0, cy1| {
        if tip {
            emit(cx0 - 1, cy0);
            emit(cx1 + 1, cy0);
            if cy0 != cy1 {
                emit(cx0 - 1, cy1);
                emit(cx1 + 1, cy1);
            }
            return;
        }
        (cx0..=cx1).for_each(|x| emit(x, cy0));
        if cy0 != cy1 {
            (cx0..=cx1).for_each(|x| emit(x, cy1));
        }
    });
}

// ---------------------------------------------------------------------------
//  Aspect constraint
// ---------------------------------------------------------------------------

/// Move `end` so the box from `start` is square, using the larger extent.
/// Each axis keeps its direction; a zero delta counts as positive.
pub fn constrain_to_square(start: Point, end: Point) -> Point {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let size = dx.abs().max(dy.abs());
    let sign = |d: i32| if d < 0 { -1 } else { 1 };
    Point::new(start.x + size * sign(dx), start.y + size * sign(dy))
}

// ============================================================================
// Tests
// ============================================================================
