// ============================================================================
// OPS MODULE - pixel-level drawing operations on a single PixelBuffer
// ============================================================================
//
// Architecture:
//   shapes.rs    - Bresenham lines, rectangles, midpoint ellipses
//   fill.rs      - 4-connected flood fill with an explicit work stack
//   transform.rs - whole-canvas flips and quarter-turn rotations
// ============================================================================

pub mod fill;
pub mod shapes;
pub mod transform;

pub use fill::{flood_fill, flood_fill_buffer};
pub use shapes::{ShapeFillMode, ShapeKind};
