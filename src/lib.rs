// ============================================================================
// PEXLER - pixel-art editing core
// ============================================================================
//
// Module layout:
//   canvas     - RGBA pixel buffer, colours, alpha blending, symmetry points
//   ops        - shape rasterizers, flood fill, flips and rotations
//   components - tools and brushes, undo/redo history, palette
//   project    - `Document`, the session object that dispatches tool input
//   settings   - persisted editor preferences
//   io         - image and palette files
//   logger     - session log and `log_*!` macros
//   cli        - headless batch front end used by the `pexler` binary
// ============================================================================

pub mod logger;

pub mod canvas;
pub mod cli;
pub mod components;
pub mod io;
pub mod ops;
pub mod project;
pub mod settings;

pub use canvas::{Color, PaintMode, PixelBuffer, Point, Symmetry};
pub use components::{BrushShape, HistoryManager, Palette, Tool, ToolProperties};
pub use project::Document;
pub use settings::EditorSettings;
