// ============================================================================
// COMPONENTS MODULE - editor state that sits around the pixel buffer
// ============================================================================
//
// Architecture:
//   tools.rs   - tool enum, brush offsets, tool properties, brush stamping
//   history.rs - bounded full-snapshot undo/redo
//   colors.rs  - palette store and hex/CSS colour conversions
// ============================================================================

pub mod colors;
pub mod history;
pub mod tools;

pub use colors::Palette;
pub use history::{HistoryEntry, HistoryManager};
pub use tools::{BrushShape, Tool, ToolProperties};
