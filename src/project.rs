use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::canvas::{Color, PaintMode, PixelBuffer, Point, Symmetry};
use crate::components::colors::Palette;
use crate::components::history::HistoryManager;
use crate::components::tools::{self, StrokeMask, Tool, ToolProperties};
use crate::io::{self, IoError};
use crate::ops::fill;
use crate::ops::shapes::{self, ShapeFillMode, ShapeKind};
use crate::ops::transform;
use crate::settings::EditorSettings;

/// Pointer state between `pointer_down` and `pointer_up`.
#[derive(Clone, Debug)]
struct Stroke {
    start: Point,
    last: Point,
    end: Point,
    /// Cells painted so far; a freehand stroke composites each cell once.
    mask: StrokeMask,
}

/// Single open document: the pixel buffer plus everything that edits it.
pub struct Document {
    pub id: Uuid,
    pub canvas: PixelBuffer,
    pub history: HistoryManager,
    pub palette: Palette,
    pub tool: Tool,
    pub tool_properties: ToolProperties,
    pub symmetry: Symmetry,
    /// `None` for unsaved/untitled documents.
    pub path: Option<PathBuf>,
    pub is_dirty: bool,

    /// Display name (derived from path or "Untitled-X")
    pub name: String,

    stroke: Option<Stroke>,
}

impl Document {
    pub fn new(width: u32, height: u32) -> Self {
        Self::new_untitled(1, width, height)
    }

    pub fn new_untitled(untitled_counter: usize, width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            canvas: PixelBuffer::new(width, height),
            history: HistoryManager::default(),
            palette: Palette::default(),
            tool: Tool::default(),
            tool_properties: ToolProperties::default(),
            symmetry: Symmetry::NONE,
            path: None,
            is_dirty: false,
            name: format!("Untitled-{}", untitled_counter),
            stroke: None,
        }
    }

    pub fn from_buffer(path: PathBuf, canvas: PixelBuffer) -> Self {
        let mut doc = Self::new_untitled(1, 1, 1);
        doc.canvas = canvas;
        doc.path = Some(path);
        doc.update_name_from_path();
        doc
    }

    /// Decode an image file into a new document.
    pub fn open(path: &Path) -> Result<Self, IoError> {
        let canvas = io::load_image(path)?;
        Ok(Self::from_buffer(path.to_path_buf(), canvas))
    }

    /// Encode the canvas to `path`, adopt it as the document path and mark clean.
    pub fn save_as(&mut self, path: &Path) -> Result<(), IoError> {
        io::save_image(&self.canvas, path)?;
        self.path = Some(path.to_path_buf());
        self.update_name_from_path();
        self.mark_clean();
        Ok(())
    }

    /// Apply persisted preferences (history depth, brush, paint mode, symmetry,
    /// palette auto-add).
    pub fn with_settings(mut self, settings: &EditorSettings) -> Self {
        self.history.set_max_history_size(settings.max_undo_steps);
        self.tool_properties.brush_shape = settings.brush_shape;
        self.tool_properties.set_brush_size(settings.brush_size);
        self.tool_properties.paint_mode = settings.paint_mode;
        self.symmetry = Symmetry {
            horizontal: settings.symmetry_horizontal,
            vertical: settings.symmetry_vertical,
        };
        self.palette.auto_add = settings.auto_add_colors;
        self
    }

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.is_dirty = false;
    }

    pub fn update_name_from_path(&mut self) {
        if let Some(ref path) = self.path {
            self.name = path
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "Unknown".to_string());
        }
    }

    /// Get the display title (name with dirty indicator)
    pub fn display_title(&self) -> String {
        if self.is_dirty {
            format!("{}*", self.name)
        } else {
            self.name.clone()
        }
    }

    // ---- whole-document replacement ----------------------------------------

    /// Fresh transparent canvas; prior history is discarded.
    pub fn create_new(&mut self, width: u32, height: u32) {
        self.stroke = None;
        self.canvas.create_new(width, height);
        self.history.clear();
        self.is_dirty = false;
    }

    /// Replace the canvas with loaded pixels; prior history is discarded.
    /// Panics if `data.len() != width * height * 4`.
    pub fn load_image_data(&mut self, data: &[u8], width: u32, height: u32) {
        self.stroke = None;
        self.canvas.set_image_data(data, width, height);
        self.history.clear();
        self.is_dirty = false;
    }

    // ---- history ------------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        self.stroke = None;
        let changed = self.history.undo(&mut self.canvas);
        if changed {
            self.mark_dirty();
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        self.stroke = None;
        let changed = self.history.redo(&mut self.canvas);
        if changed {
            self.mark_dirty();
        }
        changed
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ---- transforms ---------------------------------------------------------

    pub fn flip_horizontal(&mut self) {
        self.transform("flip horizontal", transform::flip_horizontal);
    }

    pub fn flip_vertical(&mut self) {
        self.transform("flip vertical", transform::flip_vertical);
    }

    /// Rotate 90° clockwise.
    pub fn rotate_90(&mut self) {
        self.transform("rotate 90°", transform::rotate_90cw);
    }

    pub fn rotate_180(&mut self) {
        self.transform("rotate 180°", transform::rotate_180);
    }

    /// Rotate 270° clockwise (90° counter-clockwise).
    pub fn rotate_270(&mut self) {
        self.transform("rotate 270°", transform::rotate_90ccw);
    }

    fn transform(&mut self, label: &str, op: fn(&mut PixelBuffer)) {
        self.stroke = None;
        self.history.push_state(&self.canvas);
        let (w, h) = (self.canvas.width(), self.canvas.height());
        op(&mut self.canvas);
        self.mark_dirty();
        crate::log_info!(
            "Transform: {} ({}×{} -> {}×{})",
            label,
            w,
            h,
            self.canvas.width(),
            self.canvas.height()
        );
    }

    // ---- direct drawing (each call is one undo step) --------------------------

    /// Flood fill at `p` with `color`. Off-canvas points do nothing and record
    /// no history. Returns the number of pixels changed.
    pub fn fill_at(&mut self, p: Point, color: Color) -> usize {
        if !self.canvas.in_bounds(p.x, p.y) {
            return 0;
        }
        self.history.push_state(&self.canvas);
        self.mark_dirty();
        fill::flood_fill_buffer(&mut self.canvas, p.x, p.y, color)
    }

    /// Rasterize a shape from `a` to `b` in `color` with the current brush,
    /// paint mode and symmetry.
    pub fn draw_shape(
        &mut self,
        kind: ShapeKind,
        fill_mode: ShapeFillMode,
        a: Point,
        b: Point,
        color: Color,
    ) {
        self.history.push_state(&self.canvas);
        self.paint_shape(kind, fill_mode, a, b, color);
    }

    fn paint_shape(&mut self, kind: ShapeKind, fill_mode: ShapeFillMode, a: Point, b: Point, color: Color) {
        let offsets = self.tool_properties.offsets();
        let mode = self.tool_properties.paint_mode;
        let symmetry = self.symmetry;
        let mut mask = StrokeMask::for_buffer(&self.canvas);
        let canvas = &mut self.canvas;
        shapes::rasterize_shape(kind, fill_mode, a, b, |x, y| {
            tools::stamp(canvas, Point::new(x, y), color, mode, &offsets, symmetry, &mut mask);
        });
        self.mark_dirty();
    }

    // ---- pointer-driven tool dispatch -----------------------------------------

    /// Switch tools, abandoning any stroke in progress.
    pub fn select_tool(&mut self, tool: Tool) {
        self.stroke = None;
        self.tool = tool;
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    /// Begin a stroke at `p`. Every tool except the eyedropper snapshots the
    /// canvas first, so the whole stroke undoes as one step. Presses outside
    /// the canvas are ignored.
    pub fn pointer_down(&mut self, p: Point) {
        self.stroke = None;
        if !self.canvas.in_bounds(p.x, p.y) {
            return;
        }

        if self.tool.modifies_canvas() {
            self.history.push_state(&self.canvas);
        }

        let mut stroke = Stroke {
            start: p,
            last: p,
            end: p,
            mask: StrokeMask::for_buffer(&self.canvas),
        };
        match self.tool {
            Tool::Pencil | Tool::Eraser => self.dab(p, &mut stroke.mask),
            Tool::Fill => {
                let color = self.palette.selected;
                fill::flood_fill_buffer(&mut self.canvas, p.x, p.y, color);
                self.mark_dirty();
                if self.palette.auto_add {
                    self.palette.add_color(color);
                }
            }
            Tool::Eyedropper => {
                let sampled = self.canvas.get_pixel(p.x, p.y);
                if sampled.a > 0 {
                    self.palette.selected = sampled;
                }
            }
            Tool::Line | Tool::Rectangle | Tool::Ellipse => {}
        }
        self.stroke = Some(stroke);
    }

    /// Continue the active stroke. Fill and eyedropper ignore motion.
    pub fn pointer_move(&mut self, p: Point) {
        if !self.tool.tracks_motion() {
            return;
        }
        let Some(mut stroke) = self.stroke.take() else { return };

        if self.tool.is_freehand() {
            let (color, mode) = self.brush_paint();
            let offsets = self.tool_properties.offsets();
            let symmetry = self.symmetry;
            let canvas = &mut self.canvas;
            let mask = &mut stroke.mask;
            shapes::bresenham_line(
                stroke.last,
                p,
                |x, y| tools::stamp(canvas, Point::new(x, y), color, mode, &offsets, symmetry, mask),
                true,
            );
            self.after_freehand();
            stroke.last = p;
        }
        stroke.end = p;
        self.stroke = Some(stroke);
    }

    /// Finish the stroke. Shape tools commit from the stroke start to `p`;
    /// other tools only end the stroke.
    pub fn pointer_up(&mut self, p: Point) {
        let Some(stroke) = self.stroke.take() else { return };

        if let Some(kind) = self.tool.shape_kind() {
            let end = self.shape_end(kind, stroke.start, p);
            let color = self.palette.selected;
            let fill_mode = self.tool_properties.shape_fill;
            self.paint_shape(kind, fill_mode, stroke.start, end, color);
        }
    }

    /// Abandon the stroke without committing a pending shape. Pixels already
    /// painted stay (undo removes them).
    pub fn cancel_stroke(&mut self) {
        self.stroke = None;
    }

    /// Canvas pixels the active shape would touch if released at `end`,
    /// after brush and symmetry expansion. Sorted row-major, no duplicates.
    /// Empty when no shape stroke is active.
    pub fn shape_preview(&self, end: Point) -> Vec<Point> {
        let (Some(stroke), Some(kind)) = (&self.stroke, self.tool.shape_kind()) else {
            return Vec::new();
        };
        let end = self.shape_end(kind, stroke.start, end);
        let offsets = self.tool_properties.offsets();
        let (w, h) = (self.canvas.width(), self.canvas.height());

        let mut out = Vec::new();
        shapes::rasterize_shape(kind, self.tool_properties.shape_fill, stroke.start, end, |x, y| {
            for s in self.symmetry.points(x, y, w, h).iter() {
                for o in &offsets {
                    let q = Point::new(s.x + o.x, s.y + o.y);
                    if self.canvas.in_bounds(q.x, q.y) {
                        out.push(q);
                    }
                }
            }
        });
        out.sort_by_key(|q| (q.y, q.x));
        out.dedup();
        out
    }

    fn shape_end(&self, kind: ShapeKind, start: Point, end: Point) -> Point {
        if self.tool_properties.constrain_square && kind.supports_square_constraint() {
            shapes::constrain_to_square(start, end)
        } else {
            end
        }
    }

    /// Colour and mode for freehand tools: the eraser always overwrites with
    /// transparent black.
    fn brush_paint(&self) -> (Color, PaintMode) {
        match self.tool {
            Tool::Eraser => (Color::TRANSPARENT, PaintMode::Overwrite),
            _ => (self.palette.selected, self.tool_properties.paint_mode),
        }
    }

    fn dab(&mut self, p: Point, mask: &mut StrokeMask) {
        let (color, mode) = self.brush_paint();
        let offsets = self.tool_properties.offsets();
        tools::stamp(&mut self.canvas, p, color, mode, &offsets, self.symmetry, mask);
        self.after_freehand();
    }

    fn after_freehand(&mut self) {
        self.mark_dirty();
        if self.tool == Tool::Pencil && self.palette.auto_add {
            let color = self.palette.selected;
            self.palette.add_color(color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);

    fn doc(w: u32, h: u32) -> Document {
        let mut d = Document::new(w, h);
        d.palette.selected = RED;
        d
    }

    #[test]
    fn test_new_document() {
        let d = Document::new_untitled(3, 8, 4);
        assert_eq!(d.name, "Untitled-3");
        assert_eq!((d.canvas.width(), d.canvas.height()), (8, 4));
        assert!(!d.is_dirty);
        assert!(!d.can_undo());
        assert_eq!(d.display_title(), "Untitled-3");
        assert_ne!(d.id, Document::new(1, 1).id);
    }

    #[test]
    fn test_pencil_stroke_is_one_undo_step() {
        let mut d = doc(8, 8);
        d.pointer_down(Point::new(0, 0));
        d.pointer_move(Point::new(3, 0));
        d.pointer_move(Point::new(3, 3));
        d.pointer_up(Point::new(3, 3));

        for x in 0..=3 {
            assert_eq!(d.canvas.get_pixel(x, 0), RED);
        }
        for y in 0..=3 {
            assert_eq!(d.canvas.get_pixel(3, y), RED);
        }
        assert_eq!(d.history.undo_count(), 1);
        assert!(d.is_dirty);

        assert!(d.undo());
        assert!(d.canvas.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_move_without_down_is_ignored() {
        let mut d = doc(4, 4);
        d.pointer_move(Point::new(1, 1));
        d.pointer_up(Point::new(1, 1));
        assert!(d.canvas.pixels().iter().all(|&b| b == 0));
        assert!(!d.can_undo());
    }

    #[test]
    fn test_eraser_clears_to_transparent() {
        let mut d = doc(4, 4);
        d.fill_at(Point::new(0, 0), RED);
        d.tool_properties.paint_mode = PaintMode::Blend;
        d.select_tool(Tool::Eraser);
        d.pointer_down(Point::new(1, 1));
        d.pointer_up(Point::new(1, 1));
        assert_eq!(d.canvas.get_pixel(1, 1), Color::TRANSPARENT);
        assert_eq!(d.canvas.get_pixel(0, 0), RED);
    }

    #[test]
    fn test_fill_tool_ignores_motion() {
        let mut d = doc(4, 4);
        d.select_tool(Tool::Fill);
        d.pointer_down(Point::new(0, 0));
        let v = d.canvas.version();
        d.pointer_move(Point::new(3, 3));
        d.pointer_up(Point::new(3, 3));
        assert_eq!(d.canvas.version(), v);
        assert!(d.canvas.pixels().chunks_exact(4).all(|c| c == RED.to_bytes()));
        assert_eq!(d.history.undo_count(), 1);
    }

    #[test]
    fn test_eyedropper_skips_transparent_and_history() {
        let mut d = doc(4, 4);
        d.canvas.set_pixel(2, 2, Color::rgba(1, 2, 3, 4), PaintMode::Overwrite);
        d.select_tool(Tool::Eyedropper);

        d.pointer_down(Point::new(0, 0));
        d.pointer_up(Point::new(0, 0));
        assert_eq!(d.palette.selected, RED);

        d.pointer_down(Point::new(2, 2));
        d.pointer_up(Point::new(2, 2));
        assert_eq!(d.palette.selected, Color::rgba(1, 2, 3, 4));
        assert!(!d.can_undo());
    }

    #[test]
    fn test_rectangle_commits_on_release() {
        let mut d = doc(6, 6);
        d.select_tool(Tool::Rectangle);
        d.pointer_down(Point::new(1, 1));
        d.pointer_move(Point::new(3, 3));
        assert!(d.canvas.pixels().iter().all(|&b| b == 0));

        let preview = d.shape_preview(Point::new(3, 3));
        assert_eq!(preview.len(), 8);

        d.pointer_up(Point::new(3, 3));
        let painted: Vec<Point> = (0..6)
            .flat_map(|y| (0..6).map(move |x| Point::new(x, y)))
            .filter(|p| d.canvas.get_pixel(p.x, p.y) == RED)
            .collect();
        assert_eq!(painted, preview);
        assert_eq!(d.canvas.get_pixel(2, 2), Color::TRANSPARENT);
    }

    #[test]
    fn test_cancel_drops_pending_shape() {
        let mut d = doc(6, 6);
        d.select_tool(Tool::Ellipse);
        d.pointer_down(Point::new(0, 0));
        d.pointer_move(Point::new(4, 4));
        d.cancel_stroke();
        d.pointer_up(Point::new(4, 4));
        assert!(d.canvas.pixels().iter().all(|&b| b == 0));
        assert!(d.shape_preview(Point::new(4, 4)).is_empty());
    }

    #[test]
    fn test_square_constraint_skips_lines() {
        let mut d = doc(8, 8);
        d.tool_properties.constrain_square = true;
        d.select_tool(Tool::Rectangle);
        d.pointer_down(Point::new(0, 0));
        d.pointer_up(Point::new(4, 2));
        assert_eq!(d.canvas.get_pixel(4, 4), RED);

        let mut d = doc(8, 8);
        d.tool_properties.constrain_square = true;
        d.select_tool(Tool::Line);
        d.pointer_down(Point::new(0, 0));
        d.pointer_up(Point::new(4, 0));
        assert_eq!(d.canvas.get_pixel(4, 0), RED);
        assert_eq!(d.canvas.get_pixel(4, 4), Color::TRANSPARENT);
    }

    #[test]
    fn test_auto_add_palette() {
        let mut d = doc(4, 4);
        let custom = Color::rgb(12, 34, 56);
        d.palette.selected = custom;
        d.pointer_down(Point::new(0, 0));
        d.pointer_up(Point::new(0, 0));
        assert!(!d.palette.contains(custom));

        d.palette.auto_add = true;
        d.pointer_down(Point::new(1, 1));
        d.pointer_up(Point::new(1, 1));
        assert!(d.palette.contains(custom));
    }

    #[test]
    fn test_symmetric_pencil() {
        let mut d = doc(5, 5);
        d.symmetry = Symmetry::BOTH;
        d.pointer_down(Point::new(0, 0));
        d.pointer_up(Point::new(0, 0));
        for (x, y) in [(0, 0), (4, 0), (0, 4), (4, 4)] {
            assert_eq!(d.canvas.get_pixel(x, y), RED);
        }
    }

    #[test]
    fn test_transforms_push_history() {
        let mut d = doc(3, 2);
        d.canvas.set_pixel(0, 0, RED, PaintMode::Overwrite);
        d.rotate_90();
        assert_eq!((d.canvas.width(), d.canvas.height()), (2, 3));
        assert_eq!(d.canvas.get_pixel(1, 0), RED);
        d.rotate_270();
        d.flip_horizontal();
        d.flip_vertical();
        d.rotate_180();
        assert_eq!(d.history.undo_count(), 5);
        assert_eq!(d.canvas.get_pixel(0, 0), RED);
    }

    #[test]
    fn test_load_and_create_clear_history() {
        let mut d = doc(2, 2);
        d.flip_horizontal();
        assert!(d.can_undo());

        d.load_image_data(&[9u8; 12], 3, 1);
        assert!(!d.can_undo());
        assert_eq!(d.canvas.get_pixel(2, 0), Color::rgba(9, 9, 9, 9));

        d.flip_vertical();
        d.create_new(5, 5);
        assert!(!d.can_undo() && !d.can_redo());
        assert_eq!(d.canvas.width(), 5);
        assert!(!d.is_dirty);
    }

    #[test]
    fn test_with_settings() {
        let settings = EditorSettings {
            max_undo_steps: 2,
            brush_size: 3,
            symmetry_vertical: true,
            auto_add_colors: true,
            ..EditorSettings::default()
        };
        let mut d = Document::new(4, 4).with_settings(&settings);
        assert_eq!(d.tool_properties.brush_size, 3);
        assert!(d.symmetry.vertical && !d.symmetry.horizontal);
        assert!(d.palette.auto_add);

        for _ in 0..5 {
            d.flip_horizontal();
        }
        assert_eq!(d.history.undo_count(), 2);
    }

    #[test]
    fn test_off_canvas_fill_is_noop() {
        let mut d = doc(2, 2);
        assert_eq!(d.fill_at(Point::new(5, 5), RED), 0);
        assert!(!d.can_undo());
        assert!(!d.is_dirty);
    }
    #[test]
    fn test_blend_stroke_composites_each_pixel_once() {
        let mut d = doc(16, 9);
        d.palette.selected = Color::rgba(255, 0, 0, 128);
        d.tool_properties.paint_mode = PaintMode::Blend;
        d.tool_properties.set_brush_size(3);
        d.pointer_down(Point::new(2, 4));
        d.pointer_move(Point::new(12, 4));
        d.pointer_up(Point::new(12, 4));

        let row: Vec<u8> = (0..16).map(|x| d.canvas.get_pixel(x, 4).a).collect();
        assert_eq!(row, [0, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 0, 0]);
        let once = crate::canvas::blend_over(Color::TRANSPARENT, d.palette.selected);
        for y in 3..=5 {
            for x in 1..=13 {
                assert_eq!(d.canvas.get_pixel(x, y), once, "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_blend_stroke_back_over_itself() {
        let mut d = doc(8, 3);
        d.palette.selected = Color::rgba(0, 255, 0, 60);
        d.tool_properties.paint_mode = PaintMode::Blend;
        d.pointer_down(Point::new(0, 1));
        d.pointer_move(Point::new(7, 1));
        d.pointer_move(Point::new(0, 1));
        d.pointer_up(Point::new(0, 1));
        for x in 0..8 {
            assert_eq!(d.canvas.get_pixel(x, 1).a, 60, "x = {}", x);
        }
    }

    #[test]
    fn test_separate_blend_strokes_accumulate() {
        let mut d = doc(3, 1);
        d.palette.selected = Color::rgba(0, 0, 0, 128);
        d.tool_properties.paint_mode = PaintMode::Blend;
        for _ in 0..2 {
            d.pointer_down(Point::new(1, 0));
            d.pointer_up(Point::new(1, 0));
        }
        assert_eq!(d.canvas.get_pixel(1, 0).a, 192);
    }

    #[test]
    fn test_blend_ellipse_has_uniform_alpha() {
        for fill_mode in [ShapeFillMode::Outline, ShapeFillMode::Filled] {
            let mut d = doc(40, 16);
            d.tool_properties.paint_mode = PaintMode::Blend;
            d.draw_shape(
                ShapeKind::Ellipse,
                fill_mode,
                Point::new(0, 0),
                Point::new(38, 14),
                Color::rgba(10, 20, 30, 100),
            );
            let alphas: std::collections::BTreeSet<u8> =
                d.canvas.pixels().chunks_exact(4).map(|px| px[3]).collect();
            assert_eq!(alphas.into_iter().collect::<Vec<_>>(), vec![0, 100], "{:?}", fill_mode);
        }
    }

    #[test]
    fn test_pointer_down_off_canvas_is_ignored() {
        let mut d = doc(4, 4);
        d.palette.auto_add = true;
        let palette_len = d.palette.len();
        let blue = Color::rgb(1, 2, 250);
        d.palette.selected = blue;

        d.select_tool(Tool::Fill);
        d.pointer_down(Point::new(-1, 2));
        assert!(!d.is_drawing());
        assert!(!d.palette.contains(blue));
        assert_eq!(d.palette.len(), palette_len);

        d.select_tool(Tool::Pencil);
        d.pointer_down(Point::new(9, 0));
        d.pointer_move(Point::new(0, 0));
        d.pointer_up(Point::new(0, 0));
        assert!(d.canvas.pixels().iter().all(|&b| b == 0));
        assert!(!d.can_undo());
        assert!(!d.is_dirty);
    }
}
