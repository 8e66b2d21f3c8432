// ============================================================================
// FLOOD FILL - 4-connected seed fill with an explicit stack
// ============================================================================

use crate::canvas::{Color, PixelBuffer};

/// Fill the 4-connected region around `(start_x, start_y)` whose pixels
/// exactly match the seed's colour (all four channels) with `fill`.
///
/// `pixels` is row-major RGBA8 of size `width × height`. Iterative, so
/// region size is bounded by memory rather than call-stack depth. Returns the
/// number of pixels written; `0` when the seed is off-canvas or already
/// holds `fill`.
pub fn flood_fill(
    pixels: &mut [u8],
    width: u32,
    height: u32,
    start_x: i32,
    start_y: i32,
    fill: Color,
) -> usize {
    debug_assert_eq!(pixels.len(), width as usize * height as usize * 4);

    if start_x < 0 || start_y < 0 || start_x as u32 >= width || start_y as u32 >= height {
        return 0;
    }

    let w = width as usize;
    let h = height as usize;
    let seed = start_y as usize * w + start_x as usize;
    let target: [u8; 4] = [
        pixels[seed * 4],
        pixels[seed * 4 + 1],
        pixels[seed * 4 + 2],
        pixels[seed * 4 + 3],
    ];
    let fill_bytes = fill.to_bytes();
    if target == fill_bytes {
        return 0;
    }

    let mut visited = vec![false; w * h];
    let mut stack: Vec<(usize, usize)> = vec![(start_x as usize, start_y as usize)];
    let mut written = 0usize;

    // A candidate is pushed only if in-bounds, unvisited and still the target colour.
    let try_push = |stack: &mut Vec<(usize, usize)>, visited: &[bool], pixels: &[u8], x: usize, y: usize| {
        if x >= w || y >= h {
            return;
        }
        let vi = y * w + x;
        if visited[vi] || pixels[vi * 4..vi * 4 + 4] != target {
            return;
        }
        stack.push((x, y));
    };

    while let Some((x, y)) = stack.pop() {
        let vi = y * w + x;
        if visited[vi] {
            continue;
        }
        visited[vi] = true;
        pixels[vi * 4..vi * 4 + 4].copy_from_slice(&fill_bytes);
        written += 1;

        try_push(&mut stack, &visited, pixels, x + 1, y);
        if x > 0 {
            try_push(&mut stack, &visited, pixels, x - 1, y);
        }
        try_push(&mut stack, &visited, pixels, x, y + 1);
        if y > 0 {
            try_push(&mut stack, &visited, pixels, x, y - 1);
        }
    }

    written
}

/// [`flood_fill`] on a [`PixelBuffer`], bumping its version when anything changed.
pub fn flood_fill_buffer(buffer: &mut PixelBuffer, x: i32, y: i32, fill: Color) -> usize {
    let (w, h) = (buffer.width(), buffer.height());
    let written = flood_fill(buffer.pixels_mut(), w, h, x, y, fill);
    if written > 0 {
        buffer.bump_version();
    }
    written
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::PaintMode;

    const RED: Color = Color::rgb(255, 0, 0);
    const GREEN: Color = Color::rgb(0, 255, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    #[test]
    fn test_fills_whole_transparent_canvas() {
        let mut px = vec![0u8; 4 * 4 * 4];
        assert_eq!(flood_fill(&mut px, 4, 4, 0, 0, RED), 16);
        for chunk in px.chunks_exact(4) {
            assert_eq!(chunk, &[255, 0, 0, 255]);
        }
    }

    #[test]
    fn test_fill_from_corner() {
        let mut px = vec![0u8; 4 * 4 * 4];
        flood_fill(&mut px, 4, 4, 3, 3, GREEN);
        assert!(px.chunks_exact(4).all(|c| c == [0, 255, 0, 255]));
    }

    #[test]
    fn test_same_color_is_noop() {
        let mut buf = PixelBuffer::new(4, 4);
        for y in 0..4 {
            for x in 0..4 {
                buf.set_pixel(x, y, RED, PaintMode::Overwrite);
            }
        }
        let before = buf.snapshot();
        let v = buf.version();
        assert_eq!(flood_fill_buffer(&mut buf, 0, 0, RED), 0);
        assert_eq!(buf.pixels(), &before[..]);
        assert_eq!(buf.version(), v);
    }

    #[test]
    fn test_barrier_stops_fill() {
        let mut buf = PixelBuffer::new(4, 4);
        for y in 0..4 {
            buf.set_pixel(2, y, BLUE, PaintMode::Overwrite);
        }
        assert_eq!(flood_fill_buffer(&mut buf, 0, 0, RED), 8);
        for y in 0..4 {
            assert_eq!(buf.get_pixel(0, y), RED);
            assert_eq!(buf.get_pixel(1, y), RED);
            assert_eq!(buf.get_pixel(2, y), BLUE);
            assert_eq!(buf.get_pixel(3, y), Color::TRANSPARENT);
        }
    }

    #[test]
    fn test_single_pixel_canvas() {
        let mut px = vec![0u8; 4];
        flood_fill(&mut px, 1, 1, 0, 0, Color::rgb(128, 64, 32));
        assert_eq!(px, vec![128, 64, 32, 255]);
    }

    #[test]
    fn test_fill_with_transparent() {
        let mut px = [255u8, 0, 0, 255].repeat(4);
        flood_fill(&mut px, 2, 2, 0, 0, Color::TRANSPARENT);
        assert!(px.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_checkerboard_is_not_diagonally_connected() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.set_pixel(0, 0, RED, PaintMode::Overwrite);
        buf.set_pixel(1, 0, BLUE, PaintMode::Overwrite);
        buf.set_pixel(0, 1, BLUE, PaintMode::Overwrite);
        buf.set_pixel(1, 1, RED, PaintMode::Overwrite);

        assert_eq!(flood_fill_buffer(&mut buf, 0, 0, GREEN), 1);
        assert_eq!(buf.get_pixel(0, 0), GREEN);
        assert_eq!(buf.get_pixel(1, 0), BLUE);
        assert_eq!(buf.get_pixel(1, 1), RED);
    }

    #[test]
    fn test_off_canvas_seed_is_noop() {
        let mut buf = PixelBuffer::new(3, 3);
        assert_eq!(flood_fill_buffer(&mut buf, -1, 0, RED), 0);
        assert_eq!(flood_fill_buffer(&mut buf, 0, 3, RED), 0);
        assert!(buf.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_large_region_does_not_overflow() {
        // A serpentine corridor forces a very deep traversal.
        let (w, h) = (512u32, 512u32);
        let mut buf = PixelBuffer::new(w, h);
        for y in (1..h as i32).step_by(2) {
            let gap = if (y / 2) % 2 == 0 { w as i32 - 1 } else { 0 };
            for x in 0..w as i32 {
                if x != gap {
                    buf.set_pixel(x, y, BLUE, PaintMode::Overwrite);
                }
            }
        }
        let walls = buf.pixels().chunks_exact(4).filter(|c| *c == BLUE.to_bytes()).count();
        let written = flood_fill_buffer(&mut buf, 0, 0, RED);
        assert_eq!(written, (w * h) as usize - walls);
        assert_eq!(buf.get_pixel(0, h as i32 - 1), RED);
    }
}
