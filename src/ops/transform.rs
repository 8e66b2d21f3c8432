// ============================================================================
// TRANSFORM OPERATIONS - whole-canvas flips and quarter-turn rotations
// ============================================================================

use rayon::prelude::*;

use crate::canvas::PixelBuffer;

/// Mirror left↔right in place.
pub fn flip_horizontal(buffer: &mut PixelBuffer) {
    let row_bytes = buffer.width() as usize * 4;
    buffer.pixels_mut().par_chunks_mut(row_bytes).for_each(|row| {
        let w = row.len() / 4;
        for x in 0..w / 2 {
            let (l, r) = (x * 4, (w - 1 - x) * 4);
            for c in 0..4 {
                row.swap(l + c, r + c);
            }
        }
    });
    buffer.bump_version();
}

/// Mirror top↔bottom in place.
pub fn flip_vertical(buffer: &mut PixelBuffer) {
    let row_bytes = buffer.width() as usize * 4;
    let h = buffer.height() as usize;
    let pixels = buffer.pixels_mut();
    for y in 0..h / 2 {
        let (top, bottom) = pixels.split_at_mut((h - 1 - y) * row_bytes);
        top[y * row_bytes..(y + 1) * row_bytes].swap_with_slice(&mut bottom[..row_bytes]);
    }
    buffer.bump_version();
}

/// Rotate 90° clockwise. A `W×H` buffer becomes `H×W`; source `(x, y)`
/// lands at `(H-1-y, x)`.
pub fn rotate_90cw(buffer: &mut PixelBuffer) {
    let (w, h) = (buffer.width() as usize, buffer.height() as usize);
    let src = buffer.pixels();
    let mut dst = vec![0u8; src.len()];
    // Destination is h wide, w tall.
    dst.par_chunks_mut(h * 4).enumerate().for_each(|(dy, row)| {
        for dx in 0..h {
            let (sx, sy) = (dy, h - 1 - dx);
            let si = (sy * w + sx) * 4;
            row[dx * 4..dx * 4 + 4].copy_from_slice(&src[si..si + 4]);
        }
    });
    buffer.replace(dst, h as u32, w as u32);
}

/// Rotate 180°. Dimensions are unchanged; `(x, y)` lands at `(W-1-x, H-1-y)`.
pub fn rotate_180(buffer: &mut PixelBuffer) {
    // Reversing pixel order is exactly a half turn.
    let pixels = buffer.pixels_mut();
    let n = pixels.len() / 4;
    for i in 0..n / 2 {
        let (a, b) = (i * 4, (n - 1 - i) * 4);
        for c in 0..4 {
            pixels.swap(a + c, b + c);
        }
    }
    buffer.bump_version();
}

/// Rotate 90° counter-clockwise (270° clockwise). A `W×H` buffer becomes
/// `H×W`; source `(x, y)` lands at `(y, W-1-x)`.
pub fn rotate_90ccw(buffer: &mut PixelBuffer) {
    let (w, h) = (buffer.width() as usize, buffer.height() as usize);
    let src = buffer.pixels();
    let mut dst = vec![0u8; src.len()];
    dst.par_chunks_mut(h * 4).enumerate().for_each(|(dy, row)| {
        for dx in 0..h {
            let (sx, sy) = (w - 1 - dy, dx);
            let si = (sy * w + sx) * 4;
            row[dx * 4..dx * 4 + 4].copy_from_slice(&src[si..si + 4]);
        }
    });
    buffer.replace(dst, h as u32, w as u32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Color, PaintMode};

    /// 3×2 buffer where every pixel is unique: r = x, g = y.
    fn numbered(w: u32, h: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(w, h);
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                buf.set_pixel(x, y, Color::rgba(x as u8, y as u8, 7, 255), PaintMode::Overwrite);
            }
        }
        buf
    }

    #[test]
    fn test_rotate_90cw_mapping() {
        let src = numbered(3, 2);
        let mut buf = src.clone();
        rotate_90cw(&mut buf);
        assert_eq!((buf.width(), buf.height()), (2, 3));
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(buf.get_pixel(2 - 1 - y, x), src.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn test_rotate_90ccw_mapping() {
        let src = numbered(3, 2);
        let mut buf = src.clone();
        rotate_90ccw(&mut buf);
        assert_eq!((buf.width(), buf.height()), (2, 3));
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(buf.get_pixel(y, 3 - 1 - x), src.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn test_rotate_180_mapping() {
        let src = numbered(3, 2);
        let mut buf = src.clone();
        rotate_180(&mut buf);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(buf.get_pixel(2 - x, 1 - y), src.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn test_four_quarter_turns_is_identity() {
        let src = numbered(5, 3);
        let mut buf = src.clone();
        for _ in 0..4 {
            rotate_90cw(&mut buf);
        }
        assert_eq!(buf.pixels(), src.pixels());
        assert_eq!((buf.width(), buf.height()), (5, 3));
    }

    #[test]
    fn test_cw_then_ccw_is_identity() {
        let src = numbered(4, 7);
        let mut buf = src.clone();
        rotate_90cw(&mut buf);
        rotate_90ccw(&mut buf);
        assert_eq!(buf.pixels(), src.pixels());
    }

    #[test]
    fn test_two_cw_equals_180() {
        let src = numbered(4, 3);
        let mut a = src.clone();
        rotate_90cw(&mut a);
        rotate_90cw(&mut a);
        let mut b = src.clone();
        rotate_180(&mut b);
        assert_eq!(a.pixels(), b.pixels());
    }

    #[test]
    fn test_flips_are_involutions() {
        let src = numbered(5, 4);
        let mut buf = src.clone();
        flip_horizontal(&mut buf);
        assert_ne!(buf.pixels(), src.pixels());
        flip_horizontal(&mut buf);
        assert_eq!(buf.pixels(), src.pixels());

        flip_vertical(&mut buf);
        assert_ne!(buf.pixels(), src.pixels());
        flip_vertical(&mut buf);
        assert_eq!(buf.pixels(), src.pixels());
    }

    #[test]
    fn test_flip_h_then_v_equals_180() {
        let src = numbered(3, 3);
        let mut a = src.clone();
        flip_horizontal(&mut a);
        flip_vertical(&mut a);
        let mut b = src.clone();
        rotate_180(&mut b);
        assert_eq!(a.pixels(), b.pixels());
    }

    #[test]
    fn test_flip_horizontal_mapping() {
        let src = numbered(3, 2);
        let mut buf = src.clone();
        flip_horizontal(&mut buf);
        assert_eq!(buf.get_pixel(0, 0), src.get_pixel(2, 0));
        assert_eq!(buf.get_pixel(1, 1), src.get_pixel(1, 1));
    }

    #[test]
    fn test_transforms_bump_version() {
        let mut buf = numbered(2, 2);
        let v = buf.version();
        flip_vertical(&mut buf);
        rotate_90cw(&mut buf);
        assert!(buf.version() > v + 1);
    }

    #[test]
    fn test_single_pixel_is_stable() {
        let mut buf = PixelBuffer::new(1, 1);
        buf.set_pixel(0, 0, Color::WHITE, PaintMode::Overwrite);
        rotate_90cw(&mut buf);
        rotate_180(&mut buf);
        flip_horizontal(&mut buf);
        assert_eq!(buf.get_pixel(0, 0), Color::WHITE);
    }
}
