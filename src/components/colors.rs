use crate::canvas::Color;

// ============================================================================
// Hex / CSS conversions
// ============================================================================

/// `#rrggbb`, lowercase. Alpha is dropped.
pub fn rgba_to_hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

/// Parse `#rrggbb` or `rrggbb` (any case). Anything else yields opaque black.
/// The result is always fully opaque.
pub fn hex_to_rgba(hex: &str) -> Color {
    parse_hex(hex).unwrap_or(Color::BLACK)
}

/// Strict form of [`hex_to_rgba`]: `None` for malformed input.
pub fn parse_hex(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// CSS colour string: hex when opaque, otherwise `rgba(r, g, b, 0.xx)`.
pub fn rgba_to_css(color: Color) -> String {
    if color.a == 255 {
        return rgba_to_hex(color);
    }
    format!(
        "rgba({}, {}, {}, {:.2})",
        color.r,
        color.g,
        color.b,
        color.a as f64 / 255.0
    )
}

// ============================================================================
// Palette
// ============================================================================

/// Six rows of six: browns, reds/oranges, yellows/greens, teals/blues,
/// purples/pinks, greys.
pub const DEFAULT_PALETTE: [Color; 36] = [
    Color::rgb(101, 46, 31),
    Color::rgb(139, 69, 19),
    Color::rgb(160, 82, 45),
    Color::rgb(184, 115, 51),
    Color::rgb(210, 150, 75),
    Color::rgb(244, 196, 48),
    //
    Color::rgb(139, 0, 0),
    Color::rgb(178, 34, 34),
    Color::rgb(220, 60, 60),
    Color::rgb(255, 99, 71),
    Color::rgb(255, 140, 0),
    Color::rgb(255, 195, 0),
    //
    Color::rgb(255, 223, 0),
    Color::rgb(240, 230, 140),
    Color::rgb(154, 205, 50),
    Color::rgb(34, 139, 34),
    Color::rgb(0, 100, 0),
    Color::rgb(85, 107, 47),
    //
    Color::rgb(0, 128, 128),
    Color::rgb(64, 224, 208),
    Color::rgb(0, 191, 255),
    Color::rgb(30, 144, 255),
    Color::rgb(0, 0, 205),
    Color::rgb(25, 25, 112),
    //
    Color::rgb(75, 0, 130),
    Color::rgb(138, 43, 226),
    Color::rgb(186, 85, 211),
    Color::rgb(255, 20, 147),
    Color::rgb(255, 105, 180),
    Color::rgb(255, 182, 193),
    //
    Color::rgb(0, 0, 0),
    Color::rgb(64, 64, 64),
    Color::rgb(128, 128, 128),
    Color::rgb(192, 192, 192),
    Color::rgb(224, 224, 224),
    Color::rgb(255, 255, 255),
];

/// Swatch list plus the currently selected drawing colour.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
    pub selected: Color,
    /// When set, colours used by the pencil and fill tools are added automatically.
    pub auto_add: bool,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE.to_vec(),
            selected: Color::BLACK,
            auto_add: false,
        }
    }
}

impl Palette {
    pub fn from_colors(colors: Vec<Color>) -> Self {
        Self { colors, ..Self::default() }
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn contains(&self, color: Color) -> bool {
        self.colors.contains(&color)
    }

    /// Append `color` unless an exact RGBA match is already present.
    /// Returns whether it was added.
    pub fn add_color(&mut self, color: Color) -> bool {
        if self.contains(color) {
            return false;
        }
        self.colors.push(color);
        true
    }

    /// Remove the swatch at `index`; out-of-range indices are ignored.
    pub fn remove_color(&mut self, index: usize) -> Option<Color> {
        (index < self.colors.len()).then(|| self.colors.remove(index))
    }

    pub fn clear(&mut self) {
        self.colors.clear();
    }

    /// Restore the default swatches. Selection and `auto_add` are untouched.
    pub fn reset(&mut self) {
        self.colors = DEFAULT_PALETTE.to_vec();
    }

    /// Add every distinct non-transparent colour of a row-major RGBA8 image,
    /// in scan order. Returns the number of swatches added.
    pub fn extract_from_image(&mut self, pixels: &[u8], width: u32, height: u32) -> usize {
        let len = (width as usize * height as usize * 4).min(pixels.len());
        let before = self.colors.len();
        for px in pixels[..len].chunks_exact(4) {
            if px[3] == 0 {
                continue;
            }
            self.add_color(Color::rgba(px[0], px[1], px[2], px[3]));
        }
        self.colors.len() - before
    }

    /// Replace the swatch list wholesale (e.g. after loading a palette file).
    pub fn set_colors(&mut self, colors: Vec<Color>) {
        self.colors = colors;
    }
}
