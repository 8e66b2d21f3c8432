use std::path::{Path, PathBuf};

use crate::canvas::PaintMode;
use crate::components::history::DEFAULT_MAX_HISTORY;
use crate::components::tools::{BrushShape, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE};

/// Largest canvas side accepted from the settings file.
pub const MAX_CANVAS_SIDE: u32 = 16384;

/// Editor preferences that persist across sessions.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorSettings {
    /// Maximum number of undo steps
    pub max_undo_steps: usize,
    /// Size of a fresh canvas
    pub default_width: u32,
    pub default_height: u32,
    pub brush_shape: BrushShape,
    pub brush_size: u32,
    pub paint_mode: PaintMode,
    pub symmetry_horizontal: bool,
    pub symmetry_vertical: bool,
    /// Add pencil and fill colours to the palette automatically
    pub auto_add_colors: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            max_undo_steps: DEFAULT_MAX_HISTORY,
            default_width: 32,
            default_height: 32,
            brush_shape: BrushShape::Square,
            brush_size: 1,
            paint_mode: PaintMode::Overwrite,
            symmetry_horizontal: false,
            symmetry_vertical: false,
            auto_add_colors: false,
        }
    }
}

impl EditorSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/pexler/pexler_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\Pexler\pexler_settings.cfg
    /// On macOS:   ~/Library/Application Support/Pexler/pexler_settings.cfg
    /// Fallback:   same directory as the executable.
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                    PathBuf::from(home).join(".config")
                })
                .join("pexler");
            return Some(config_dir.join("pexler_settings.cfg"));
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA")
                .or_else(|_| std::env::var("USERPROFILE"))
                .ok()?;
            return Some(PathBuf::from(appdata).join("Pexler").join("pexler_settings.cfg"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").ok()?;
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("Pexler")
                    .join("pexler_settings.cfg"),
            );
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join("pexler_settings.cfg")))
        }
    }

    /// Serialize as `key=value` lines.
    pub fn to_config_string(&self) -> String {
        format!(
            "max_undo_steps={}\n\
             default_width={}\n\
             default_height={}\n\
             brush_shape={}\n\
             brush_size={}\n\
             paint_mode={}\n\
             symmetry_horizontal={}\n\
             symmetry_vertical={}\n\
             auto_add_colors={}\n",
            self.max_undo_steps,
            self.default_width,
            self.default_height,
            self.brush_shape.name(),
            self.brush_size,
            self.paint_mode.name(),
            self.symmetry_horizontal,
            self.symmetry_vertical,
            self.auto_add_colors,
        )
    }

    /// Parse `key=value` lines. Unknown keys, blank lines, `#` comments and
    /// out-of-range values are skipped, leaving the default in place.
    pub fn parse(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else { continue };
            let key = key.trim();
            let val = val.trim();
            match key {
                "max_undo_steps" => {
                    if let Ok(n) = val.parse::<usize>()
                        && n >= 1
                    {
                        s.max_undo_steps = n;
                    }
                }
                "default_width" => {
                    if let Some(n) = parse_side(val) {
                        s.default_width = n;
                    }
                }
                "default_height" => {
                    if let Some(n) = parse_side(val) {
                        s.default_height = n;
                    }
                }
                "brush_shape" => {
                    if let Some(shape) = BrushShape::from_name(val) {
                        s.brush_shape = shape;
                    }
                }
                "brush_size" => {
                    if let Ok(n) = val.parse::<u32>()
                        && (MIN_BRUSH_SIZE..=MAX_BRUSH_SIZE).contains(&n)
                    {
                        s.brush_size = n;
                    }
                }
                "paint_mode" => {
                    if let Some(mode) = PaintMode::from_name(val) {
                        s.paint_mode = mode;
                    }
                }
                "symmetry_horizontal" => {
                    if let Some(b) = parse_bool(val) {
                        s.symmetry_horizontal = b;
                    }
                }
                "symmetry_vertical" => {
                    if let Some(b) = parse_bool(val) {
                        s.symmetry_vertical = b;
                    }
                }
                "auto_add_colors" => {
                    if let Some(b) = parse_bool(val) {
                        s.auto_add_colors = b;
                    }
                }
                _ => {}
            }
        }
        s
    }

    /// Load from `path`. A missing file is silent; an unreadable one is logged.
    /// Either way the defaults are returned.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                crate::log_warn!("Settings: could not read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_config_string())
    }

    /// Load from the platform settings path (defaults if unavailable).
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Save to the platform settings path. Failures are logged, not returned.
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        if let Err(e) = self.save_to(&path) {
            crate::log_err!("Settings: could not write {}: {}", path.display(), e);
        }
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val {
        "true" | "1" | "on" => Some(true),
        "false" | "0" | "off" => Some(false),
        _ => None,
    }
}

fn parse_side(val: &str) -> Option<u32> {
    val.parse::<u32>()
        .ok()
        .filter(|n| (1..=MAX_CANVAS_SIDE).contains(n))
}
