use std::fs;
use std::path::Path;

use include_dir::{Dir, include_dir};
use ratatui::style::Color;
use serde::Deserialize;

static EMBEDDED_PALETTES: Dir = include_dir!("$CARGO_MANIFEST_DIR/palettes");

/// Chrome colors for the menu bar, overlays and status bar.
#[derive(Debug, Clone)]
pub(crate) struct Theme {
    pub(crate) bg: Color,
    pub(crate) bg_alt: Color,
    pub(crate) fg: Color,
    pub(crate) fg_muted: Color,
    pub(crate) border: Color,
    pub(crate) accent: Color,
    pub(crate) selection: Color,
    pub(crate) warning: Color,
    pub(crate) error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: Color::Rgb(20, 22, 31),
            bg_alt: Color::Rgb(25, 28, 39),
            fg: Color::Rgb(215, 213, 189),
            fg_muted: Color::Rgb(100, 100, 120),
            border: Color::Rgb(127, 122, 88),
            accent: Color::Rgb(206, 198, 130),
            selection: Color::Rgb(51, 70, 124),
            warning: Color::Rgb(210, 168, 75),
            error: Color::Rgb(224, 108, 117),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PaletteFile {
    pub(crate) name: String,
    pub(crate) colors: Vec<PaletteEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PaletteEntry {
    pub(crate) name: String,
    pub(crate) hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Swatch {
    pub(crate) name: String,
    pub(crate) color: Color,
}

/// Parses `#rrggbb` (the leading `#` is optional).
pub(crate) fn parse_hex_color(input: &str) -> Option<Color> {
    let s = input.trim();
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

pub(crate) fn color_label(color: Color) -> String {
    match color {
        Color::Rgb(r, g, b) => format!("#{r:02x}{g:02x}{b:02x}"),
        other => format!("{other:?}").to_ascii_lowercase(),
    }
}

pub(crate) fn swatches_from_file(file: PaletteFile) -> Vec<Swatch> {
    file.colors
        .into_iter()
        .filter_map(|entry| {
            let Some(color) = parse_hex_color(&entry.hex) else {
                tracing::warn!(
                    palette = file.name.as_str(),
                    swatch = entry.name.as_str(),
                    hex = entry.hex.as_str(),
                    "skipping swatch with invalid color"
                );
                return None;
            };
            Some(Swatch {
                name: format!("{} / {}", file.name, entry.name),
                color,
            })
        })
        .collect()
}

fn parse_palette(raw: &str, source: &str) -> Option<PaletteFile> {
    match serde_json::from_str::<PaletteFile>(raw) {
        Ok(file) => Some(file),
        Err(err) => {
            tracing::warn!(source, %err, "ignoring invalid palette file");
            None
        }
    }
}

/// Swatches for the color picker: user palettes from `<config>/palettes`
/// first, then the built-in ones.
pub(crate) fn load_palettes(user_dir: Option<&Path>) -> Vec<Swatch> {
    let mut swatches = Vec::new();

    if let Some(dir) = user_dir.filter(|d| d.is_dir()) {
        let mut paths: Vec<_> = fs::read_dir(dir)
            .ok()
            .into_iter()
            .flat_map(|rd| rd.filter_map(Result::ok))
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|e| e == "json"))
            .collect();
        paths.sort();
        for path in paths {
            let Ok(raw) = fs::read_to_string(&path) else {
                continue;
            };
            if let Some(file) = parse_palette(&raw, &path.display().to_string()) {
                swatches.extend(swatches_from_file(file));
            }
        }
    }

    let mut files: Vec<_> = EMBEDDED_PALETTES
        .files()
        .filter(|f| f.path().extension().is_some_and(|e| e == "json"))
        .collect();
    files.sort_by_key(|f| f.path());
    for file in files {
        let Some(raw) = file.contents_utf8() else {
            continue;
        };
        if let Some(palette) = parse_palette(raw, &file.path().display().to_string()) {
            swatches.extend(swatches_from_file(palette));
        }
    }
    swatches
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parses_hex_with_and_without_hash() {
        assert_eq!(parse_hex_color("#ff8000"), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(parse_hex_color("  00Ff10 "), Some(Color::Rgb(0, 255, 16)));
    }

    #[test]
    fn test_rejects_bad_hex() {
        assert_eq!(parse_hex_color(""), None);
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
        assert_eq!(parse_hex_color("#ff00001"), None);
    }

    #[test]
    fn test_label_round_trips_rgb() {
        let color = Color::Rgb(18, 52, 86);
        assert_eq!(color_label(color), "#123456");
        assert_eq!(parse_hex_color(&color_label(color)), Some(color));
    }

    #[test]
    fn test_invalid_swatches_are_skipped() {
        let file: PaletteFile = serde_json::from_str(
            r##"{"name":"Test","colors":[{"name":"Red","hex":"#ff0000"},{"name":"Bad","hex":"nope"}]}"##,
        )
        .expect("parse");
        let swatches = swatches_from_file(file);
        assert_eq!(swatches.len(), 1);
        assert_eq!(swatches[0].name, "Test / Red");
        assert_eq!(swatches[0].color, Color::Rgb(255, 0, 0));
    }

    #[test]
    fn test_embedded_palettes_load() {
        let swatches = load_palettes(None);
        assert!(!swatches.is_empty(), "built-in palettes should provide swatches");
    }

    #[test]
    fn test_user_palettes_come_first() {
        let tmp = tempdir().expect("tempdir");
        fs::write(
            tmp.path().join("mine.json"),
            r##"{"name":"Mine","colors":[{"name":"Teal","hex":"#008080"}]}"##,
        )
        .expect("write");
        fs::write(tmp.path().join("broken.json"), "{").expect("write");
        let swatches = load_palettes(Some(tmp.path()));
        assert_eq!(swatches[0].name, "Mine / Teal");
        assert!(swatches.len() > 1);
    }
}
