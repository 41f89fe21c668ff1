//! OpenStreetMap backend: local tile compositing via the `staticmap` crate.

use std::path::Path;

use staticmap::StaticMapBuilder;
use staticmap::tools::{Color, LineBuilder};

use super::MapBackend;
use crate::track::TrackPoint;
use crate::{Error, Result};

pub const DEFAULT_TILE_URL: &str = "https://a.tile.openstreetmap.de/{z}/{x}/{y}.png";

/// Renders the track polyline over OpenStreetMap tiles.
pub struct OsmBackend {
    pub width: u32,
    pub height: u32,
    pub tile_url: String,
    /// RGBA path color.
    pub color: (u8, u8, u8, u8),
    pub line_width: f32,
}

impl MapBackend for OsmBackend {
    fn render(&self, points: &[TrackPoint], output: &Path) -> Result<()> {
        if points.is_empty() {
            return Err(Error::EmptyTrack);
        }

        let mut map = StaticMapBuilder::default()
            .width(self.width)
            .height(self.height)
            .url_template(self.tile_url.clone())
            .build()
            .map_err(render_error)?;

        let (r, g, b, a) = self.color;
        let line = LineBuilder::default()
            .lat_coordinates(points.iter().map(|p| p.latitude).collect::<Vec<_>>())
            .lon_coordinates(points.iter().map(|p| p.longitude).collect::<Vec<_>>())
            .width(self.line_width)
            .simplify(true)
            .color(Color::new(true, r, g, b, a))
            .build()
            .map_err(render_error)?;

        map.add_tool(line);
        map.save_png(output).map_err(render_error)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "OpenStreetMap"
    }
}

fn render_error<E: std::fmt::Display>(error: E) -> Error {
    Error::Render(error.to_string())
}

/// Parses a path color: a handful of well-known names or `#RRGGBB[AA]`.
pub fn parse_color(input: &str) -> Option<(u8, u8, u8, u8)> {
    match input.to_ascii_lowercase().as_str() {
        "red" => return Some((255, 0, 0, 255)),
        "green" => return Some((0, 128, 0, 255)),
        "blue" => return Some((0, 0, 255, 255)),
        "black" => return Some((0, 0, 0, 255)),
        "white" => return Some((255, 255, 255, 255)),
        _ => {}
    }

    let hex = input.strip_prefix('#')?;
    if hex.len() != 6 && hex.len() != 8 {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[2 * i..2 * i + 2], 16).ok();
    let (r, g, b) = (channel(0)?, channel(1)?, channel(2)?);
    let a = if hex.len() == 8 { channel(3)? } else { 255 };
    Some((r, g, b, a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_colors() {
        assert_eq!(parse_color("red"), Some((255, 0, 0, 255)));
        assert_eq!(parse_color("Blue"), Some((0, 0, 255, 255)));
    }

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!(parse_color("#ff000080"), Some((255, 0, 0, 128)));
        assert_eq!(parse_color("#00ff00"), Some((0, 255, 0, 255)));
    }

    #[test]
    fn test_reject_malformed_colors() {
        assert!(parse_color("chartreuse-ish").is_none());
        assert!(parse_color("#12345").is_none());
        assert!(parse_color("#gg0000").is_none());
    }

    #[test]
    fn test_empty_track_is_rejected_before_any_tile_fetch() {
        let backend = OsmBackend {
            width: 100,
            height: 100,
            tile_url: DEFAULT_TILE_URL.to_string(),
            color: (255, 0, 0, 255),
            line_width: 3.0,
        };
        let result = backend.render(&[], Path::new("unused.png"));
        assert!(matches!(result, Err(Error::EmptyTrack)));
    }
}
