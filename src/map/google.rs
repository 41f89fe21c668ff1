//! Google Static Maps backend: one HTTP GET against the Static Maps API,
//! response bytes written verbatim as the PNG.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use serde::Deserialize;

use super::MapBackend;
use crate::condition::reduce_points;
use crate::track::{self, TrackPoint};
use crate::{Error, Result};

const STATIC_MAPS_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/staticmap";

// the encoded path has to stay within the API's URL length limit
const MAX_PATH_POINTS: usize = 600;
const PATH_MIN_SPACING: f64 = 10.0;

/// Map style offered by the Static Maps API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapType {
    Roadmap,
    Terrain,
    Satellite,
    Hybrid,
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MapType::Roadmap => "roadmap",
            MapType::Terrain => "terrain",
            MapType::Satellite => "satellite",
            MapType::Hybrid => "hybrid",
        };
        f.write_str(name)
    }
}

impl FromStr for MapType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "roadmap" => Ok(MapType::Roadmap),
            "terrain" => Ok(MapType::Terrain),
            "satellite" => Ok(MapType::Satellite),
            "hybrid" => Ok(MapType::Hybrid),
            other => Err(format!(
                "unknown map type {other:?}, expected roadmap, terrain, satellite or hybrid"
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiKeyFile {
    google_api_key: String,
}

/// Reads the Static Maps API key from its JSON key file
/// (`{"google_api_key": "..."}`).
pub fn read_api_key(path: &Path) -> Result<String> {
    let data = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let key: ApiKeyFile =
        serde_json::from_str(&data).map_err(|e| Error::ApiKey(e.to_string()))?;
    Ok(key.google_api_key)
}

/// Fetches the track rendered on a Google map.
pub struct GoogleBackend {
    pub api_key: String,
    pub width: u32,
    pub height: u32,
    pub map_type: MapType,
    /// Path color in the API's `0xRRGGBBAA` syntax.
    pub path_color: String,
    pub path_weight: u32,
}

impl GoogleBackend {
    fn request_url(&self, points: &[TrackPoint]) -> Result<String> {
        let bounds = track::bounds(points).ok_or(Error::EmptyTrack)?;
        let (center_lat, center_lon) = bounds.center();

        Ok(format!(
            "{STATIC_MAPS_ENDPOINT}?center={center_lat},{center_lon}\
             &size={}x{}&maptype={}&format=PNG&key={}\
             &path=color:{}|weight:{}|{}",
            self.width,
            self.height,
            self.map_type,
            self.api_key,
            self.path_color,
            self.path_weight,
            path_parameter(points),
        ))
    }
}

impl MapBackend for GoogleBackend {
    fn render(&self, points: &[TrackPoint], output: &Path) -> Result<()> {
        let url = self.request_url(points)?;
        debug!("requesting static map, {} path points", points.len());

        let response = reqwest::blocking::get(&url)?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes()?;
        fs::write(output, &bytes).map_err(|source| Error::Io {
            path: output.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "Google Static Maps"
    }
}

/// The `lat,lon|lat,lon|...` path parameter, reduced to fit the URL.
pub fn path_parameter(points: &[TrackPoint]) -> String {
    let reduced = reduce_points(points, MAX_PATH_POINTS, PATH_MIN_SPACING);
    let formatted: Vec<String> = reduced
        .iter()
        .map(|p| format!("{:.6},{:.6}", p.latitude, p.longitude))
        .collect();
    formatted.join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> TrackPoint {
        TrackPoint {
            latitude: lat,
            longitude: lon,
            elevation: None,
            time: None,
        }
    }

    fn backend() -> GoogleBackend {
        GoogleBackend {
            api_key: "test-key".to_string(),
            width: 800,
            height: 600,
            map_type: MapType::Hybrid,
            path_color: "0xFF000080".to_string(),
            path_weight: 3,
        }
    }

    #[test]
    fn test_path_parameter_formats_six_decimals_joined_by_pipes() {
        let param = path_parameter(&[point(50.918, 14.0805), point(50.92, 14.1)]);
        assert_eq!(param, "50.918000,14.080500|50.920000,14.100000");
    }

    #[test]
    fn test_path_parameter_caps_point_count() {
        let points: Vec<TrackPoint> = (0..5000)
            .map(|i| point(50.0 + i as f64 * 0.0005, 14.0))
            .collect();
        let param = path_parameter(&points);
        assert!(param.split('|').count() <= MAX_PATH_POINTS + 1);
    }

    #[test]
    fn test_request_url_carries_all_api_parameters() {
        let url = backend()
            .request_url(&[point(50.5, 14.0), point(51.5, 14.5)])
            .unwrap();

        assert!(url.starts_with(STATIC_MAPS_ENDPOINT));
        assert!(url.contains("center=51,14.25"));
        assert!(url.contains("size=800x600"));
        assert!(url.contains("maptype=hybrid"));
        assert!(url.contains("format=PNG"));
        assert!(url.contains("key=test-key"));
        assert!(url.contains("path=color:0xFF000080|weight:3|"));
    }

    #[test]
    fn test_request_url_of_empty_track_fails() {
        assert!(matches!(
            backend().request_url(&[]),
            Err(Error::EmptyTrack)
        ));
    }

    #[test]
    fn test_map_type_parsing_round_trips() {
        for name in ["roadmap", "terrain", "satellite", "hybrid"] {
            assert_eq!(name.parse::<MapType>().unwrap().to_string(), name);
        }
        assert!("streetview".parse::<MapType>().is_err());
    }

    #[test]
    fn test_api_key_file_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("google_api_key.json");
        fs::write(&path, r#"{"google_api_key": "abc123"}"#).unwrap();
        assert_eq!(read_api_key(&path).unwrap(), "abc123");

        fs::write(&path, r#"{"wrong_field": true}"#).unwrap();
        assert!(matches!(read_api_key(&path), Err(Error::ApiKey(_))));
    }
}
