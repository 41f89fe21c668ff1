pub mod google;
pub mod osm;

use std::path::Path;

use crate::Result;
use crate::track::TrackPoint;

// turn a track into a map image on disk, whatever the tile source
pub trait MapBackend {
    fn render(&self, points: &[TrackPoint], output: &Path) -> Result<()>;

    fn name(&self) -> &'static str;
}
