//! User-supplied polygons.
//!
//! A YAML or JSON list of rings appended to the shoreline set, for coastlines
//! the database misses (breakwaters, reclaimed land):
//!
//! ```yaml
//! - level: 1
//!   x: [10.0, 10.5, 10.5, 10.0]
//!   y: [54.0, 54.0, 54.5, 54.5]
//! ```

use std::path::Path;

use gridgen_common::{BoundarySet, Polygon, PolygonLevel};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{GshhsError, GshhsResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPolygon {
    #[serde(default = "default_level")]
    pub level: u8,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

fn default_level() -> u8 {
    PolygonLevel::LAND
}

impl UserPolygon {
    fn into_polygon(self, index: usize) -> GshhsResult<Polygon> {
        if self.x.len() != self.y.len() {
            return Err(GshhsError::InvalidPolygonFile(format!(
                "polygon {} has {} x and {} y values",
                index,
                self.x.len(),
                self.y.len()
            )));
        }
        if self.x.len() < 3 {
            return Err(GshhsError::InvalidPolygonFile(format!(
                "polygon {} needs at least 3 vertices",
                index
            )));
        }
        if !(1..=4).contains(&self.level) {
            return Err(GshhsError::InvalidPolygonFile(format!(
                "polygon {} has level {}, expected 1-4",
                index, self.level
            )));
        }
        Ok(Polygon::new(self.x, self.y, self.level))
    }
}

/// Parse polygons from YAML (a superset of JSON).
pub fn parse_user_polygons(content: &str) -> GshhsResult<BoundarySet> {
    let raw: Vec<UserPolygon> = serde_yaml::from_str(content)
        .map_err(|e| GshhsError::InvalidPolygonFile(e.to_string()))?;

    raw.into_iter()
        .enumerate()
        .map(|(i, p)| p.into_polygon(i))
        .collect::<GshhsResult<Vec<_>>>()
        .map(BoundarySet::from)
}

/// Load a user polygon file. `.json` files go through `serde_json`, anything
/// else through `serde_yaml`.
pub fn read_user_polygons<P: AsRef<Path>>(path: P) -> GshhsResult<BoundarySet> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e))
    })?;

    let set = if path.extension().is_some_and(|ext| ext == "json") {
        let raw: Vec<UserPolygon> = serde_json::from_str(&content)
            .map_err(|e| GshhsError::InvalidPolygonFile(format!("{}: {}", path.display(), e)))?;
        raw.into_iter()
            .enumerate()
            .map(|(i, p)| p.into_polygon(i))
            .collect::<GshhsResult<Vec<_>>>()
            .map(BoundarySet::from)?
    } else {
        parse_user_polygons(&content)?
    };

    info!(path = %path.display(), polygons = set.len(), "Loaded user polygons");
    Ok(set)
}
