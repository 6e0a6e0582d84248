//! Output writers for the wave model's grid preprocessing products.
//!
//! The model reads plain text: integer rasters for depth, mask and
//! obstructions plus a descriptor tying them together. A JSON run summary is
//! written next to them for bookkeeping.

mod ascii;
mod metadata;

use std::path::Path;

use gridgen_common::GridGenResult;
use serde::Serialize;

pub use ascii::{
    read_ascii_raster, scale_field, write_ascii_coords, write_ascii_obstructions, write_ascii_raster,
};
pub use metadata::{render_metadata, write_metadata, MetadataInput, Scales};

/// Write any serializable summary as pretty-printed JSON.
pub fn write_summary<T: Serialize>(path: &Path, summary: &T) -> GridGenResult<()> {
    let text = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, text)?;
    Ok(())
}
