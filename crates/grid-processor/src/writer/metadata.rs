//! The grid descriptor (`<prefix>.meta`) consumed by the wave model's grid
//! reader.

use std::fmt::Write as _;
use std::path::Path;

use chrono::Utc;
use gridgen_common::{GridCoords, GridGenResult, GridType};
use serde::{Deserialize, Serialize};

/// Integer scale factors of the depth and obstruction files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scales {
    pub depth: f64,
    pub obstr: f64,
}

impl Default for Scales {
    fn default() -> Self {
        Self {
            depth: 1000.0,
            obstr: 100.0,
        }
    }
}

/// What the descriptor needs to know about a run.
#[derive(Debug, Clone, Copy)]
pub struct MetadataInput<'a> {
    /// Output file prefix, written into the file references
    pub prefix: &'a str,
    pub grid_type: GridType,
    pub coords: &'a GridCoords,
    pub scales: Scales,
    pub is_global: bool,
}

/// Render the descriptor text.
///
/// Spacing is taken from the node coordinates, in minutes of arc.
pub fn render_metadata(input: &MetadataInput<'_>) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = render_into(&mut out, input);
    out
}

fn render_into(out: &mut String, input: &MetadataInput<'_>) -> std::fmt::Result {
    let coords = input.coords;
    let (nx, ny) = (coords.nx(), coords.ny());
    let closure = if input.is_global { "SMPL" } else { "NONE" };
    let prefix = input.prefix;

    writeln!(out, "$ Grid descriptor generated {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(out, "$ Grid type, spherical flag and closure; then Nx Ny.")?;
    match input.grid_type {
        GridType::Rect => {
            writeln!(out, "$ RECT: dx dy (minutes) with divisor, then SW corner (degrees) with divisor.")?;
        }
        GridType::Curv => {
            writeln!(out, "$ CURV: longitude and latitude files as unit, scale, offset, layout, format, name.")?;
        }
    }
    writeln!(out, "$ Bottom: min depth, max depth, unit, scale, layout, format, name.")?;
    writeln!(out, "$ Obstructions and mask: unit, scale, layout, format, name.")?;
    writeln!(out, "$")?;

    writeln!(out, "   '{}'  T '{}'", input.grid_type.token(), closure)?;
    writeln!(out, "{} {}", nx, ny)?;
    match input.grid_type {
        GridType::Rect => {
            let (dx, dy) = coords.spacing();
            writeln!(out, "{:.4} {:.4} 60.00", dx * 60.0, dy * 60.0)?;
            let (lon0, lat0) = if nx > 0 && ny > 0 {
                (coords.lon[(0, 0)], coords.lat[(0, 0)])
            } else {
                (0.0, 0.0)
            };
            writeln!(out, "{:.6}  {:.6}  1.00", lon0, lat0)?;
        }
        GridType::Curv => {
            writeln!(out, "20 1.0 0.0 1 1 '(....)' NAME '{}.lon'", prefix)?;
            writeln!(out, "30 1.0 0.0 1 1 '(....)' NAME '{}.lat'", prefix)?;
        }
    }
    writeln!(out, "$ Bottom Bathymetry")?;
    writeln!(
        out,
        "-0.10 2.50 40 {}  1 1 '(....)' NAME '{}.bot'",
        1.0 / input.scales.depth,
        prefix
    )?;
    writeln!(out, "$ Sub-grid information")?;
    writeln!(
        out,
        "50 {} 1 1 '(....)' NAME '{}.obst'",
        1.0 / input.scales.obstr,
        prefix
    )?;
    writeln!(out, "$ Mask Information")?;
    writeln!(out, "60 1 1 '(....)' NAME '{}.mask'", prefix)?;
    writeln!(out, "$")?;
    Ok(())
}

pub fn write_metadata(path: &Path, input: &MetadataInput<'_>) -> GridGenResult<()> {
    std::fs::write(path, render_metadata(input))?;
    Ok(())
}
