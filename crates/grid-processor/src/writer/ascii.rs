//! Whitespace-separated integer rasters read by the wave model.
//!
//! Every row is written on its own LF-terminated line as ` v1 v2 ... vn `,
//! southernmost row first.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use gridgen_common::{GridField, GridGenError, GridGenResult};

/// Multiply by `scale` and round to the nearest integer.
pub fn scale_field(field: &GridField<f64>, scale: f64) -> GridField<i64> {
    field.map(|&v| (v * scale).round() as i64)
}

fn write_rows<W: Write>(writer: &mut W, field: &GridField<i64>) -> std::io::Result<()> {
    for k in 0..field.ny {
        write!(writer, " ")?;
        for v in field.row(k) {
            write!(writer, "{} ", v)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Write one integer raster, `ny` lines of `nx` values.
pub fn write_ascii_raster(path: &Path, field: &GridField<i64>) -> GridGenResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_rows(&mut writer, field)?;
    writer.flush()?;
    Ok(())
}

/// Write the x obstruction block, a blank line, then the y block.
pub fn write_ascii_obstructions(path: &Path, mx: &GridField<i64>, my: &GridField<i64>) -> GridGenResult<()> {
    if !mx.same_shape(my) {
        return Err(GridGenError::data(format!(
            "obstruction blocks differ in shape: {}x{} vs {}x{}",
            mx.nx, mx.ny, my.nx, my.ny
        )));
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_rows(&mut writer, mx)?;
    writeln!(writer)?;
    write_rows(&mut writer, my)?;
    writer.flush()?;
    Ok(())
}

/// Write a coordinate field of a curvilinear grid with six decimals.
pub fn write_ascii_coords(path: &Path, field: &GridField<f64>) -> GridGenResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for k in 0..field.ny {
        write!(writer, " ")?;
        for v in field.row(k) {
            write!(writer, "{:.6} ", v)?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a raster written by [`write_ascii_raster`]. Blank lines are skipped,
/// so both blocks of an obstruction file come back as one field of `2 * ny`
/// rows.
pub fn read_ascii_raster(path: &Path) -> GridGenResult<GridField<i64>> {
    let text = std::fs::read_to_string(path)?;
    let mut nx = None;
    let mut data = Vec::new();
    let mut ny = 0;
    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|tok| tok.parse::<i64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| GridGenError::data(format!("{}:{}: {}", path.display(), line_no + 1, e)))?;
        match nx {
            None => nx = Some(row.len()),
            Some(n) if n != row.len() => {
                return Err(GridGenError::data(format!(
                    "{}:{}: expected {} values, found {}",
                    path.display(),
                    line_no + 1,
                    n,
                    row.len()
                )))
            }
            Some(_) => {}
        }
        data.extend(row);
        ny += 1;
    }
    GridField::from_vec(nx.unwrap_or(0), ny, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_row_layout() {
        let field = GridField::from_vec(3, 2, vec![1, -20, 300, 0, 5, 6]).unwrap();
        let mut buf = Vec::new();
        write_rows(&mut buf, &field).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), " 1 -20 300 \n 0 5 6 \n");
    }

    #[test]
    fn test_scale_rounding() {
        let field = GridField::from_vec(3, 1, vec![-12.3456, 0.0004, 999999.0]).unwrap();
        assert_eq!(scale_field(&field, 1000.0).data, vec![-12346, 0, 999999000]);
    }

    #[test]
    fn test_obstruction_blocks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("grid.obst");
        let mx = GridField::from_vec(2, 1, vec![70, 0]).unwrap();
        let my = GridField::from_vec(2, 1, vec![0, 15]).unwrap();
        write_ascii_obstructions(&path, &mx, &my).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), " 70 0 \n\n 0 15 \n");
    }

    #[test]
    fn test_obstruction_shape_mismatch() {
        let dir = TempDir::new().unwrap();
        let mx = GridField::filled(2, 1, 0i64);
        let my = GridField::filled(1, 2, 0i64);
        let err = write_ascii_obstructions(&dir.path().join("x.obst"), &mx, &my).unwrap_err();
        assert_eq!(err.kind(), "data");
    }

    #[test]
    fn test_coordinate_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("grid.lon");
        let lon = GridField::from_vec(3, 2, vec![179.5, -180.0, -179.5, 179.5, -180.0, -179.5]).unwrap();
        write_ascii_coords(&path, &lon).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            " 179.500000 -180.000000 -179.500000 \n 179.500000 -180.000000 -179.500000 \n"
        );
    }

    #[test]
    fn test_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("grid.mask");
        let field = GridField::from_vec(2, 2, vec![1, 0, 0, 1]).unwrap();
        write_ascii_raster(&path, &field).unwrap();
        assert_eq!(read_ascii_raster(&path).unwrap(), field);
    }
}
