//! GSHHS native binary reader.
//!
//! Each record is a fixed header of eleven big-endian `i32` followed by `n`
//! big-endian `(x, y)` pairs. All coordinates are micro-degrees.
//!
//! ```text
//! id n flag west east south north area area_full container ancestor
//! x0 y0 x1 y1 ... x(n-1) y(n-1)
//! ```
//!
//! The low byte of `flag` is the hierarchy level (1 land, 2 lake, 3 island in
//! lake, 4 pond in island; 5/6 Antarctic ice and grounding lines).

use std::path::Path;

use bytes::Bytes;
use gridgen_common::{BoundarySet, Polygon};
use nom::multi::count;
use nom::number::complete::be_i32;
use nom::sequence::tuple;
use nom::IResult;
use tracing::{debug, info, warn};

use crate::error::{GshhsError, GshhsResult};

/// Header size in bytes.
pub const HEADER_LEN: usize = 11 * 4;

/// Levels above this are dropped unless asked for.
pub const DEFAULT_MAX_LEVEL: u8 = 3;

const MICRO: f64 = 1.0e-6;

/// Record header, coordinates still in micro-degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GshhsHeader {
    pub id: i32,
    pub n: i32,
    pub flag: i32,
    pub west: i32,
    pub east: i32,
    pub south: i32,
    pub north: i32,
    pub area: i32,
    pub area_full: i32,
    pub container: i32,
    pub ancestor: i32,
}

impl GshhsHeader {
    pub fn level(&self) -> u8 {
        (self.flag & 0xFF) as u8
    }

    pub fn version(&self) -> u8 {
        ((self.flag >> 8) & 0xFF) as u8
    }

    /// Polygon crosses the Greenwich meridian.
    pub fn greenwich(&self) -> bool {
        (self.flag >> 16) & 1 == 1
    }

    /// Polygon is a river-lake.
    pub fn river(&self) -> bool {
        (self.flag >> 25) & 1 == 1
    }

    pub fn west_deg(&self) -> f64 {
        self.west as f64 * MICRO
    }
}

/// One decoded record.
#[derive(Debug, Clone)]
pub struct GshhsRecord {
    pub header: GshhsHeader,
    pub points: Vec<(i32, i32)>,
}

impl GshhsRecord {
    /// Convert to degrees in the -180..180 convention.
    pub fn to_polygon(&self) -> Polygon {
        let shift = if self.header.west_deg() >= 180.0 { -360.0 } else { 0.0 };
        let x = self
            .points
            .iter()
            .map(|&(x, _)| x as f64 * MICRO + shift)
            .collect();
        let y = self.points.iter().map(|&(_, y)| y as f64 * MICRO).collect();
        Polygon::new(x, y, self.header.level())
    }
}

fn parse_header(input: &[u8]) -> IResult<&[u8], GshhsHeader> {
    let (input, (id, n, flag, west, east, south, north)) =
        tuple((be_i32, be_i32, be_i32, be_i32, be_i32, be_i32, be_i32))(input)?;
    let (input, (area, area_full, container, ancestor)) =
        tuple((be_i32, be_i32, be_i32, be_i32))(input)?;
    Ok((
        input,
        GshhsHeader {
            id,
            n,
            flag,
            west,
            east,
            south,
            north,
            area,
            area_full,
            container,
            ancestor,
        },
    ))
}

fn parse_points(input: &[u8], n: usize) -> IResult<&[u8], Vec<(i32, i32)>> {
    count(tuple((be_i32, be_i32)), n)(input)
}

/// Sequential reader over a GSHHS buffer.
pub struct GshhsReader {
    data: Bytes,
    offset: usize,
}

impl GshhsReader {
    pub fn new(data: Bytes) -> Self {
        Self { data, offset: 0 }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Decode the next record, or `None` at end of buffer.
    pub fn next_record(&mut self) -> Option<GshhsResult<GshhsRecord>> {
        if self.offset >= self.data.len() {
            return None;
        }
        let result = self.decode_at_offset();
        if result.is_err() {
            // A damaged record leaves no reliable position to resume from.
            self.offset = self.data.len();
        }
        Some(result)
    }

    fn decode_at_offset(&mut self) -> GshhsResult<GshhsRecord> {
        let start = self.offset;
        let input = &self.data[start..];

        let (rest, header) = parse_header(input).map_err(|_| GshhsError::Truncated {
            offset: start,
            reason: format!(
                "header needs {} bytes, {} left",
                HEADER_LEN,
                input.len()
            ),
        })?;

        if header.n < 0 {
            return Err(GshhsError::InvalidRecord {
                offset: start,
                reason: format!("negative point count {} in polygon {}", header.n, header.id),
            });
        }
        let n = header.n as usize;

        let (rest, points) = parse_points(rest, n).map_err(|_| GshhsError::Truncated {
            offset: start,
            reason: format!("polygon {} declares {} points", header.id, n),
        })?;

        self.offset = self.data.len() - rest.len();
        Ok(GshhsRecord { header, points })
    }

    /// Read every remaining polygon with `1 <= level <= max_level`.
    pub fn read_all(&mut self, max_level: u8) -> GshhsResult<BoundarySet> {
        let mut set = BoundarySet::new();
        let mut dropped = 0usize;

        while let Some(record) = self.next_record() {
            let record = record?;
            let level = record.header.level();
            if level == 0 || level > max_level || record.points.len() < 3 {
                dropped += 1;
                continue;
            }
            set.push(record.to_polygon());
        }

        debug!(
            polygons = set.len(),
            vertices = set.vertex_count(),
            dropped,
            max_level,
            "Decoded GSHHS buffer"
        );
        Ok(set)
    }
}

impl Iterator for GshhsReader {
    type Item = GshhsResult<GshhsRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record()
    }
}

/// Load a GSHHS file from disk.
pub fn read_gshhs_file<P: AsRef<Path>>(path: P, max_level: u8) -> GshhsResult<BoundarySet> {
    let path = path.as_ref();
    let raw = std::fs::read(path).map_err(|e| {
        std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e))
    })?;
    if raw.is_empty() {
        warn!(path = %path.display(), "Shoreline file is empty");
    }

    let set = GshhsReader::new(Bytes::from(raw)).read_all(max_level)?;
    info!(
        path = %path.display(),
        polygons = set.len(),
        vertices = set.vertex_count(),
        "Loaded shoreline polygons"
    );
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i32, level: i32, west: i32, points: &[(i32, i32)]) -> Vec<u8> {
        let mut buf = Vec::new();
        let header = [id, points.len() as i32, level, west, 0, 0, 0, 0, 0, -1, -1];
        for v in header {
            buf.extend_from_slice(&v.to_be_bytes());
        }
        for &(x, y) in points {
            buf.extend_from_slice(&x.to_be_bytes());
            buf.extend_from_slice(&y.to_be_bytes());
        }
        buf
    }

    #[test]
    fn test_header_flag_bits() {
        let header = GshhsHeader {
            id: 0,
            n: 0,
            flag: 1 | (12 << 8) | (1 << 16),
            west: 0,
            east: 0,
            south: 0,
            north: 0,
            area: 0,
            area_full: 0,
            container: -1,
            ancestor: -1,
        };
        assert_eq!(header.level(), 1);
        assert_eq!(header.version(), 12);
        assert!(header.greenwich());
        assert!(!header.river());
    }

    #[test]
    fn test_single_record() {
        let pts = [(1_000_000, 2_000_000), (3_000_000, 2_000_000), (2_000_000, 4_500_000)];
        let mut reader = GshhsReader::new(Bytes::from(record(7, 1, 1_000_000, &pts)));
        let rec = reader.next_record().unwrap().unwrap();
        assert_eq!(rec.header.id, 7);
        assert_eq!(rec.points.len(), 3);
        let poly = rec.to_polygon();
        assert_eq!(poly.x, vec![1.0, 3.0, 2.0]);
        assert_eq!(poly.north, 4.5);
        assert!(reader.next_record().is_none());
    }

    #[test]
    fn test_truncated_points() {
        let mut buf = record(1, 1, 0, &[(0, 0), (1, 0), (1, 1)]);
        buf.truncate(buf.len() - 4);
        let mut reader = GshhsReader::new(Bytes::from(buf));
        let err = reader.next_record().unwrap().unwrap_err();
        assert!(matches!(err, GshhsError::Truncated { offset: 0, .. }));
        assert!(reader.next_record().is_none());
    }
}
