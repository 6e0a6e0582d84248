//! Target grid specification and row-major 2-D fields.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::{BoundingBox, GridGenError, GridGenResult};

/// A row-major 2-D field indexed as `[k, j]` (row = latitude index,
/// column = longitude index).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridField<T> {
    /// Number of columns (longitude direction)
    pub nx: usize,
    /// Number of rows (latitude direction)
    pub ny: usize,
    /// Values, row 0 first
    pub data: Vec<T>,
}

impl<T: Clone> GridField<T> {
    /// Create a field filled with `value`.
    pub fn filled(nx: usize, ny: usize, value: T) -> Self {
        Self {
            nx,
            ny,
            data: vec![value; nx * ny],
        }
    }
}

impl<T> GridField<T> {
    /// Wrap existing row-major data.
    pub fn from_vec(nx: usize, ny: usize, data: Vec<T>) -> GridGenResult<Self> {
        if data.len() != nx * ny {
            return Err(GridGenError::data(format!(
                "field of {}x{} needs {} values, got {}",
                ny,
                nx,
                nx * ny,
                data.len()
            )));
        }
        Ok(Self { nx, ny, data })
    }

    /// Flat index of `(k, j)`.
    #[inline]
    pub fn flat_index(&self, k: usize, j: usize) -> usize {
        k * self.nx + j
    }

    /// Row `k` as a slice.
    pub fn row(&self, k: usize) -> &[T] {
        &self.data[k * self.nx..(k + 1) * self.nx]
    }

    /// Checked access with signed indices (out of range → `None`).
    pub fn get(&self, k: isize, j: isize) -> Option<&T> {
        if k < 0 || j < 0 || k as usize >= self.ny || j as usize >= self.nx {
            return None;
        }
        self.data.get(k as usize * self.nx + j as usize)
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the field holds no cells.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Same-shape field with every value mapped.
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> GridField<U> {
        GridField {
            nx: self.nx,
            ny: self.ny,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// True if `other` has the same shape.
    pub fn same_shape<U>(&self, other: &GridField<U>) -> bool {
        self.nx == other.nx && self.ny == other.ny
    }
}

impl<T> Index<(usize, usize)> for GridField<T> {
    type Output = T;

    #[inline]
    fn index(&self, (k, j): (usize, usize)) -> &T {
        &self.data[k * self.nx + j]
    }
}

impl<T> IndexMut<(usize, usize)> for GridField<T> {
    #[inline]
    fn index_mut(&mut self, (k, j): (usize, usize)) -> &mut T {
        &mut self.data[k * self.nx + j]
    }
}

/// Grid geometry flavor written to the model descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GridType {
    /// Regular lon/lat grid
    #[default]
    Rect,
    /// Curvilinear grid with explicit coordinate files
    Curv,
}

impl GridType {
    /// Token used by the wave model's grid reader.
    pub fn token(&self) -> &'static str {
        match self {
            GridType::Rect => "RECT",
            GridType::Curv => "CURV",
        }
    }
}

/// Rectilinear, node-centered target grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetGrid {
    pub lon_start: f64,
    pub lon_end: f64,
    pub dx: f64,
    pub lat_start: f64,
    pub lat_end: f64,
    pub dy: f64,
    /// Grid closes on itself in longitude
    pub is_global: bool,
}

impl TargetGrid {
    /// Create and validate a grid from `[w, e]`, `[s, n]` ranges and spacing.
    pub fn new(
        lon_range: [f64; 2],
        lat_range: [f64; 2],
        dx: f64,
        dy: f64,
        is_global: bool,
    ) -> GridGenResult<Self> {
        let grid = Self {
            lon_start: lon_range[0],
            lon_end: lon_range[1],
            dx,
            lat_start: lat_range[0],
            lat_end: lat_range[1],
            dy,
            is_global,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Check spacing, range ordering and minimum size.
    pub fn validate(&self) -> GridGenResult<()> {
        if !(self.dx > 0.0 && self.dy > 0.0) {
            return Err(GridGenError::config(format!(
                "grid spacing must be positive (dx={}, dy={})",
                self.dx, self.dy
            )));
        }
        if self.lon_start > self.lon_end || self.lat_start > self.lat_end {
            return Err(GridGenError::config(format!(
                "inverted grid range: lon [{}, {}], lat [{}, {}]",
                self.lon_start, self.lon_end, self.lat_start, self.lat_end
            )));
        }
        if self.lat_start < -90.0 || self.lat_end > 90.0 {
            return Err(GridGenError::config(format!(
                "latitude range [{}, {}] outside [-90, 90]",
                self.lat_start, self.lat_end
            )));
        }
        if self.nx() < 2 || self.ny() < 2 {
            return Err(GridGenError::config(format!(
                "grid needs at least 2 nodes per axis, got {}x{}",
                self.ny(),
                self.nx()
            )));
        }
        Ok(())
    }

    /// Number of columns.
    pub fn nx(&self) -> usize {
        ((self.lon_end - self.lon_start) / self.dx).round() as usize + 1
    }

    /// Number of rows.
    pub fn ny(&self) -> usize {
        ((self.lat_end - self.lat_start) / self.dy).round() as usize + 1
    }

    /// 1-D longitude axis.
    pub fn lon_axis(&self) -> Vec<f64> {
        (0..self.nx())
            .map(|j| self.lon_start + j as f64 * self.dx)
            .collect()
    }

    /// 1-D latitude axis.
    pub fn lat_axis(&self) -> Vec<f64> {
        (0..self.ny())
            .map(|k| self.lat_start + k as f64 * self.dy)
            .collect()
    }

    /// Node extent of the grid.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.lon_start, self.lat_start, self.lon_end, self.lat_end)
    }

    /// Meshgridded coordinate fields.
    pub fn coords(&self) -> GridCoords {
        GridCoords::from_axes(&self.lon_axis(), &self.lat_axis())
    }
}

/// The 2-D `lon[Ny,Nx]` / `lat[Ny,Nx]` coordinate fields of a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCoords {
    pub lon: GridField<f64>,
    pub lat: GridField<f64>,
}

impl GridCoords {
    /// Meshgrid two 1-D axes.
    pub fn from_axes(lon_axis: &[f64], lat_axis: &[f64]) -> Self {
        let nx = lon_axis.len();
        let ny = lat_axis.len();
        let mut lon = Vec::with_capacity(nx * ny);
        let mut lat = Vec::with_capacity(nx * ny);
        for &y in lat_axis {
            for &x in lon_axis {
                lon.push(x);
                lat.push(y);
            }
        }
        Self {
            lon: GridField { nx, ny, data: lon },
            lat: GridField { nx, ny, data: lat },
        }
    }

    pub fn nx(&self) -> usize {
        self.lon.nx
    }

    pub fn ny(&self) -> usize {
        self.lon.ny
    }

    /// Extent of the node coordinates.
    pub fn bbox(&self) -> BoundingBox {
        let xs = &self.lon.data;
        let ys = &self.lat.data;
        BoundingBox::from_points(xs, ys).unwrap_or(BoundingBox::new(0.0, 0.0, 0.0, 0.0))
    }

    /// Longitudes of the first row.
    pub fn lon_axis(&self) -> &[f64] {
        self.lon.row(0)
    }

    /// Latitudes of the first column.
    pub fn lat_axis(&self) -> Vec<f64> {
        (0..self.ny()).map(|k| self.lat[(k, 0)]).collect()
    }

    /// Node spacing along each axis, taken from the first row/column.
    pub fn spacing(&self) -> (f64, f64) {
        let dx = if self.nx() > 1 {
            (self.lon[(0, 1)] - self.lon[(0, 0)]).abs()
        } else {
            0.0
        };
        let dy = if self.ny() > 1 {
            (self.lat[(1, 0)] - self.lat[(0, 0)]).abs()
        } else {
            0.0
        };
        (dx, dy)
    }
}
