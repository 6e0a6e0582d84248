//! Reads small rasters written to a temp directory, and the reference ETOPO1
//! grid when one is available.

use gridgen_common::RasterSource;
use netcdf_parser::{BathymetryVariables, NetCdfBathymetry, NetCdfError};
use test_utils::require_test_file;

fn write_raster(
    path: &std::path::Path,
    vars: &BathymetryVariables,
    lon: &[f64],
    lat: &[f64],
    z: &[f64],
    missing: Option<f64>,
) {
    let mut file = netcdf::create(path).unwrap();
    file.add_dimension(&vars.lon, lon.len()).unwrap();
    file.add_dimension(&vars.lat, lat.len()).unwrap();

    let mut v = file.add_variable::<f64>(&vars.lon, &[&vars.lon]).unwrap();
    v.put_values(lon, ..).unwrap();
    let mut v = file.add_variable::<f64>(&vars.lat, &[&vars.lat]).unwrap();
    v.put_values(lat, ..).unwrap();

    let mut v = file
        .add_variable::<f64>(&vars.elevation, &[&vars.lat, &vars.lon])
        .unwrap();
    if let Some(m) = missing {
        v.put_attribute("missing_value", m).unwrap();
    }
    v.put_values(z, ..).unwrap();
}

#[test]
fn test_reads_ascending_raster_window() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gebco.nc");
    let vars = BathymetryVariables::gebco();
    let lon = [0.0, 1.0, 2.0];
    let lat = [10.0, 11.0];
    let z = [-1.0, -2.0, -3.0, -4.0, -5.0, -6.0];
    write_raster(&path, &vars, &lon, &lat, &z, None);

    let raster = NetCdfBathymetry::open(&path, vars).unwrap();
    assert_eq!(raster.lon(), &lon);
    assert_eq!(raster.lat(), &lat);

    let window = raster.read_window(0..2, 1..3).unwrap();
    assert_eq!(window.nx, 2);
    assert_eq!(window.ny, 2);
    assert_eq!(window.data, vec![-2.0, -3.0, -5.0, -6.0]);
}

#[test]
fn test_descending_latitude_is_flipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("etopo2.nc");
    let vars = BathymetryVariables::etopo2();
    let lon = [0.0, 1.0];
    let lat = [12.0, 11.0, 10.0];
    // rows stored north to south
    let z = [30.0, 31.0, 20.0, 21.0, 10.0, 11.0];
    write_raster(&path, &vars, &lon, &lat, &z, None);

    let raster = NetCdfBathymetry::open(&path, vars).unwrap();
    assert_eq!(raster.lat(), &[10.0, 11.0, 12.0]);

    let all = raster.read_window(0..3, 0..2).unwrap();
    assert_eq!(all.data, vec![10.0, 11.0, 20.0, 21.0, 30.0, 31.0]);

    let top = raster.read_window(2..3, 0..2).unwrap();
    assert_eq!(top.data, vec![30.0, 31.0]);
}

#[test]
fn test_missing_value_becomes_nan() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("etopo1.nc");
    let vars = BathymetryVariables::etopo1();
    let z = [-9999.0, -5.0, -6.0, -7.0];
    write_raster(&path, &vars, &[0.0, 1.0], &[0.0, 1.0], &z, Some(-9999.0));

    let raster = NetCdfBathymetry::open(&path, vars).unwrap();
    let window = raster.read_window(0..2, 0..2).unwrap();
    assert!(window.data[0].is_nan());
    assert_eq!(window.data[1], -5.0);
}

#[test]
fn test_wrong_variable_name_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gebco.nc");
    write_raster(
        &path,
        &BathymetryVariables::gebco(),
        &[0.0, 1.0],
        &[0.0, 1.0],
        &[0.0; 4],
        None,
    );

    let result = NetCdfBathymetry::open(&path, BathymetryVariables::etopo1());
    assert!(matches!(result, Err(NetCdfError::MissingData(_))));
}

#[test]
fn test_window_reads_do_not_hold_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gebco.nc");
    let vars = BathymetryVariables::gebco();
    write_raster(&path, &vars, &[0.0, 1.0], &[0.0, 1.0], &[-1.0, -2.0, -3.0, -4.0], None);

    let raster = NetCdfBathymetry::open(&path, vars).unwrap();
    assert_eq!(raster.read_window(0..1, 0..2).unwrap().data, vec![-1.0, -2.0]);

    std::fs::remove_file(&path).unwrap();
    assert!(raster.read_window(0..1, 0..2).is_err());
}

#[test]
fn test_reference_etopo1_window() {
    let path = require_test_file!("etopo1.nc");
    let raster = NetCdfBathymetry::open(&path, BathymetryVariables::etopo1()).unwrap();

    assert!(raster.lon().windows(2).all(|w| w[1] > w[0]));
    assert!(raster.lat().windows(2).all(|w| w[1] > w[0]));
    assert!(*raster.lon().first().unwrap() < -179.0);
    assert!(*raster.lat().last().unwrap() > 89.0);

    // 10x10 nodes around the middle of the grid
    let (ny, nx) = (raster.lat().len(), raster.lon().len());
    let window = raster.read_window(ny / 2..ny / 2 + 10, nx / 2..nx / 2 + 10).unwrap();
    assert_eq!((window.nx, window.ny), (10, 10));
    assert!(window.data.iter().all(|v| v.is_finite() && v.abs() < 11_000.0));
}
