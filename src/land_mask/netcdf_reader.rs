//! Read a land-sea mask from a NetCDF file (`lsm.nc`).
//!
//! The field is looked up as `lsm`, then as the first variable that is not a coordinate.
//! The field must be stored `(latitude, longitude)`; other dimensions (typically `time`) must
//! be singletons. Packed `i16` storage is decoded with `scale_factor` / `add_offset`, any other
//! storage type is read as `f64`. Without the `netcdf` feature every call fails with
//! [`PolarLowsError::MaskReadError`].
use camino::Utf8Path;

use crate::{geodesy::BoundingBox, polarlows_errors::PolarLowsError};

use super::LandSeaMask;

#[cfg(feature = "netcdf")]
const LON_NAMES: [&str; 2] = ["longitude", "lon"];
#[cfg(feature = "netcdf")]
const LAT_NAMES: [&str; 2] = ["latitude", "lat"];

/// Load, shift, crop and binarise a land-sea mask.
///
/// Arguments
/// -----------------
/// * `path` – NetCDF file holding a 2-D (or singleton-squeezable) field on a lat/lon grid.
/// * `bbox` – Optional inclusive crop applied after the shift.
/// * `shift` – Remap longitudes from `[0, 360)` to `[-180, 180)`.
///
/// Return
/// ----------
/// * The mask, or [`PolarLowsError::MaskReadError`] if the file or its axes cannot be read.
#[cfg(feature = "netcdf")]
pub fn load(
    path: &Utf8Path,
    bbox: Option<&BoundingBox>,
    shift: bool,
) -> Result<LandSeaMask, PolarLowsError> {
    let mask_error = |reason: String| PolarLowsError::MaskReadError(format!("{path}: {reason}"));

    if !path.is_file() {
        return Err(mask_error("file not found".into()));
    }
    let file = netcdf::open(path).map_err(|e| mask_error(e.to_string()))?;

    let lon = read_coord(&file, &LON_NAMES).map_err(mask_error)?;
    let lat = read_coord(&file, &LAT_NAMES).map_err(mask_error)?;
    let values = read_field(&file).map_err(mask_error)?;

    tracing::debug!(%path, n_lon = lon.len(), n_lat = lat.len(), "land-sea mask read");
    LandSeaMask::from_grid(lon, lat, values, shift, bbox)
}

#[cfg(not(feature = "netcdf"))]
pub fn load(
    path: &Utf8Path,
    _bbox: Option<&BoundingBox>,
    _shift: bool,
) -> Result<LandSeaMask, PolarLowsError> {
    Err(PolarLowsError::MaskReadError(format!(
        "{path}: NetCDF support is not enabled (build with the `netcdf` feature)"
    )))
}

#[cfg(feature = "netcdf")]
fn read_coord(file: &netcdf::File, names: &[&str]) -> Result<Vec<f64>, String> {
    for name in names {
        if let Some(var) = file.variable(name) {
            return var.get_values::<f64, _>(..).map_err(|e| e.to_string());
        }
    }
    Err(format!("missing coordinate {}", names.join(" or ")))
}

#[cfg(feature = "netcdf")]
fn attr_f64(var: &netcdf::Variable, name: &str) -> Option<f64> {
    var.attribute_value(name)
        .and_then(|r| r.ok())
        .and_then(|v| match v {
            netcdf::AttributeValue::Double(d) => Some(d),
            netcdf::AttributeValue::Float(f) => Some(f as f64),
            _ => None,
        })
}

#[cfg(feature = "netcdf")]
fn read_field(file: &netcdf::File) -> Result<Vec<f64>, String> {
    use netcdf::types::{IntType, NcVariableType};

    let is_coord = |name: &str| {
        LON_NAMES.contains(&name) || LAT_NAMES.contains(&name) || name == "time"
    };
    let var = file
        .variable("lsm")
        .or_else(|| file.variables().find(|v| !is_coord(&v.name())))
        .ok_or_else(|| "no data variable".to_string())?;
    check_dimensions(&var)?;

    let scale = attr_f64(&var, "scale_factor").unwrap_or(1.0);
    let offset = attr_f64(&var, "add_offset").unwrap_or(0.0);

    // Only packed shorts go through i16: the library would truncate floats silently.
    let values = match var.vartype() {
        NcVariableType::Int(IntType::I16) => var
            .get_values::<i16, _>(..)
            .map_err(|e| e.to_string())?
            .into_iter()
            .map(|v| v as f64 * scale + offset)
            .collect(),
        _ => var
            .get_values::<f64, _>(..)
            .map_err(|e| e.to_string())?
            .into_iter()
            .map(|v| v * scale + offset)
            .collect(),
    };
    Ok(values)
}

/// The field must be laid out `(…, latitude, longitude)` with every other dimension of
/// length 1.
#[cfg(feature = "netcdf")]
fn check_dimensions(var: &netcdf::Variable) -> Result<(), String> {
    let dims = var.dimensions();
    let position = |names: &[&str]| dims.iter().position(|d| names.contains(&d.name().as_str()));
    let (i_lat, i_lon) = match (position(&LAT_NAMES), position(&LON_NAMES)) {
        (Some(i_lat), Some(i_lon)) => (i_lat, i_lon),
        _ => {
            return Err(format!(
                "variable '{}' is not defined on latitude and longitude dimensions",
                var.name()
            ))
        }
    };
    if i_lat > i_lon {
        return Err(format!(
            "variable '{}' is stored (longitude, latitude), expected (latitude, longitude)",
            var.name()
        ));
    }
    if let Some(extra) = dims
        .iter()
        .enumerate()
        .find(|(i, d)| *i != i_lat && *i != i_lon && d.len() > 1)
    {
        return Err(format!(
            "variable '{}' has a non-singleton dimension '{}'",
            var.name(),
            extra.1.name()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod netcdf_reader_test {
    use super::*;

    #[test]
    fn test_missing_file() {
        let err = load(Utf8Path::new("/nonexistent/lsm.nc"), None, true).unwrap_err();
        assert!(matches!(err, PolarLowsError::MaskReadError(_)));
    }

    #[cfg(feature = "netcdf")]
    fn write_float_lsm(path: &Utf8Path, values: &[f32]) {
        let mut file = netcdf::create(path).unwrap();
        file.add_dimension("time", 1).unwrap();
        file.add_dimension("latitude", 2).unwrap();
        file.add_dimension("longitude", 3).unwrap();
        file.add_variable::<f64>("longitude", &["longitude"])
            .unwrap()
            .put_values(&[0.0, 0.25, 0.5], ..)
            .unwrap();
        file.add_variable::<f64>("latitude", &["latitude"])
            .unwrap()
            .put_values(&[70.0, 70.25], ..)
            .unwrap();
        file.add_variable::<f32>("lsm", &["time", "latitude", "longitude"])
            .unwrap()
            .put_values(values, ..)
            .unwrap();
    }

    #[cfg(feature = "netcdf")]
    #[test]
    fn test_fractional_float_cells_are_land() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8Path::from_path(dir.path()).unwrap().join("lsm.nc");
        write_float_lsm(&path, &[0.0, 0.3, 0.0, 1.0, 0.0, 0.0]);

        let mask = load(&path, None, false).unwrap();
        assert_eq!(mask.shape(), (2, 3));
        assert_eq!(mask.get(0, 1), Some(1));
        assert_eq!(mask.get(0, 0), Some(0));
        assert_eq!(mask.get(1, 0), Some(1));
    }

    #[cfg(feature = "netcdf")]
    #[test]
    fn test_packed_shorts_are_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8Path::from_path(dir.path()).unwrap().join("lsm.nc");
        {
            let mut file = netcdf::create(&path).unwrap();
            file.add_dimension("latitude", 1).unwrap();
            file.add_dimension("longitude", 2).unwrap();
            file.add_variable::<f64>("longitude", &["longitude"])
                .unwrap()
                .put_values(&[10.0, 10.25], ..)
                .unwrap();
            file.add_variable::<f64>("latitude", &["latitude"])
                .unwrap()
                .put_values(&[75.0], ..)
                .unwrap();
            let mut var = file.add_variable::<i16>("lsm", &["latitude", "longitude"]).unwrap();
            var.put_attribute("scale_factor", 0.5f64).unwrap();
            var.put_attribute("add_offset", 0.5f64).unwrap();
            var.put_values(&[-1i16, 1], ..).unwrap();
        }

        let mask = load(&path, None, false).unwrap();
        assert_eq!(mask.values(), &[0, 1]);
    }

    #[cfg(feature = "netcdf")]
    #[test]
    fn test_transposed_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8Path::from_path(dir.path()).unwrap().join("lsm.nc");
        {
            let mut file = netcdf::create(&path).unwrap();
            file.add_dimension("latitude", 2).unwrap();
            file.add_dimension("longitude", 3).unwrap();
            file.add_variable::<f64>("longitude", &["longitude"])
                .unwrap()
                .put_values(&[0.0, 0.25, 0.5], ..)
                .unwrap();
            file.add_variable::<f64>("latitude", &["latitude"])
                .unwrap()
                .put_values(&[70.0, 70.25], ..)
                .unwrap();
            file.add_variable::<f32>("lsm", &["longitude", "latitude"])
                .unwrap()
                .put_values(&[0.0f32; 6], ..)
                .unwrap();
        }

        assert!(matches!(
            load(&path, None, false),
            Err(PolarLowsError::MaskReadError(_))
        ));
    }
}
