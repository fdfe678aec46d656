//! Native netCDF reading using the netcdf library.
//!
//! The whole file is materialized into an in-memory [`Dataset`] and the
//! handle is dropped before returning, so loads running on different
//! threads share nothing.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Once;

use argo_common::{ArgoError, ArgoResult, ArrayFileReader, AttrValue, Dataset, Values, Variable};
use netcdf::types::NcVariableType;
use netcdf::AttributeValue;
use tracing::{debug, instrument};

use crate::decode::{decode_times, TimeUnits};
use crate::error::{NetCdfError, NetCdfResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// Probing optional attributes makes the HDF5 C library print diagnostics
/// even though the missing attribute is handled. Safe to call repeatedly.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and null handlers are a
        // documented way to disable error output.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Reads Argo netCDF files with CF time decoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetCdfReader;

impl NetCdfReader {
    pub fn new() -> Self {
        Self
    }

    fn read(&self, path: &Path) -> NetCdfResult<Dataset> {
        let file = netcdf::open(path)?;

        let mut ds = Dataset::new();
        ds.source = Some(path.to_path_buf());
        for dim in file.dimensions() {
            ds.dims.insert(dim.name(), dim.len());
        }

        for var in file.variables() {
            let name = var.name();
            match self.read_variable(&var)? {
                Some(variable) => {
                    ds.insert_var(&name, variable)
                        .map_err(|e| NetCdfError::InvalidFormat(e.to_string()))?;
                }
                None => debug!(variable = %name, "Skipping variable of unsupported type"),
            }
        }

        for attr in file.attributes() {
            if let Some(value) = attr.value().ok().and_then(to_attr_value) {
                ds.attrs.insert(attr.name().to_string(), value);
            }
        }

        Ok(ds)
    }

    fn read_variable(&self, var: &netcdf::Variable) -> NetCdfResult<Option<Variable>> {
        let name = var.name();
        let mut dims: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
        let attrs = read_attrs(var);

        let values = match var.vartype() {
            NcVariableType::Char => {
                let (values, collapsed) = read_chars(var)?;
                if collapsed {
                    dims.pop();
                }
                values
            }
            NcVariableType::Int(_) => {
                let raw = var.get::<i64, _>(netcdf::Extents::All)?;
                let fill = number_attr(&attrs, "_FillValue").map(|f| f as i64);
                let ints: Vec<Option<i64>> = raw
                    .iter()
                    .map(|&v| if Some(v) == fill { None } else { Some(v) })
                    .collect();
                if let Some(units) = time_units(&attrs) {
                    let floats: Vec<f64> = ints
                        .iter()
                        .map(|v| v.map_or(f64::NAN, |v| v as f64))
                        .collect();
                    return Ok(Some(Variable {
                        dims,
                        values: Values::Time(decode_times(&name, units, &floats)?),
                        attrs,
                    }));
                }
                Values::Int(ints)
            }
            NcVariableType::Float(_) => {
                let raw = var.get::<f64, _>(netcdf::Extents::All)?;
                let fill = number_attr(&attrs, "_FillValue");
                let scale = number_attr(&attrs, "scale_factor").unwrap_or(1.0);
                let offset = number_attr(&attrs, "add_offset").unwrap_or(0.0);
                let floats: Vec<f64> = raw
                    .iter()
                    .map(|&v| {
                        if Some(v) == fill {
                            f64::NAN
                        } else {
                            v * scale + offset
                        }
                    })
                    .collect();
                if let Some(units) = time_units(&attrs) {
                    return Ok(Some(Variable {
                        dims,
                        values: Values::Time(decode_times(&name, units, &floats)?),
                        attrs,
                    }));
                }
                Values::Float(floats)
            }
            _ => return Ok(None),
        };

        Ok(Some(Variable {
            dims,
            values,
            attrs,
        }))
    }
}

impl ArrayFileReader for NetCdfReader {
    #[instrument(skip(self), fields(path = %path.display()))]
    fn open(&self, path: &Path) -> ArgoResult<Dataset> {
        if !path.exists() {
            return Err(ArgoError::FileNotFound(path.display().to_string()));
        }
        silence_hdf5_errors();

        let ds = self.read(path)?;
        debug!(
            dims = ds.dims.len(),
            variables = ds.data_vars.len(),
            "Loaded netCDF file"
        );
        Ok(ds)
    }
}

/// Whether the trailing dimension of a char variable is a string length.
fn is_string_dim(name: &str) -> bool {
    name.starts_with("STRING") || name == "DATE_TIME"
}

/// Read a char variable, collapsing a trailing string-length dimension.
fn read_chars(var: &netcdf::Variable) -> NetCdfResult<(Values, bool)> {
    let len: usize = var.dimensions().iter().map(|d| d.len()).product();
    let mut buf = vec![0u8; len];
    var.get_raw_values(&mut buf, ..)?;

    let width = var
        .dimensions()
        .last()
        .filter(|d| is_string_dim(&d.name()))
        .map(|d| d.len());

    let text = match width {
        Some(0) => return Ok((Values::Text(Vec::new()), true)),
        Some(width) => buf.chunks(width).map(bytes_to_string).collect(),
        None => buf.chunks(1).map(bytes_to_string).collect(),
    };
    Ok((Values::Text(text), width.is_some()))
}

fn bytes_to_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

fn read_attrs(var: &netcdf::Variable) -> BTreeMap<String, AttrValue> {
    var.attributes()
        .filter_map(|attr| {
            let value = attr.value().ok().and_then(to_attr_value)?;
            Some((attr.name().to_string(), value))
        })
        .collect()
}

fn to_attr_value(value: AttributeValue) -> Option<AttrValue> {
    match value {
        AttributeValue::Str(s) => Some(AttrValue::Text(s)),
        AttributeValue::Strs(v) => Some(AttrValue::Text(v.join(" "))),
        other => f64::try_from(other).ok().map(AttrValue::Number),
    }
}

fn number_attr(attrs: &BTreeMap<String, AttrValue>, name: &str) -> Option<f64> {
    attrs.get(name).and_then(AttrValue::as_number)
}

fn time_units(attrs: &BTreeMap<String, AttrValue>) -> Option<&str> {
    attrs
        .get("units")
        .and_then(AttrValue::as_text)
        .filter(|units| TimeUnits::parse(units).is_some())
}
