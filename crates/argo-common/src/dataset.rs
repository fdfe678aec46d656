//! In-memory labeled array collection.
//!
//! A [`Dataset`] holds named dimensions, coordinate and data variables and
//! global attributes. Variable values are stored flat in row-major order over
//! the variable's dimensions. Variables are kept in `BTreeMap`s so iteration
//! is always alphabetical.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use ndarray::{ArrayD, ArrayViewD, Axis, ErrorKind, IxDyn, ShapeError};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ArgoError, ArgoResult};

/// Name of the flat point dimension and of its coordinate.
pub const POINT_DIM: &str = "index";

fn shape_error(name: &str, err: ShapeError) -> ArgoError {
    ArgoError::ShapeMismatch {
        name: name.to_string(),
        message: err.to_string(),
    }
}

/// Global or variable attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Number(f64),
    Text(String),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            AttrValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            AttrValue::Text(_) => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Number(n)
    }
}

/// Flat storage for a variable's values.
///
/// Missing values are `NaN` for floats, `None` for integers and times and
/// the empty string for text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Values {
    Float(#[serde(with = "nan_as_null")] Vec<f64>),
    Int(Vec<Option<i64>>),
    Text(Vec<String>),
    Time(Vec<Option<DateTime<Utc>>>),
}

impl Values {
    pub fn len(&self) -> usize {
        match self {
            Values::Float(v) => v.len(),
            Values::Int(v) => v.len(),
            Values::Text(v) => v.len(),
            Values::Time(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Values::Float(_) => "float",
            Values::Int(_) => "int",
            Values::Text(_) => "text",
            Values::Time(_) => "time",
        }
    }

    /// A run of missing values of the same kind as `self`.
    pub fn missing_like(&self, n: usize) -> Values {
        match self {
            Values::Float(_) => Values::Float(vec![f64::NAN; n]),
            Values::Int(_) => Values::Int(vec![None; n]),
            Values::Text(_) => Values::Text(vec![String::new(); n]),
            Values::Time(_) => Values::Time(vec![None; n]),
        }
    }

    /// Gather rows of an array of `shape` along its leading axis, in the
    /// order given by `rows`.
    pub fn select_rows(&self, shape: &[usize], rows: &[usize]) -> Result<Values, ShapeError> {
        Ok(match self {
            Values::Float(v) => Values::Float(select_rows(v, shape, rows)?),
            Values::Int(v) => Values::Int(select_rows(v, shape, rows)?),
            Values::Text(v) => Values::Text(select_rows(v, shape, rows)?),
            Values::Time(v) => Values::Time(select_rows(v, shape, rows)?),
        })
    }

    /// Join arrays along their leading axis; every piece must be the same
    /// kind and agree on the trailing axes.
    pub fn concatenate(pieces: &[(&Values, &[usize])]) -> Result<Values, String> {
        macro_rules! join_kind {
            ($variant:ident) => {{
                let parts = pieces
                    .iter()
                    .map(|(values, shape)| match values {
                        Values::$variant(v) => Ok((v.as_slice(), *shape)),
                        other => Err(format!(
                            "cannot append {} values to {}",
                            other.kind(),
                            pieces[0].0.kind()
                        )),
                    })
                    .collect::<Result<Vec<_>, String>>()?;
                Values::$variant(join_rows(&parts).map_err(|e| e.to_string())?)
            }};
        }

        let Some((first, _)) = pieces.first() else {
            return Err("nothing to concatenate".to_string());
        };
        Ok(match first {
            Values::Float(_) => join_kind!(Float),
            Values::Int(_) => join_kind!(Int),
            Values::Text(_) => join_kind!(Text),
            Values::Time(_) => join_kind!(Time),
        })
    }

    /// Rearrange an array of `shape` into point-major order; see
    /// [`PointLayout`].
    fn to_points(&self, shape: &[usize], layout: &PointLayout) -> Result<Values, ShapeError> {
        Ok(match self {
            Values::Float(v) => Values::Float(layout.apply(v, shape)?),
            Values::Int(v) => Values::Int(layout.apply(v, shape)?),
            Values::Text(v) => Values::Text(layout.apply(v, shape)?),
            Values::Time(v) => Values::Time(layout.apply(v, shape)?),
        })
    }

    /// Total order between two positions, missing values last.
    fn compare(&self, a: usize, b: usize) -> Ordering {
        fn missing_last<T: Ord>(x: &Option<T>, y: &Option<T>) -> Ordering {
            match (x, y) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }

        match self {
            Values::Float(v) => match (v[a].is_nan(), v[b].is_nan()) {
                (false, false) => v[a].partial_cmp(&v[b]).unwrap_or(Ordering::Equal),
                (false, true) => Ordering::Less,
                (true, false) => Ordering::Greater,
                (true, true) => Ordering::Equal,
            },
            Values::Int(v) => missing_last(&v[a], &v[b]),
            Values::Text(v) => v[a].cmp(&v[b]),
            Values::Time(v) => missing_last(&v[a], &v[b]),
        }
    }
}

/// Copy an array out in row-major order.
fn into_flat<T: Clone>(array: ArrayD<T>) -> Vec<T> {
    if array.is_standard_layout() {
        array.into_raw_vec()
    } else {
        array.iter().cloned().collect()
    }
}

fn select_rows<T: Clone>(data: &[T], shape: &[usize], rows: &[usize]) -> Result<Vec<T>, ShapeError> {
    let view = ArrayViewD::from_shape(IxDyn(shape), data)?;
    Ok(into_flat(view.select(Axis(0), rows)))
}

fn join_rows<T: Clone>(parts: &[(&[T], &[usize])]) -> Result<Vec<T>, ShapeError> {
    let views = parts
        .iter()
        .map(|(data, shape)| ArrayViewD::from_shape(IxDyn(shape), *data))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(into_flat(ndarray::concatenate(Axis(0), &views)?))
}

/// How one variable maps onto the flat point dimension.
///
/// The profile and level axes are permuted to the front, either one missing
/// from the variable is inserted with length one and broadcast, and the two
/// leading axes are then merged into the point axis.
struct PointLayout {
    order: Vec<usize>,
    has_profile: bool,
    has_level: bool,
    n_prof: usize,
    n_levels: usize,
    rest: Vec<usize>,
}

impl PointLayout {
    fn apply<T: Clone>(&self, data: &[T], shape: &[usize]) -> Result<Vec<T>, ShapeError> {
        let mut view =
            ArrayViewD::from_shape(IxDyn(shape), data)?.permuted_axes(IxDyn(&self.order));
        if !self.has_profile {
            view = view.insert_axis(Axis(0));
        }
        if !self.has_level {
            view = view.insert_axis(Axis(1));
        }

        let mut full_shape = vec![self.n_prof, self.n_levels];
        full_shape.extend(&self.rest);
        let full = view
            .broadcast(IxDyn(&full_shape))
            .ok_or_else(|| ShapeError::from_kind(ErrorKind::IncompatibleShape))?;

        let mut point_shape = vec![self.n_prof * self.n_levels];
        point_shape.extend(&self.rest);
        let points = full
            .as_standard_layout()
            .into_owned()
            .into_shape(IxDyn(&point_shape))?;
        Ok(into_flat(points))
    }
}

/// A named, dimensioned array with attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub dims: Vec<String>,
    pub values: Values,
    #[serde(default)]
    pub attrs: BTreeMap<String, AttrValue>,
}

impl Variable {
    pub fn new<S: Into<String>>(dims: impl IntoIterator<Item = S>, values: Values) -> Self {
        Self {
            dims: dims.into_iter().map(Into::into).collect(),
            values,
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    pub fn has_dim(&self, dim: &str) -> bool {
        self.dims.iter().any(|d| d == dim)
    }
}

/// Labeled array collection, the in-memory form of a netCDF file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub dims: BTreeMap<String, usize>,
    pub coords: BTreeMap<String, Variable>,
    pub data_vars: BTreeMap<String, Variable>,
    pub attrs: BTreeMap<String, AttrValue>,
    /// File the dataset was read from, if any
    #[serde(default)]
    pub source: Option<PathBuf>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a dimension, failing if it already exists with another length.
    pub fn add_dim(&mut self, name: &str, len: usize) -> ArgoResult<()> {
        match self.dims.get(name) {
            Some(&existing) if existing != len => Err(ArgoError::ShapeMismatch {
                name: name.to_string(),
                message: format!("dimension already has length {}, not {}", existing, len),
            }),
            _ => {
                self.dims.insert(name.to_string(), len);
                Ok(())
            }
        }
    }

    /// Number of elements a variable over `dims` must hold.
    fn expected_len(&self, name: &str, dims: &[String]) -> ArgoResult<usize> {
        dims.iter().try_fold(1usize, |acc, dim| {
            self.dims
                .get(dim)
                .map(|len| acc * len)
                .ok_or_else(|| ArgoError::ShapeMismatch {
                    name: name.to_string(),
                    message: format!("unknown dimension '{}'", dim),
                })
        })
    }

    fn check_shape(&self, name: &str, var: &Variable) -> ArgoResult<()> {
        let expected = self.expected_len(name, &var.dims)?;
        if var.values.len() != expected {
            return Err(ArgoError::ShapeMismatch {
                name: name.to_string(),
                message: format!(
                    "{} values for dimensions {:?} (expected {})",
                    var.values.len(),
                    var.dims,
                    expected
                ),
            });
        }
        Ok(())
    }

    pub fn insert_var(&mut self, name: &str, var: Variable) -> ArgoResult<()> {
        self.check_shape(name, &var)?;
        self.coords.remove(name);
        self.data_vars.insert(name.to_string(), var);
        Ok(())
    }

    pub fn insert_coord(&mut self, name: &str, var: Variable) -> ArgoResult<()> {
        self.check_shape(name, &var)?;
        self.data_vars.remove(name);
        self.coords.insert(name.to_string(), var);
        Ok(())
    }

    /// Look a variable up among coordinates first, then data variables.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.coords.get(name).or_else(|| self.data_vars.get(name))
    }

    pub fn variable_mut(&mut self, name: &str) -> Option<&mut Variable> {
        match self.coords.get_mut(name) {
            Some(var) => Some(var),
            None => self.data_vars.get_mut(name),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.coords.contains_key(name) || self.data_vars.contains_key(name)
    }

    /// Data variable names, alphabetically.
    pub fn data_var_names(&self) -> Vec<&str> {
        self.data_vars.keys().map(String::as_str).collect()
    }

    /// Rename a coordinate or data variable.
    pub fn rename_var(&mut self, from: &str, to: &str) -> ArgoResult<()> {
        if let Some(var) = self.coords.remove(from) {
            self.coords.insert(to.to_string(), var);
        } else if let Some(var) = self.data_vars.remove(from) {
            self.data_vars.insert(to.to_string(), var);
        } else {
            return Err(ArgoError::MissingVariable(from.to_string()));
        }
        Ok(())
    }

    /// Remove a variable, returning it if present.
    pub fn drop_var(&mut self, name: &str) -> Option<Variable> {
        self.data_vars
            .remove(name)
            .or_else(|| self.coords.remove(name))
    }

    /// Keep only the data variables for which `keep` returns true.
    pub fn retain_data_vars<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &Variable) -> bool,
    {
        self.data_vars.retain(|name, var| keep(name, var));
    }

    /// Promote an existing data variable to a coordinate.
    pub fn set_coord(&mut self, name: &str) -> bool {
        match self.data_vars.remove(name) {
            Some(var) => {
                self.coords.insert(name.to_string(), var);
                true
            }
            None => self.coords.contains_key(name),
        }
    }

    /// Length of the flat point dimension (0 when absent).
    pub fn point_count(&self) -> usize {
        self.dims.get(POINT_DIM).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.point_count() == 0 && self.data_vars.is_empty()
    }

    /// Lengths of the dimensions of `var`, in order.
    fn shape_of(&self, var: &Variable) -> Vec<usize> {
        var.dims
            .iter()
            .map(|d| self.dims.get(d).copied().unwrap_or(0))
            .collect()
    }

    /// Convert a profile-indexed collection into a point-indexed one.
    ///
    /// Every (profile, level) pair becomes one entry along [`POINT_DIM`].
    /// Variables over the profile dimension are repeated across levels,
    /// variables over the level dimension are tiled across profiles, and any
    /// other dimension a variable carries is kept after the point dimension.
    /// Variables touching neither dimension are carried over unchanged.
    pub fn profile_to_point(&self, profile_dim: &str, level_dim: &str) -> ArgoResult<Dataset> {
        let n_prof = self.dims.get(profile_dim).copied().unwrap_or(1);
        let n_levels = self.dims.get(level_dim).copied().unwrap_or(1);
        let n_points = n_prof * n_levels;

        let mut out = Dataset {
            attrs: self.attrs.clone(),
            source: self.source.clone(),
            ..Dataset::default()
        };
        for (name, &len) in &self.dims {
            if name != profile_dim && name != level_dim {
                out.add_dim(name, len)?;
            }
        }
        out.add_dim(POINT_DIM, n_points)?;
        out.insert_coord(
            POINT_DIM,
            Variable::new([POINT_DIM], Values::Int((0..n_points as i64).map(Some).collect())),
        )?;

        for (name, var) in &self.coords {
            let reshaped = self.reshape_var(name, var, profile_dim, level_dim)?;
            out.insert_coord(name, reshaped)?;
        }
        for (name, var) in &self.data_vars {
            let reshaped = self.reshape_var(name, var, profile_dim, level_dim)?;
            out.insert_var(name, reshaped)?;
        }

        Ok(out)
    }

    fn reshape_var(
        &self,
        name: &str,
        var: &Variable,
        profile_dim: &str,
        level_dim: &str,
    ) -> ArgoResult<Variable> {
        let prof_axis = var.dims.iter().position(|d| d == profile_dim);
        let level_axis = var.dims.iter().position(|d| d == level_dim);
        if prof_axis.is_none() && level_axis.is_none() {
            return Ok(var.clone());
        }

        let shape = self.shape_of(var);
        // Remaining dimensions keep their relative order after the point dim.
        let other: Vec<usize> = (0..var.dims.len())
            .filter(|&i| Some(i) != prof_axis && Some(i) != level_axis)
            .collect();
        let layout = PointLayout {
            order: prof_axis.into_iter().chain(level_axis).chain(other.iter().copied()).collect(),
            has_profile: prof_axis.is_some(),
            has_level: level_axis.is_some(),
            n_prof: self.dims.get(profile_dim).copied().unwrap_or(1),
            n_levels: self.dims.get(level_dim).copied().unwrap_or(1),
            rest: other.iter().map(|&i| shape[i]).collect(),
        };

        let mut dims = vec![POINT_DIM.to_string()];
        dims.extend(other.iter().map(|&i| var.dims[i].clone()));
        Ok(Variable {
            dims,
            values: var
                .values
                .to_points(&shape, &layout)
                .map_err(|e| shape_error(name, e))?,
            attrs: var.attrs.clone(),
        })
    }

    /// Concatenate collections along `dim`.
    ///
    /// Variables missing from some inputs are padded with missing values.
    /// Variables whose other dimensions or kinds disagree between inputs are
    /// dropped with a warning. Variables not over `dim` and global attributes
    /// are taken from the first input.
    pub fn concat(datasets: Vec<Dataset>, dim: &str) -> ArgoResult<Dataset> {
        let first = datasets
            .first()
            .ok_or_else(|| ArgoError::EmptyRequest("nothing to concatenate".to_string()))?;

        let mut out = Dataset {
            attrs: first.attrs.clone(),
            ..Dataset::default()
        };
        for ds in &datasets {
            for (name, &len) in &ds.dims {
                if name != dim && !out.dims.contains_key(name) {
                    out.dims.insert(name.clone(), len);
                }
            }
        }
        let total: usize = datasets.iter().map(|ds| ds.dims.get(dim).copied().unwrap_or(0)).sum();
        out.dims.insert(dim.to_string(), total);

        let coord_names: BTreeSet<&String> = datasets.iter().flat_map(|ds| ds.coords.keys()).collect();
        let var_names: BTreeSet<&String> = datasets
            .iter()
            .flat_map(|ds| ds.data_vars.keys())
            .filter(|name| !coord_names.contains(name))
            .collect();

        for (names, as_coord) in [(coord_names, true), (var_names, false)] {
            for name in names {
                let merged = match Self::concat_var(&datasets, name, dim)? {
                    Some(var) => var,
                    None => continue,
                };
                let inserted = if as_coord {
                    out.insert_coord(name, merged)
                } else {
                    out.insert_var(name, merged)
                };
                if let Err(e) = inserted {
                    warn!(variable = %name, error = %e, "Dropping variable while concatenating");
                }
            }
        }

        Ok(out)
    }

    fn concat_var(datasets: &[Dataset], name: &str, dim: &str) -> ArgoResult<Option<Variable>> {
        let Some((template_ds, template)) = datasets
            .iter()
            .find_map(|ds| ds.variable(name).map(|var| (ds, var)))
        else {
            return Ok(None);
        };

        if template.dims.first().map(String::as_str) != Some(dim) {
            return Ok(Some(template.clone()));
        }

        let inner_shape: Vec<usize> = template_ds.shape_of(template).into_iter().skip(1).collect();
        let inner_len: usize = inner_shape.iter().product();

        let mut pieces: Vec<(Cow<'_, Values>, Vec<usize>)> = Vec::with_capacity(datasets.len());
        for ds in datasets {
            let n = ds.dims.get(dim).copied().unwrap_or(0);
            let mut shape = vec![n];
            shape.extend(&inner_shape);
            let values = match ds.variable(name) {
                Some(var) if var.dims == template.dims && ds.shape_of(var) == shape => {
                    Cow::Borrowed(&var.values)
                }
                Some(_) => {
                    warn!(variable = %name, "Dropping variable with mismatched dimensions while concatenating");
                    return Ok(None);
                }
                None => Cow::Owned(template.values.missing_like(n * inner_len)),
            };
            pieces.push((values, shape));
        }

        let pieces: Vec<(&Values, &[usize])> = pieces
            .iter()
            .map(|(values, shape)| (values.as_ref(), shape.as_slice()))
            .collect();
        match Values::concatenate(&pieces) {
            Ok(values) => Ok(Some(Variable {
                dims: template.dims.clone(),
                values,
                attrs: template.attrs.clone(),
            })),
            Err(message) => {
                warn!(variable = %name, %message, "Dropping variable with mismatched kinds while concatenating");
                Ok(None)
            }
        }
    }

    /// Stable sort of every variable along `dim` by the values of `key`.
    ///
    /// `key` must be one-dimensional over `dim`; missing values sort last.
    pub fn sort_by(&mut self, key: &str, dim: &str) -> ArgoResult<()> {
        let key_var = self
            .variable(key)
            .ok_or_else(|| ArgoError::MissingVariable(key.to_string()))?;
        if key_var.dims.len() != 1 || key_var.dims[0] != dim {
            return Err(ArgoError::ShapeMismatch {
                name: key.to_string(),
                message: format!("sort key must be one-dimensional over '{}'", dim),
            });
        }

        let n = self.dims.get(dim).copied().unwrap_or(0);
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| key_var.values.compare(a, b));

        let shapes: BTreeMap<String, Vec<usize>> = self
            .coords
            .iter()
            .chain(self.data_vars.iter())
            .filter(|(_, var)| var.dims.first().map(String::as_str) == Some(dim))
            .map(|(name, var)| (name.clone(), self.shape_of(var)))
            .collect();

        for (name, var) in self.coords.iter_mut().chain(self.data_vars.iter_mut()) {
            let Some(shape) = shapes.get(name) else {
                continue;
            };
            var.values = var
                .values
                .select_rows(shape, &order)
                .map_err(|e| shape_error(name, e))?;
        }

        Ok(())
    }

    /// Rewrite the point coordinate as `0..n`.
    pub fn renumber_points(&mut self) -> ArgoResult<()> {
        let n = self.point_count();
        self.insert_coord(
            POINT_DIM,
            Variable::new([POINT_DIM], Values::Int((0..n as i64).map(Some).collect())),
        )
    }
}

/// Serialize floats with NaN as JSON null.
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        let opts: Vec<Option<f64>> = values
            .iter()
            .map(|v| if v.is_nan() { None } else { Some(*v) })
            .collect();
        opts.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let opts: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
        Ok(opts.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_three() -> Dataset {
        let mut ds = Dataset::new();
        ds.add_dim("N_PROF", 2).unwrap();
        ds.add_dim("N_LEVELS", 3).unwrap();
        ds.insert_var(
            "PRES",
            Variable::new(["N_PROF", "N_LEVELS"], Values::Float(vec![1., 2., 3., 10., 20., 30.])),
        )
        .unwrap();
        ds.insert_var("CYCLE_NUMBER", Variable::new(["N_PROF"], Values::Int(vec![Some(1), Some(2)])))
            .unwrap();
        ds
    }

    #[test]
    fn test_insert_rejects_bad_shape() {
        let mut ds = two_by_three();
        let result = ds.insert_var("BAD", Variable::new(["N_PROF"], Values::Float(vec![1.0])));
        assert!(matches!(result, Err(ArgoError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_profile_to_point_broadcasts_profile_vars() {
        let points = two_by_three().profile_to_point("N_PROF", "N_LEVELS").unwrap();
        assert_eq!(points.point_count(), 6);
        assert_eq!(
            points.data_vars["PRES"].values,
            Values::Float(vec![1., 2., 3., 10., 20., 30.])
        );
        assert_eq!(
            points.data_vars["CYCLE_NUMBER"].values,
            Values::Int(vec![Some(1), Some(1), Some(1), Some(2), Some(2), Some(2)])
        );
        assert!(!points.dims.contains_key("N_PROF"));
    }

    #[test]
    fn test_profile_to_point_keeps_extra_dims() {
        let mut ds = two_by_three();
        ds.add_dim("N_PARAM", 2).unwrap();
        ds.insert_var(
            "STATION_PARAMETERS",
            Variable::new(
                ["N_PROF", "N_PARAM"],
                Values::Text(vec!["PRES".into(), "TEMP".into(), "PRES".into(), "PSAL".into()]),
            ),
        )
        .unwrap();

        let points = ds.profile_to_point("N_PROF", "N_LEVELS").unwrap();
        let var = &points.data_vars["STATION_PARAMETERS"];
        assert_eq!(var.dims, vec!["index", "N_PARAM"]);
        match &var.values {
            Values::Text(v) => {
                assert_eq!(v.len(), 12);
                assert_eq!(&v[0..2], &["PRES".to_string(), "TEMP".to_string()]);
                assert_eq!(&v[6..8], &["PRES".to_string(), "PSAL".to_string()]);
            }
            other => panic!("unexpected values {:?}", other),
        }
    }

    #[test]
    fn test_sort_by_moves_all_point_vars() {
        let mut ds = Dataset::new();
        ds.add_dim(POINT_DIM, 3).unwrap();
        ds.insert_var("KEY", Variable::new([POINT_DIM], Values::Float(vec![3.0, f64::NAN, 1.0])))
            .unwrap();
        ds.insert_var(
            "LABEL",
            Variable::new([POINT_DIM], Values::Text(vec!["c".into(), "n".into(), "a".into()])),
        )
        .unwrap();

        ds.sort_by("KEY", POINT_DIM).unwrap();
        assert_eq!(
            ds.data_vars["LABEL"].values,
            Values::Text(vec!["a".into(), "c".into(), "n".into()])
        );
    }

    #[test]
    fn test_concat_pads_missing_variables() {
        let a = two_by_three().profile_to_point("N_PROF", "N_LEVELS").unwrap();
        let mut b = a.clone();
        b.drop_var("CYCLE_NUMBER");

        let merged = Dataset::concat(vec![a, b], POINT_DIM).unwrap();
        assert_eq!(merged.point_count(), 12);
        match &merged.data_vars["CYCLE_NUMBER"].values {
            Values::Int(v) => {
                assert_eq!(v.len(), 12);
                assert!(v[6..].iter().all(Option::is_none));
            }
            other => panic!("unexpected values {:?}", other),
        }
    }

    #[test]
    fn test_profile_to_point_tiles_level_vars_and_transposed_layouts() {
        let mut ds = two_by_three();
        ds.insert_var("LEVEL_FLAG", Variable::new(["N_LEVELS"], Values::Int(vec![Some(7), None, Some(9)])))
            .unwrap();
        // Stored level-major: TEMP[level][profile]
        ds.insert_var(
            "TEMP",
            Variable::new(["N_LEVELS", "N_PROF"], Values::Float(vec![1., 10., 2., 20., 3., 30.])),
        )
        .unwrap();

        let points = ds.profile_to_point("N_PROF", "N_LEVELS").unwrap();
        assert_eq!(
            points.data_vars["LEVEL_FLAG"].values,
            Values::Int(vec![Some(7), None, Some(9), Some(7), None, Some(9)])
        );
        assert_eq!(
            points.data_vars["TEMP"].values,
            points.data_vars["PRES"].values
        );
        assert_eq!(points.data_vars["TEMP"].dims, vec![POINT_DIM]);
    }

    #[test]
    fn test_sort_by_keeps_trailing_axes_together() {
        let mut ds = Dataset::new();
        ds.add_dim(POINT_DIM, 3).unwrap();
        ds.add_dim("N_PARAM", 2).unwrap();
        ds.insert_var("KEY", Variable::new([POINT_DIM], Values::Int(vec![Some(2), None, Some(1)])))
            .unwrap();
        ds.insert_var(
            "PAIR",
            Variable::new([POINT_DIM, "N_PARAM"], Values::Float(vec![2., 2.5, 9., 9.5, 1., 1.5])),
        )
        .unwrap();

        ds.sort_by("KEY", POINT_DIM).unwrap();
        assert_eq!(
            ds.data_vars["PAIR"].values,
            Values::Float(vec![1., 1.5, 2., 2.5, 9., 9.5])
        );
        assert_eq!(
            ds.data_vars["KEY"].values,
            Values::Int(vec![Some(1), Some(2), None])
        );
    }

    #[test]
    fn test_concat_drops_variables_of_mismatched_kind() {
        let a = two_by_three().profile_to_point("N_PROF", "N_LEVELS").unwrap();
        let mut b = a.clone();
        b.data_vars.get_mut("PRES").unwrap().values =
            Values::Text(vec![String::new(); 6]);

        let merged = Dataset::concat(vec![a, b], POINT_DIM).unwrap();
        assert!(!merged.data_vars.contains_key("PRES"));
        assert_eq!(merged.data_vars["CYCLE_NUMBER"].values.len(), 12);
    }

    #[test]
    fn test_float_nan_survives_json() {
        let values = Values::Float(vec![1.5, f64::NAN]);
        let json = serde_json::to_string(&values).unwrap();
        assert!(json.contains("null"));
        match serde_json::from_str::<Values>(&json).unwrap() {
            Values::Float(v) => {
                assert_eq!(v[0], 1.5);
                assert!(v[1].is_nan());
            }
            other => panic!("unexpected values {:?}", other),
        }
    }
}
