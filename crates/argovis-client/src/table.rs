//! Flattening profile documents into rows.
//!
//! Each measurement entry of a profile becomes one row, and every
//! non-nested field of the profile is repeated on each of its rows.

use std::collections::HashSet;

use argo_common::dataset::POINT_DIM;
use argo_common::{ArgoResult, Dataset, Values, Variable};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::client::Profile;

/// Default key holding per-level measurements.
pub const MEASUREMENT_KEY: &str = "measurements";

/// Keys never broadcast as profile metadata.
const NESTED_KEYS: [&str; 2] = ["measurements", "bgcMeas"];

/// Rows of heterogeneous JSON values with columns in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileTable {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

impl ProfileTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column; `None` where a row lacks it.
    pub fn column(&self, name: &str) -> Vec<Option<&Value>> {
        self.rows.iter().map(|row| row.get(name)).collect()
    }

    fn push(&mut self, row: Map<String, Value>, seen: &mut HashSet<String>, order: &[String]) {
        for key in order {
            if seen.insert(key.clone()) {
                self.columns.push(key.clone());
            }
        }
        self.rows.push(row);
    }

    /// Convert to a point collection, one entry per row along `index`.
    pub fn to_dataset(&self) -> ArgoResult<Dataset> {
        let n = self.rows.len();
        let mut ds = Dataset::new();
        ds.add_dim(POINT_DIM, n)?;
        ds.insert_coord(
            POINT_DIM,
            Variable::new([POINT_DIM], Values::Int((0..n as i64).map(Some).collect())),
        )?;
        for name in &self.columns {
            let column = self.column(name);
            ds.insert_var(name, Variable::new([POINT_DIM], infer_values(&column)))?;
        }
        Ok(ds)
    }
}

/// Flatten `profiles` into one row per entry under `measurement_key`.
///
/// Profiles without that key contribute no rows.
pub fn to_table(profiles: &[Profile], measurement_key: &str) -> ProfileTable {
    let mut table = ProfileTable::default();
    let mut seen = HashSet::new();

    for profile in profiles {
        let meta: Vec<(&String, &Value)> = profile
            .iter()
            .filter(|(key, _)| !NESTED_KEYS.contains(&key.as_str()))
            .collect();
        let Some(Value::Array(measurements)) = profile.get(measurement_key) else {
            continue;
        };

        for meas in measurements {
            let mut row = match meas {
                Value::Object(fields) => fields.clone(),
                _ => Map::new(),
            };
            let mut order: Vec<String> = row.keys().cloned().collect();
            for (key, value) in &meta {
                row.insert((*key).clone(), (*value).clone());
                order.push((*key).clone());
            }
            table.push(row, &mut seen, &order);
        }
    }

    table
}

/// `to_table` with the default measurement key, then array conversion.
pub fn to_dataset(profiles: &[Profile]) -> ArgoResult<Dataset> {
    to_table(profiles, MEASUREMENT_KEY).to_dataset()
}

/// Pick the narrowest value kind that holds every non-missing entry.
fn infer_values(column: &[Option<&Value>]) -> Values {
    let present: Vec<&Value> = column
        .iter()
        .flatten()
        .copied()
        .filter(|v| !v.is_null())
        .collect();

    let all = |pred: fn(&Value) -> bool| present.iter().all(|v| pred(v));

    if present.is_empty() {
        return Values::Float(vec![f64::NAN; column.len()]);
    }
    if all(|v| v.is_i64() || v.is_u64() || v.is_boolean()) {
        return Values::Int(
            column
                .iter()
                .map(|v| v.and_then(|v| v.as_i64().or_else(|| v.as_bool().map(i64::from))))
                .collect(),
        );
    }
    if all(Value::is_number) {
        return Values::Float(
            column
                .iter()
                .map(|v| v.and_then(Value::as_f64).unwrap_or(f64::NAN))
                .collect(),
        );
    }
    if all(|v| v.as_str().map_or(false, |s| parse_time(s).is_some())) {
        return Values::Time(
            column
                .iter()
                .map(|v| v.and_then(Value::as_str).and_then(parse_time))
                .collect(),
        );
    }
    Values::Text(
        column
            .iter()
            .map(|v| match v {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            })
            .collect(),
    )
}

fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_infer_int_with_gaps() {
        let a = json!(1);
        let b = json!(3);
        assert_eq!(
            infer_values(&[Some(&a), None, Some(&b)]),
            Values::Int(vec![Some(1), None, Some(3)])
        );
    }

    #[test]
    fn test_infer_mixed_numbers_as_float() {
        let a = json!(1);
        let b = json!(2.5);
        match infer_values(&[Some(&a), Some(&b), None]) {
            Values::Float(v) => {
                assert_eq!(&v[..2], &[1.0, 2.5]);
                assert!(v[2].is_nan());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_infer_dates_as_time() {
        let a = json!("2017-09-16T04:01:00.000Z");
        assert!(matches!(infer_values(&[Some(&a)]), Values::Time(_)));
    }

    #[test]
    fn test_infer_nested_as_json_text() {
        let a = json!(["pres", "temp"]);
        let b = json!("x");
        assert_eq!(
            infer_values(&[Some(&a), Some(&b)]),
            Values::Text(vec![r#"["pres","temp"]"#.to_string(), "x".to_string()])
        );
    }
}
