//! Profile filters.
//!
//! All filters leave their input untouched and return new collections.

use argo_common::DataMode;
use serde_json::Value;

use crate::client::Profile;
use crate::table::MEASUREMENT_KEY;

/// Keep profiles whose `DATA_MODE` is `mode`.
pub fn filter_data_mode(profiles: &[Profile], mode: DataMode) -> Vec<Profile> {
    profiles
        .iter()
        .filter(|p| p.get("DATA_MODE").and_then(Value::as_str) == Some(mode.as_str()))
        .cloned()
        .collect()
}

/// Keep profiles whose `key` (e.g. `date_qc`, `position_qc`) equals `value`.
///
/// Flags stored as strings are compared by their integer value.
pub fn filter_qc(profiles: &[Profile], key: &str, value: i64) -> Vec<Profile> {
    profiles
        .iter()
        .filter(|p| qc_flag(p.get(key)) == Some(value))
        .cloned()
        .collect()
}

fn qc_flag(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Copies of `profiles` whose measurement entries no longer carry `keys`.
pub fn filter_variables(profiles: &[Profile], keys: &[&str]) -> Vec<Profile> {
    profiles
        .iter()
        .map(|profile| {
            let mut profile = profile.clone();
            if let Some(Value::Array(measurements)) = profile.get_mut(MEASUREMENT_KEY) {
                for meas in measurements.iter_mut() {
                    if let Value::Object(fields) = meas {
                        for key in keys {
                            fields.remove(*key);
                        }
                    }
                }
            }
            profile
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(value: Value) -> Profile {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_filter_qc_accepts_string_flags() {
        let profiles = vec![
            profile(json!({"position_qc": 1})),
            profile(json!({"position_qc": "1"})),
            profile(json!({"position_qc": 4})),
            profile(json!({})),
        ];
        assert_eq!(filter_qc(&profiles, "position_qc", 1).len(), 2);
    }

    #[test]
    fn test_filter_variables_leaves_input_alone() {
        let profiles = vec![profile(json!({
            "measurements": [{"pres": 1.0, "temp": 2.0, "psal": 3.0}]
        }))];
        let filtered = filter_variables(&profiles, &["temp"]);

        assert_eq!(filtered[0]["measurements"][0], json!({"pres": 1.0, "psal": 3.0}));
        assert_eq!(profiles[0]["measurements"][0]["temp"], json!(2.0));
    }
}
