//! Argo type-casting pass.
//!
//! Raw files store identifiers as padded character arrays and counters as
//! floats. This pass trims text, turns identifier and counter variables into
//! integers and turns QC flag strings into integer codes when every flag
//! parses.

use argo_common::{ArgoResult, Dataset, TypeCaster, Values, Variable};
use tracing::debug;

/// Text variables that hold integer identifiers.
const INTEGER_TEXT: [&str; 2] = ["PLATFORM_NUMBER", "WMO_INST_TYPE"];

/// Float variables that hold integer counters.
const INTEGER_FLOAT: [&str; 2] = ["CYCLE_NUMBER", "CONFIG_MISSION_NUMBER"];

/// Casts raw Argo variables to their conventional types.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgoTypeCaster;

impl TypeCaster for ArgoTypeCaster {
    fn cast(&self, mut ds: Dataset) -> ArgoResult<Dataset> {
        for (name, var) in ds.coords.iter_mut().chain(ds.data_vars.iter_mut()) {
            cast_variable(name, var);
        }
        Ok(ds)
    }
}

fn cast_variable(name: &str, var: &mut Variable) {
    let casted = match &var.values {
        Values::Text(v) => {
            let trimmed: Vec<String> = v.iter().map(|s| s.trim().to_string()).collect();
            if INTEGER_TEXT.contains(&name) || name.ends_with("_QC") {
                match parse_ints(&trimmed) {
                    Some(ints) => Values::Int(ints),
                    None => {
                        debug!(variable = %name, "Leaving unparseable flags as text");
                        Values::Text(trimmed)
                    }
                }
            } else {
                Values::Text(trimmed)
            }
        }
        Values::Float(v) if INTEGER_FLOAT.contains(&name) => Values::Int(
            v.iter()
                .map(|x| if x.is_finite() { Some(x.round() as i64) } else { None })
                .collect(),
        ),
        _ => return,
    };
    var.values = casted;
}

/// Parse every non-empty entry as an integer; empty entries become missing.
fn parse_ints(values: &[String]) -> Option<Vec<Option<i64>>> {
    values
        .iter()
        .map(|s| {
            if s.is_empty() {
                Some(None)
            } else {
                s.parse::<i64>().ok().map(Some)
            }
        })
        .collect()
}
