//! Post-load filters for local collections.

use argo_common::variables::is_standard;
use argo_common::Dataset;
use tracing::debug;

/// Which data variables [`filter_variables`] keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariableSelection {
    /// The standard Argo variable list
    #[default]
    Standard,
    /// Everything
    All,
}

/// Data-mode filtering is not applied to local collections yet.
pub fn filter_data_mode(ds: Dataset) -> Dataset {
    ds
}

/// QC filtering is not applied to local collections yet.
pub fn filter_qc(ds: Dataset) -> Dataset {
    ds
}

pub fn filter_variables(mut ds: Dataset, selection: VariableSelection) -> Dataset {
    if selection == VariableSelection::Standard {
        let before = ds.data_vars.len();
        ds.retain_data_vars(|name, _| is_standard(name));
        debug!(dropped = before - ds.data_vars.len(), "Kept standard variables");
    }
    ds
}

#[cfg(test)]
mod tests {
    use super::*;
    use argo_common::{Values, Variable};

    #[test]
    fn test_standard_selection_drops_extras() {
        let mut ds = Dataset::new();
        ds.add_dim("index", 1).unwrap();
        for name in ["TEMP", "PSAL", "STATION_PARAMETERS"] {
            ds.insert_var(name, Variable::new(["index"], Values::Float(vec![1.0])))
                .unwrap();
        }

        let kept = filter_variables(ds.clone(), VariableSelection::Standard);
        assert_eq!(kept.data_var_names(), vec!["PSAL", "TEMP"]);

        let all = filter_variables(ds, VariableSelection::All);
        assert_eq!(all.data_vars.len(), 3);
    }
}
