//! Common test fixtures for Argo fetcher tests.

use serde_json::{json, Value};

/// Float identifiers used across tests.
pub mod floats {
    /// Core float filed under aoml
    pub const AOML_FLOAT: u32 = 3900737;

    /// Core float filed under coriolis
    pub const CORIOLIS_FLOAT: u32 = 4901653;

    /// BGC float
    pub const BGC_FLOAT: u32 = 6902746;

    /// A float that no fixture tree contains
    pub const MISSING_FLOAT: u32 = 1234567;

    pub const DACS: [&str; 2] = ["aoml", "coriolis"];
}

/// Common selection values.
pub mod selections {
    /// North Pacific box, closed ring
    pub const PACIFIC_SHAPE: &str =
        "[[[168.6,21.7],[168.6,37.7],[-145.9,37.7],[-145.9,21.7],[168.6,21.7]]]";

    pub const START_DATE: &str = "2017-09-15";
    pub const END_DATE: &str = "2017-09-30";
}

/// An Argovis-shaped profile document with `n_measurements` levels.
///
/// Measurement `i` has `pres = 10 * (i + 1)`, `temp = 20 - i`, `psal = 35`.
pub fn argovis_profile(wmo: u32, cycle: u32, n_measurements: usize) -> Value {
    let measurements: Vec<Value> = (0..n_measurements)
        .map(|i| {
            json!({
                "pres": 10.0 * (i as f64 + 1.0),
                "temp": 20.0 - i as f64,
                "psal": 35.0,
            })
        })
        .collect();

    json!({
        "_id": format!("{}_{}", wmo, cycle),
        "platform_number": wmo.to_string(),
        "cycle_number": cycle,
        "date": "2017-09-16T04:01:00.000Z",
        "date_qc": 1,
        "lat": 21.5,
        "lon": -158.2,
        "position_qc": 1,
        "DATA_MODE": "R",
        "dac": "aoml",
        "station_parameters": ["pres", "temp", "psal"],
        "measurements": measurements,
    })
}

/// Same as [`argovis_profile`] with data mode and QC overrides.
pub fn argovis_profile_with(
    wmo: u32,
    cycle: u32,
    n_measurements: usize,
    data_mode: &str,
    position_qc: i64,
) -> Value {
    let mut profile = argovis_profile(wmo, cycle, n_measurements);
    profile["DATA_MODE"] = json!(data_mode);
    profile["position_qc"] = json!(position_qc);
    profile
}
