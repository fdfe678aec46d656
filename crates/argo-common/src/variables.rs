//! Argo variable names.

/// Profile dimension of multi-profile files.
pub const PROFILE_DIM: &str = "N_PROF";

/// Vertical level dimension of multi-profile files.
pub const LEVEL_DIM: &str = "N_LEVELS";

/// Variables promoted to coordinates once a file is flattened.
pub const POINT_COORDS: [&str; 3] = ["TIME", "LATITUDE", "LONGITUDE"];

/// Variables kept by the "standard" variable filter.
pub const STANDARD_VARIABLES: [&str; 27] = [
    "DATA_MODE",
    "LATITUDE",
    "LONGITUDE",
    "POSITION_QC",
    "DIRECTION",
    "PLATFORM_NUMBER",
    "CYCLE_NUMBER",
    "PRES",
    "TEMP",
    "PSAL",
    "PRES_QC",
    "TEMP_QC",
    "PSAL_QC",
    "PRES_ADJUSTED",
    "TEMP_ADJUSTED",
    "PSAL_ADJUSTED",
    "PRES_ADJUSTED_QC",
    "TEMP_ADJUSTED_QC",
    "PSAL_ADJUSTED_QC",
    "PRES_ADJUSTED_ERROR",
    "TEMP_ADJUSTED_ERROR",
    "PSAL_ADJUSTED_ERROR",
    "JULD",
    "JULD_QC",
    "TIME",
    "TIME_QC",
    "CONFIG_MISSION_NUMBER",
];

pub fn is_standard(name: &str) -> bool {
    STANDARD_VARIABLES.contains(&name)
}
