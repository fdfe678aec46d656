//! Float, cycle and dataset identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ArgoError, ArgoResult};

/// Argo dataset flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// Core physical parameters (pressure, temperature, salinity)
    #[default]
    Phy,
    /// Biogeochemical parameters
    Bgc,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Phy => "phy",
            DatasetKind::Bgc => "bgc",
        }
    }

    /// Value of the `DATA_ID` provenance attribute.
    pub fn data_id(&self) -> &'static str {
        match self {
            DatasetKind::Phy => "ARGO",
            DatasetKind::Bgc => "ARGO-BGC",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = ArgoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "phy" => Ok(DatasetKind::Phy),
            "bgc" => Ok(DatasetKind::Bgc),
            other => Err(ArgoError::invalid("dataset", format!("unknown dataset '{}'", other))),
        }
    }
}

/// Canonical sequence of cycle numbers.
///
/// Callers may hand over a single cycle, a vector or a slice; all of them
/// end up as the same ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CycleList(Vec<u32>);

impl CycleList {
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

impl From<u32> for CycleList {
    fn from(cycle: u32) -> Self {
        CycleList(vec![cycle])
    }
}

impl From<Vec<u32>> for CycleList {
    fn from(cycles: Vec<u32>) -> Self {
        CycleList(cycles)
    }
}

impl From<&[u32]> for CycleList {
    fn from(cycles: &[u32]) -> Self {
        CycleList(cycles.to_vec())
    }
}

impl<const N: usize> From<[u32; N]> for CycleList {
    fn from(cycles: [u32; N]) -> Self {
        CycleList(cycles.to_vec())
    }
}

/// A request for one or more floats, optionally narrowed to some cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatRequest {
    wmos: Vec<u32>,
    cycles: Option<CycleList>,
}

impl FloatRequest {
    /// Build a request; the WMO list must not be empty.
    pub fn new(wmos: impl Into<Vec<u32>>) -> ArgoResult<Self> {
        let wmos = wmos.into();
        if wmos.is_empty() {
            return Err(ArgoError::EmptyRequest(
                "at least one WMO is required".to_string(),
            ));
        }
        Ok(Self { wmos, cycles: None })
    }

    /// Request a single float.
    pub fn float(wmo: u32) -> Self {
        Self {
            wmos: vec![wmo],
            cycles: None,
        }
    }

    pub fn with_cycles(mut self, cycles: impl Into<CycleList>) -> Self {
        self.cycles = Some(cycles.into());
        self
    }

    pub fn wmos(&self) -> &[u32] {
        &self.wmos
    }

    pub fn cycles(&self) -> Option<&CycleList> {
        self.cycles.as_ref()
    }
}

/// Identifier of a single profile: float plus cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProfileId {
    pub wmo: u32,
    pub cycle: u32,
}

impl ProfileId {
    pub fn new(wmo: u32, cycle: u32) -> Self {
        Self { wmo, cycle }
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.wmo, self.cycle)
    }
}

impl FromStr for ProfileId {
    type Err = ArgoError;

    /// Parse "<wmo>_<cycle>", e.g. "1900722_1".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (wmo, cycle) = s
            .split_once('_')
            .ok_or_else(|| ArgoError::invalid("profile", format!("expected <wmo>_<cycle>, got '{}'", s)))?;
        let wmo = wmo
            .parse()
            .map_err(|_| ArgoError::invalid("profile", format!("invalid WMO '{}'", wmo)))?;
        let cycle = cycle
            .parse()
            .map_err(|_| ArgoError::invalid("profile", format!("invalid cycle '{}'", cycle)))?;
        Ok(Self { wmo, cycle })
    }
}

/// Processing stage of a profile, as recorded in `DATA_MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataMode {
    #[serde(rename = "R")]
    RealTime,
    #[serde(rename = "A")]
    Adjusted,
    #[serde(rename = "D")]
    Delayed,
}

impl DataMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataMode::RealTime => "R",
            DataMode::Adjusted => "A",
            DataMode::Delayed => "D",
        }
    }
}

impl fmt::Display for DataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataMode {
    type Err = ArgoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "R" => Ok(DataMode::RealTime),
            "A" => Ok(DataMode::Adjusted),
            "D" => Ok(DataMode::Delayed),
            other => Err(ArgoError::invalid(
                "data_mode",
                format!("expected one of 'R', 'A', 'D', got '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_list_from_scalar_and_list() {
        assert_eq!(CycleList::from(12), CycleList::from(vec![12]));
        assert_eq!(CycleList::from([1, 2]).as_slice(), &[1, 2]);
        assert_eq!(CycleList::from(&[3u32, 4][..]).len(), 2);
    }

    #[test]
    fn test_empty_request_rejected() {
        let result = FloatRequest::new(Vec::new());
        assert!(matches!(result, Err(ArgoError::EmptyRequest(_))));
    }

    #[test]
    fn test_profile_id_roundtrip() {
        let id: ProfileId = "1900722_12".parse().unwrap();
        assert_eq!(id, ProfileId::new(1900722, 12));
        assert_eq!(id.to_string(), "1900722_12");
        assert!("1900722".parse::<ProfileId>().is_err());
    }

    #[test]
    fn test_dataset_kind_data_id() {
        assert_eq!(DatasetKind::Phy.data_id(), "ARGO");
        assert_eq!(DatasetKind::Bgc.data_id(), "ARGO-BGC");
        assert_eq!("BGC".parse::<DatasetKind>().unwrap(), DatasetKind::Bgc);
    }

    #[test]
    fn test_data_mode_parse() {
        assert_eq!("d".parse::<DataMode>().unwrap(), DataMode::Delayed);
        assert_eq!(DataMode::Adjusted.to_string(), "A");
        assert!("X".parse::<DataMode>().is_err());
    }
}
