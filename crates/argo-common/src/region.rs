//! Geographic/temporal selection types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ArgoError, ArgoResult};

/// Pressure bounds in decibars, applied remotely only.
///
/// `lower < upper` is assumed, never checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressureRange {
    pub lower: f64,
    pub upper: f64,
}

impl PressureRange {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Parse "lower,upper".
    pub fn from_pair_string(s: &str) -> ArgoResult<Self> {
        let (lower, upper) = s
            .split_once(',')
            .ok_or_else(|| ArgoError::invalid("presRange", format!("expected 'lower,upper', got '{}'", s)))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| ArgoError::invalid("presRange", format!("invalid number '{}'", v)))
        };
        Ok(Self::new(parse(lower)?, parse(upper)?))
    }

    /// Query-string form, e.g. `[0,50]`.
    pub fn to_query(&self) -> String {
        format!("[{},{}]", self.lower, self.upper)
    }
}

/// A polygon made of one or more `[lon, lat]` rings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shape {
    pub rings: Vec<Vec<[f64; 2]>>,
}

impl Shape {
    pub fn new(rings: Vec<Vec<[f64; 2]>>) -> Self {
        Self { rings }
    }

    /// Parse the JSON form `[[[lon,lat],...]]`.
    pub fn from_json(s: &str) -> ArgoResult<Self> {
        let shape: Shape = serde_json::from_str(s)?;
        if shape.rings.iter().all(Vec::is_empty) {
            return Err(ArgoError::invalid("shape", "polygon has no vertices"));
        }
        Ok(shape)
    }

    /// Every ring ends where it starts.
    pub fn is_closed(&self) -> bool {
        self.rings
            .iter()
            .all(|ring| ring.first().is_some() && ring.first() == ring.last())
    }

    /// Query-string form with no internal whitespace.
    pub fn to_query(&self) -> String {
        let rings: Vec<String> = self
            .rings
            .iter()
            .map(|ring| {
                let points: Vec<String> = ring
                    .iter()
                    .map(|[lon, lat]| format!("[{},{}]", lon, lat))
                    .collect();
                format!("[{}]", points.join(","))
            })
            .collect();
        format!("[{}]", rings.join(","))
    }
}

/// A polygon and date window, with optional remote-side filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub shape: Shape,
    #[serde(default)]
    pub pressure: Option<PressureRange>,
    #[serde(default)]
    pub bgc_only: bool,
    #[serde(default)]
    pub deep_only: bool,
}

impl Region {
    pub fn new(start: NaiveDate, end: NaiveDate, shape: Shape) -> Self {
        Self {
            start,
            end,
            shape,
            pressure: None,
            bgc_only: false,
            deep_only: false,
        }
    }

    pub fn with_pressure(mut self, pressure: PressureRange) -> Self {
        self.pressure = Some(pressure);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_query_has_no_spaces() {
        let shape = Shape::new(vec![vec![
            [168.6, 21.7],
            [168.6, 37.7],
            [-145.9, 37.7],
            [-180.0, 21.7],
            [168.6, 21.7],
        ]]);
        assert_eq!(
            shape.to_query(),
            "[[[168.6,21.7],[168.6,37.7],[-145.9,37.7],[-180,21.7],[168.6,21.7]]]"
        );
        assert!(shape.is_closed());
    }

    #[test]
    fn test_shape_from_json() {
        let shape = Shape::from_json("[[[0,0],[1,0],[1,1],[0,0]]]").unwrap();
        assert_eq!(shape.rings[0].len(), 4);
        assert!(Shape::from_json("[[]]").is_err());
    }

    #[test]
    fn test_pressure_range_query() {
        assert_eq!(PressureRange::new(0.0, 50.0).to_query(), "[0,50]");
        let parsed = PressureRange::from_pair_string("10, 20.5").unwrap();
        assert_eq!(parsed, PressureRange::new(10.0, 20.5));
    }
}
