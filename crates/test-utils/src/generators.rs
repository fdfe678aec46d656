//! Synthetic multi-profile datasets.
//!
//! [`ProfFixture`] builds a [`Dataset`] laid out the way a GDAC
//! `<wmo>_prof.nc` file looks once read: profile-indexed variables over
//! `N_PROF`, measurements over `N_PROF x N_LEVELS`, padded character
//! identifiers, a few scalars and one variable over neither dimension.
//!
//! Values are predictable so tests can check where they ended up:
//! - `PRES` at (profile p, level l) is `(l + 1) * 10 + p`
//! - `TEMP` is `20 - l` and `PSAL` is `35 + p / 10`
//! - `JULD` for profile p is the start time plus `p * time_step_days` days

use argo_common::{Dataset, Values, Variable};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Default profile start time (2017-09-15T00:00:00Z).
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2017, 9, 15, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Builder for a synthetic multi-profile dataset.
#[derive(Debug, Clone)]
pub struct ProfFixture {
    wmo: u32,
    cycles: Vec<u32>,
    n_levels: usize,
    start: DateTime<Utc>,
    time_step_days: i64,
    data_mode: char,
}

impl ProfFixture {
    pub fn new(wmo: u32) -> Self {
        Self {
            wmo,
            cycles: vec![1],
            n_levels: 3,
            start: reference_time(),
            time_step_days: 10,
            data_mode: 'R',
        }
    }

    /// One profile per cycle.
    pub fn cycles(mut self, cycles: &[u32]) -> Self {
        self.cycles = cycles.to_vec();
        self
    }

    pub fn levels(mut self, n_levels: usize) -> Self {
        self.n_levels = n_levels;
        self
    }

    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    /// Days between consecutive profiles; may be negative.
    pub fn time_step_days(mut self, days: i64) -> Self {
        self.time_step_days = days;
        self
    }

    pub fn data_mode(mut self, mode: char) -> Self {
        self.data_mode = mode;
        self
    }

    pub fn build(&self) -> Dataset {
        let n_prof = self.cycles.len();
        let n_levels = self.n_levels;

        let mut ds = Dataset::new();
        let dims = [
            ("N_PROF", n_prof),
            ("N_LEVELS", n_levels),
            ("N_PARAM", 3),
            ("STRING8", 8),
        ];
        for (name, len) in dims {
            ds.dims.insert(name.to_string(), len);
        }

        let juld: Vec<_> = (0..n_prof)
            .map(|p| Some(self.start + Duration::days(p as i64 * self.time_step_days)))
            .collect();
        let per_prof = |f: &dyn Fn(usize) -> f64| Values::Float((0..n_prof).map(f).collect());
        let per_level = |f: &dyn Fn(usize, usize) -> f64| {
            Values::Float(
                (0..n_prof)
                    .flat_map(|p| (0..n_levels).map(move |l| (p, l)))
                    .map(|(p, l)| f(p, l))
                    .collect(),
            )
        };

        let vars = vec![
            (
                "JULD",
                Variable::new(["N_PROF"], Values::Time(juld))
                    .with_attr("units", "days since 1950-01-01 00:00:00 UTC")
                    .with_attr("long_name", "Julian day (UTC) of the station relative to REFERENCE_DATE_TIME"),
            ),
            ("JULD_QC", Variable::new(["N_PROF"], text(n_prof, "1"))),
            (
                "LATITUDE",
                Variable::new(["N_PROF"], per_prof(&|p| 20.0 + p as f64)),
            ),
            (
                "LONGITUDE",
                Variable::new(["N_PROF"], per_prof(&|p| -60.0 - p as f64)),
            ),
            ("POSITION_QC", Variable::new(["N_PROF"], text(n_prof, "1"))),
            (
                "PLATFORM_NUMBER",
                Variable::new(["N_PROF"], text(n_prof, &format!("{:<8}", self.wmo))),
            ),
            (
                "CYCLE_NUMBER",
                Variable::new(
                    ["N_PROF"],
                    Values::Float(self.cycles.iter().map(|&c| c as f64).collect()),
                ),
            ),
            (
                "DATA_MODE",
                Variable::new(["N_PROF"], text(n_prof, &self.data_mode.to_string())),
            ),
            ("DIRECTION", Variable::new(["N_PROF"], text(n_prof, "A"))),
            (
                "PRES",
                Variable::new(
                    ["N_PROF", "N_LEVELS"],
                    per_level(&|p, l| (l as f64 + 1.0) * 10.0 + p as f64),
                ),
            ),
            (
                "TEMP",
                Variable::new(["N_PROF", "N_LEVELS"], per_level(&|_, l| 20.0 - l as f64)),
            ),
            (
                "PSAL",
                Variable::new(["N_PROF", "N_LEVELS"], per_level(&|p, _| 35.0 + p as f64 / 10.0)),
            ),
            (
                "TEMP_QC",
                Variable::new(["N_PROF", "N_LEVELS"], text(n_prof * n_levels, "1")),
            ),
            (
                "STATION_PARAMETERS",
                Variable::new(
                    ["N_PROF", "N_PARAM"],
                    Values::Text(
                        (0..n_prof)
                            .flat_map(|_| ["PRES    ", "TEMP    ", "PSAL    "])
                            .map(String::from)
                            .collect(),
                    ),
                ),
            ),
            (
                "PARAMETER_NAMES",
                Variable::new(
                    ["N_PARAM"],
                    Values::Text(vec!["PRES".into(), "TEMP".into(), "PSAL".into()]),
                ),
            ),
            (
                "DATA_TYPE",
                Variable::new(Vec::<String>::new(), Values::Text(vec!["Argo profile".into()])),
            ),
            (
                "FORMAT_VERSION",
                Variable::new(Vec::<String>::new(), Values::Text(vec!["3.1".into()])),
            ),
        ];

        for (name, var) in vars {
            ds.data_vars.insert(name.to_string(), var);
        }
        ds.attrs.insert("title".into(), "Argo float vertical profile".into());
        ds
    }
}

fn text(n: usize, value: &str) -> Values {
    Values::Text(vec![value.to_string(); n])
}
