//! Printing and saving fetched collections.

use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use argo_common::{AttrValue, Dataset};
use serde::Serialize;

/// What gets printed once a request completes.
#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub fetcher: String,
    pub request: String,
    pub points: usize,
    pub variables: Vec<&'a str>,
    pub coordinates: Vec<&'a str>,
    pub attributes: &'a BTreeMap<String, AttrValue>,
}

impl<'a> Summary<'a> {
    pub fn new(fetcher: &str, request: String, ds: &'a Dataset) -> Self {
        Self {
            fetcher: fetcher.to_string(),
            request,
            points: ds.point_count(),
            variables: ds.data_var_names(),
            coordinates: ds.coords.keys().map(String::as_str).collect(),
            attributes: &ds.attrs,
        }
    }
}

pub fn print_summary(summary: &Summary<'_>) -> Result<()> {
    let text = serde_json::to_string_pretty(summary)?;
    println!("{}", text);
    Ok(())
}

/// Printed when a request produced nothing.
pub fn print_empty(fetcher: &str, request: &str) -> Result<()> {
    let text = serde_json::to_string_pretty(&serde_json::json!({
        "fetcher": fetcher,
        "request": request,
        "points": 0,
    }))?;
    println!("{}", text);
    Ok(())
}

/// Write the whole collection as JSON.
pub fn write_dataset(path: &Path, ds: &Dataset) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, ds)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush output file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use argo_common::{Values, Variable};

    #[test]
    fn test_summary_lists_variables() {
        let mut ds = Dataset::new();
        ds.add_dim("index", 2).unwrap();
        ds.insert_coord("TIME", Variable::new(["index"], Values::Time(vec![None, None])))
            .unwrap();
        ds.insert_var("TEMP", Variable::new(["index"], Values::Float(vec![1.0, 2.0])))
            .unwrap();
        ds.attrs.insert("DATA_ID".into(), "ARGO".into());

        let summary = Summary::new("Local ftp Argo data fetcher", "phy_WMO1".into(), &ds);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["points"], 2);
        assert_eq!(json["variables"], serde_json::json!(["TEMP"]));
        assert_eq!(json["coordinates"], serde_json::json!(["TIME"]));
        assert_eq!(json["attributes"]["DATA_ID"], "ARGO");
    }

    #[test]
    fn test_write_dataset_round_trips() {
        let dir = test_utils::temp_test_dir();
        let path = dir.path().join("out.json");
        let mut ds = Dataset::new();
        ds.attrs.insert("DOI".into(), "x".into());
        write_dataset(&path, &ds).unwrap();

        let back: Dataset = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(back, ds);
    }

    #[test]
    fn test_write_dataset_is_complete_on_return() {
        let dir = test_utils::temp_test_dir();
        let path = dir.path().join("out.json");
        let mut ds = Dataset::new();
        let n = 20_000;
        ds.add_dim("index", n).unwrap();
        ds.insert_var(
            "PRES",
            Variable::new(["index"], Values::Float((0..n).map(|i| i as f64 * 0.5).collect())),
        )
        .unwrap();

        write_dataset(&path, &ds).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.len() > 8 * 1024);
        assert!(text.ends_with('}'));
        let back: Dataset = serde_json::from_str(&text).unwrap();
        assert_eq!(back.point_count(), n);
    }

    #[test]
    fn test_write_dataset_into_missing_dir_fails() {
        let dir = test_utils::temp_test_dir();
        let err = write_dataset(&dir.path().join("no/such/out.json"), &Dataset::new()).unwrap_err();
        assert!(err.to_string().contains("Failed to create output file"));
    }
}
