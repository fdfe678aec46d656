//! Argovis URL templates.
//!
//! Pure string building; list parameters carry no internal whitespace.

use argo_common::{PressureRange, ProfileId, Region};

use crate::error::{RemoteError, RemoteResult};

/// `<base>/catalog/profiles/<wmo>_<cycle>`
pub fn profile_url(base: &str, id: ProfileId) -> String {
    format!("{}/catalog/profiles/{}", trim(base), id)
}

/// `<base>/catalog/mprofiles/?ids=['<id>',...]` with an optional pressure range.
pub fn profiles_url(
    base: &str,
    ids: &[ProfileId],
    pressure: Option<&PressureRange>,
) -> RemoteResult<String> {
    if ids.is_empty() {
        return Err(RemoteError::InvalidQuery(
            "at least one profile id is required".to_string(),
        ));
    }
    let quoted: Vec<String> = ids.iter().map(|id| format!("'{}'", id)).collect();
    let mut url = format!("{}/catalog/mprofiles/?ids=[{}]", trim(base), quoted.join(","));
    if let Some(range) = pressure {
        url.push_str("&presRange=");
        url.push_str(&range.to_query());
    }
    Ok(url)
}

/// `<base>/catalog/platforms/<wmo>`
pub fn platform_url(base: &str, wmo: u32) -> String {
    format!("{}/catalog/platforms/{}", trim(base), wmo)
}

/// `<base>/selection/profiles?startDate=..&endDate=..&shape=..`
///
/// `bgcOnly`, `deepOnly` and `presRange` are only appended when set.
pub fn selection_url(base: &str, region: &Region) -> String {
    let mut url = format!(
        "{}/selection/profiles?startDate={}&endDate={}&shape={}",
        trim(base),
        region.start.format("%Y-%m-%d"),
        region.end.format("%Y-%m-%d"),
        region.shape.to_query()
    );
    if region.bgc_only {
        url.push_str("&bgcOnly=True");
    }
    if region.deep_only {
        url.push_str("&deepOnly=True");
    }
    if let Some(range) = &region.pressure {
        url.push_str("&presRange=");
        url.push_str(&range.to_query());
    }
    url
}

fn trim(base: &str) -> &str {
    base.trim_end_matches('/')
}
