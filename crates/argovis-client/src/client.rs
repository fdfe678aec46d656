//! Argovis API client.

use argo_common::{PressureRange, ProfileId, Region};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::error::{RemoteError, RemoteResult};
use crate::http::{check_status, ClientConfig, JsonGetter, ReqwestGetter};
use crate::query;

/// One profile document as returned by Argovis.
pub type Profile = Map<String, Value>;

/// Issues Argovis queries through a [`JsonGetter`].
pub struct ArgovisClient<G = ReqwestGetter> {
    getter: G,
    base_url: String,
}

impl ArgovisClient<ReqwestGetter> {
    /// Client talking to the configured deployment over HTTP.
    pub fn new(config: ClientConfig) -> RemoteResult<Self> {
        let getter = ReqwestGetter::new(&config)?;
        Ok(Self::with_getter(getter, config.base_url))
    }
}

impl<G: JsonGetter> ArgovisClient<G> {
    pub fn with_getter(getter: G, base_url: impl Into<String>) -> Self {
        Self {
            getter,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch(&self, url: &str) -> RemoteResult<Value> {
        let (status, body) = self.getter.get_json(url).await?;
        check_status(url, status, body)
    }

    /// A single profile.
    #[instrument(skip(self))]
    pub async fn get_profile(&self, wmo: u32, cycle: u32) -> RemoteResult<Profile> {
        let url = query::profile_url(&self.base_url, ProfileId::new(wmo, cycle));
        let body = self.fetch(&url).await?;
        into_profile(&url, body)
    }

    /// Several profiles by id, optionally clipped to a pressure range.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn get_profiles(
        &self,
        ids: &[ProfileId],
        pressure: Option<PressureRange>,
    ) -> RemoteResult<Vec<Profile>> {
        let url = query::profiles_url(&self.base_url, ids, pressure.as_ref())?;
        let body = self.fetch(&url).await?;
        into_profiles(&url, body)
    }

    /// Every profile of a float.
    #[instrument(skip(self))]
    pub async fn get_platform_profiles(&self, wmo: u32) -> RemoteResult<Vec<Profile>> {
        let url = query::platform_url(&self.base_url, wmo);
        let body = self.fetch(&url).await?;
        into_profiles(&url, body)
    }

    /// Profiles inside a polygon and date window.
    #[instrument(skip(self, region), fields(start = %region.start, end = %region.end))]
    pub async fn get_selection_profiles(&self, region: &Region) -> RemoteResult<Vec<Profile>> {
        let url = query::selection_url(&self.base_url, region);
        info!(url = %url, "Querying Argovis selection");
        let body = self.fetch(&url).await?;
        into_profiles(&url, body)
    }
}

fn into_profile(url: &str, body: Value) -> RemoteResult<Profile> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(decode_error(url, "an object", &other)),
    }
}

fn into_profiles(url: &str, body: Value) -> RemoteResult<Vec<Profile>> {
    let items = match body {
        Value::Array(items) => items,
        other => return Err(decode_error(url, "an array", &other)),
    };
    let profiles = items
        .into_iter()
        .map(|item| into_profile(url, item))
        .collect::<RemoteResult<Vec<_>>>()?;
    debug!(count = profiles.len(), "Decoded profiles");
    Ok(profiles)
}

fn decode_error(url: &str, expected: &str, got: &Value) -> RemoteError {
    let kind = match got {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    RemoteError::Decode {
        url: url.to_string(),
        message: format!("expected {}, got {}", expected, kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_profiles_requires_objects() {
        assert!(into_profiles("u", json!([{"_id": "1_1"}])).is_ok());
        assert!(matches!(
            into_profiles("u", json!([1, 2])),
            Err(RemoteError::Decode { .. })
        ));
        assert!(matches!(
            into_profiles("u", json!({"_id": "1_1"})),
            Err(RemoteError::Decode { .. })
        ));
    }
}
