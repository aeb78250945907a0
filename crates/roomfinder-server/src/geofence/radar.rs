//! Radar REST API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::Url;
use roomfinder_core::BuildingAvailability;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::{BUILDING_TAG, GeofenceError, GeofenceProvider};

/// Fields returned by a geofence lookup that the update call rejects.
const READ_ONLY_FIELDS: [&str; 8] = [
    "_id",
    "geometryCenter",
    "live",
    "createdAt",
    "updatedAt",
    "geometry",
    "geometryRadius",
    "mode",
];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Radar API client authenticated with a secret key.
#[derive(Debug)]
pub struct RadarClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RadarClient {
    pub fn new(api_url: &str, secret_key: &str) -> Result<Self, GeofenceError> {
        if secret_key.is_empty() {
            return Err(GeofenceError::Config("secret key is empty".into()));
        }
        let base_url = Url::parse(api_url)
            .map_err(|e| GeofenceError::Config(format!("invalid api url {api_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GeofenceError::Config(format!("invalid api url {api_url}")));
        }

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(secret_key)
            .map_err(|_| GeofenceError::Config("Invalid secret key format".into()))?;
        headers.insert(AUTHORIZATION, key);

        // reqwest is built with rustls-no-provider. Err means a provider is
        // already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { http, base_url })
    }

    /// API URL for the given path segments, each percent-encoded.
    pub(crate) fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, GeofenceError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = if body.is_empty() {
            status.canonical_reason().unwrap_or("Unknown").to_string()
        } else {
            body
        };
        Err(GeofenceError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json(&self, segments: &[&str]) -> Result<Value, GeofenceError> {
        let resp = self.http.get(self.url(segments)).send().await?;
        Ok(Self::check_status(resp).await?.json().await?)
    }

    /// Fetch a listing endpoint and pull out its array field.
    async fn list(&self, field: &str) -> Result<Vec<Value>, GeofenceError> {
        let mut body = self.get_json(&[field]).await?;
        match body.get_mut(field).map(Value::take) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(GeofenceError::Decode(format!("response has no {field} array"))),
        }
    }

    pub async fn get_building_geofence(&self, building: &str) -> Result<Value, GeofenceError> {
        let mut body = self
            .get_json(&["geofences", BUILDING_TAG, building])
            .await?;
        match body.get_mut("geofence").map(Value::take) {
            Some(geofence @ Value::Object(_)) => Ok(geofence),
            _ => Err(GeofenceError::Decode("response has no geofence".into())),
        }
    }

    pub async fn put_geofence(
        &self,
        tag: &str,
        external_id: &str,
        body: &Value,
    ) -> Result<(), GeofenceError> {
        let resp = self
            .http
            .put(self.url(&["geofences", tag, external_id]))
            .json(body)
            .send()
            .await?;
        Self::check_status(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl GeofenceProvider for RadarClient {
    #[instrument(skip(self), fields(status = %availability.status))]
    async fn sync_building_status(
        &self,
        building: &str,
        availability: BuildingAvailability,
    ) -> Result<(), GeofenceError> {
        let geofence = self.get_building_geofence(building).await?;
        let (tag, external_id, body) = reshape_for_update(geofence, availability)?;
        self.put_geofence(&tag, &external_id, &body).await?;
        debug!(building, "Geofence metadata updated");
        Ok(())
    }

    async fn list_geofences(&self) -> Result<Vec<Value>, GeofenceError> {
        self.list("geofences").await
    }

    async fn list_events(&self) -> Result<Vec<Value>, GeofenceError> {
        self.list("events").await
    }

    async fn list_users(&self) -> Result<Vec<Value>, GeofenceError> {
        self.list("users").await
    }
}

fn string_field(geofence: &Map<String, Value>, key: &str) -> Result<String, GeofenceError> {
    geofence
        .get(key)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| GeofenceError::Decode(format!("geofence has no {key}")))
}

/// Turn a fetched geofence into the body of its update call.
///
/// Writes `status` and `isVerified` into the metadata, moves the geometry
/// into the `coordinates`/`radius` fields the update call expects, and drops
/// read-only fields. Returns `(tag, externalId, body)`.
pub fn reshape_for_update(
    geofence: Value,
    availability: BuildingAvailability,
) -> Result<(String, String, Value), GeofenceError> {
    let Value::Object(mut geofence) = geofence else {
        return Err(GeofenceError::Decode("geofence is not an object".into()));
    };
    let tag = string_field(&geofence, "tag")?;
    let external_id = string_field(&geofence, "externalId")?;

    let metadata = geofence
        .entry("metadata")
        .or_insert_with(|| Value::Object(Map::new()));
    if !metadata.is_object() {
        *metadata = Value::Object(Map::new());
    }
    if let Value::Object(metadata) = metadata {
        metadata.insert("status".into(), Value::from(availability.status.as_str()));
        metadata.insert("isVerified".into(), Value::from(availability.is_verified));
    }

    let coordinates = match geofence.get("type").and_then(Value::as_str) {
        Some("circle" | "isochrone") => geofence
            .get("geometryCenter")
            .and_then(|c| c.get("coordinates"))
            .cloned(),
        Some("polygon") => geofence
            .get("geometry")
            .and_then(|g| g.get("coordinates"))
            .and_then(|c| c.get(0))
            .cloned(),
        _ => None,
    };
    if let Some(coordinates) = coordinates {
        geofence.insert("coordinates".into(), coordinates);
    }
    if let Some(radius) = geofence.get("geometryRadius").cloned() {
        geofence.insert("radius".into(), radius);
    }

    for field in READ_ONLY_FIELDS {
        geofence.remove(field);
    }

    Ok((tag, external_id, Value::Object(geofence)))
}
