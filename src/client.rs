use crate::config::Config;
use crate::types::{Created, Id, NewPlate, NewSighting, NewVehicle, Plate, Sighting, Vehicle};
use failure::Fail;
use log::{debug, info, warn};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error as StdError;
use std::io;
use url::Url;

/// How much of a response body makes it into the logs.
const LOG_BODY_CHARS: usize = 200;

#[derive(Debug, Fail)]
pub enum ClientError {
    #[fail(display = "request timed out")]
    Timeout,
    #[fail(display = "network error: {}", _0)]
    NetworkUnreachable(String),
    #[fail(display = "unexpected status {}: {}", status, body)]
    UnexpectedStatus { status: u16, body: String },
    #[fail(display = "malformed response: {}", _0)]
    Decode(String),
    #[fail(display = "request failed: {}", _0)]
    Request(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else if e.is_connect() || e.is_body() || (e.is_request() && caused_by_io(&e)) {
            ClientError::NetworkUnreachable(e.to_string())
        } else {
            ClientError::Request(e.to_string())
        }
    }
}

/// Resets and broken pipes surface as an `io::Error` somewhere below
/// reqwest's own error.
fn caused_by_io(e: &(dyn StdError + 'static)) -> bool {
    let mut source = e.source();
    while let Some(err) = source {
        if err.is::<io::Error>() {
            return true;
        }
        source = err.source();
    }
    false
}

/// Typed access to the Platitude vehicle, plate and sighting collections.
///
/// The underlying `reqwest::Client` pools connections and is safe to share,
/// so one `ResourceClient` serves every concurrent saga and query.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    http: reqwest::Client,
    base: Url,
}

impl ResourceClient {
    pub fn new(config: &Config) -> Result<ResourceClient, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(ResourceClient {
            http,
            base: config.platitude_url.clone(),
        })
    }

    pub async fn create_vehicle(&self, vehicle: &NewVehicle) -> Result<Created, ClientError> {
        self.create(&["vehicles", ""], vehicle).await
    }

    pub async fn create_plate(
        &self,
        code: &str,
        vehicle_id: Option<&Id>,
    ) -> Result<Created, ClientError> {
        self.create(&["plates", ""], &NewPlate { code, vehicle_id })
            .await
    }

    pub async fn create_sighting(&self, sighting: &NewSighting<'_>) -> Result<Created, ClientError> {
        self.create(&["sightings", ""], sighting).await
    }

    /// An empty list means the backend has no plate with this code.
    pub async fn plates_by_code(&self, code: &str) -> Result<Vec<Plate>, ClientError> {
        self.fetch_list(&["plates", "code", code]).await
    }

    pub async fn sightings_by_plate(&self, plate_id: &Id) -> Result<Vec<Sighting>, ClientError> {
        let plate_id = plate_id.to_string();
        self.fetch_list(&["sightings", "plate", plate_id.as_str()])
            .await
    }

    pub async fn vehicle_by_id(&self, vehicle_id: &Id) -> Result<Option<Vehicle>, ClientError> {
        let id = vehicle_id.to_string();
        let (status, body) = self.get(&["vehicles", id.as_str()]).await?;
        match status {
            StatusCode::OK => decode(&body).map(Some),
            StatusCode::NOT_FOUND => {
                warn!("Vehicle {} not found", vehicle_id);
                Ok(None)
            }
            _ => Err(unexpected(status, body)),
        }
    }

    /// Liveness probe against `GET /health`.
    pub async fn health(&self) -> Result<(), ClientError> {
        let (status, body) = self.get(&["health"]).await?;
        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(unexpected(status, body))
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Config only accepts http(s) base URLs, which always have segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn create<B: Serialize>(&self, segments: &[&str], body: &B) -> Result<Created, ClientError> {
        let url = self.endpoint(segments);
        info!("POST {}", url);
        debug!(
            "Request body: {}",
            serde_json::to_string(body).unwrap_or_default()
        );
        let response = self.http.post(url.clone()).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        info!("POST {} returned {}", url, status);
        debug!("Response body: {}", truncate(&text, LOG_BODY_CHARS));
        if status != StatusCode::CREATED {
            warn!(
                "Create at {} failed with status {}: {}",
                url,
                status,
                truncate(&text, LOG_BODY_CHARS)
            );
            return Err(unexpected(status, text));
        }
        decode(&text)
    }

    async fn fetch_list<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Vec<T>, ClientError> {
        let (status, body) = self.get(segments).await?;
        match status {
            StatusCode::OK => decode(&body),
            StatusCode::NOT_FOUND => {
                warn!(
                    "Nothing found at {}: {}",
                    self.endpoint(segments),
                    truncate(&body, LOG_BODY_CHARS)
                );
                Ok(Vec::new())
            }
            _ => Err(unexpected(status, body)),
        }
    }

    async fn get(&self, segments: &[&str]) -> Result<(StatusCode, String), ClientError> {
        let url = self.endpoint(segments);
        info!("GET {}", url);
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        let text = response.text().await?;
        info!("GET {} returned {}", url, status);
        debug!("Response body: {}", truncate(&text, LOG_BODY_CHARS));
        Ok((status, text))
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::Decode(e.to_string()))
}

fn unexpected(status: StatusCode, body: String) -> ClientError {
    ClientError::UnexpectedStatus {
        status: status.as_u16(),
        body,
    }
}

/// Cuts `s` to at most `max` characters without splitting one.
pub fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ResourceClient {
        ResourceClient::new(&Config::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn endpoints_keep_trailing_slash_for_collections() {
        let c = client("http://192.168.3.141:8000");
        assert_eq!(
            c.endpoint(&["vehicles", ""]).as_str(),
            "http://192.168.3.141:8000/vehicles/"
        );
        assert_eq!(
            c.endpoint(&["plates", "code", "ABC123"]).as_str(),
            "http://192.168.3.141:8000/plates/code/ABC123"
        );
    }

    #[test]
    fn endpoints_nest_under_base_path() {
        let c = client("http://platitude.local/api/");
        assert_eq!(
            c.endpoint(&["sightings", "plate", "9"]).as_str(),
            "http://platitude.local/api/sightings/plate/9"
        );
    }

    #[test]
    fn plate_codes_are_escaped() {
        let c = client("http://platitude.local");
        assert_eq!(
            c.endpoint(&["plates", "code", "AB/12 3"]).as_str(),
            "http://platitude.local/plates/code/AB%2F12%203"
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("short", 200), "short");
    }

    #[test]
    fn unexpected_status_keeps_full_body() {
        let body = "x".repeat(500);
        match unexpected(StatusCode::OK, body.clone()) {
            ClientError::UnexpectedStatus { status, body: kept } => {
                assert_eq!(status, 200);
                assert_eq!(kept, body);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
