//! The read path: plate code to plate, plate to sightings, first sighting to
//! vehicle, joined into one summary.

use crate::client::{ClientError, ResourceClient};
use crate::format::Markup;
use crate::types::{Sighting, Vehicle};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use failure::Fail;
use log::{debug, info, warn};
use std::fmt;

const TIME_FORMAT: &str = "%I:%M %p on %b %d, %Y";

/// Naive shapes Platitude has been seen to store, tried in order.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Fail)]
pub enum QueryError {
    #[fail(display = "{}", _0)]
    Backend(#[cause] ClientError),
    #[fail(display = "Invalid input: {}", _0)]
    InvalidInput(String),
}

impl From<ClientError> for QueryError {
    fn from(e: ClientError) -> QueryError {
        QueryError::Backend(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlateCheck {
    NotFound { code: String },
    NoSightings { code: String },
    Found(SightingSummary),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SightingLine {
    pub longitude: String,
    pub latitude: String,
    pub time: String,
}

impl SightingLine {
    fn from_sighting(sighting: &Sighting) -> Result<SightingLine, QueryError> {
        Ok(SightingLine {
            longitude: sighting.longitude.to_string(),
            latitude: sighting.latitude.to_string(),
            time: human_timestamp(&sighting.timestamp)?,
        })
    }

    pub fn render(&self, markup: Markup) -> String {
        format!(
            "{}:{},{} || {}:{}",
            markup.bold("Location"),
            self.longitude,
            self.latitude,
            markup.bold("Time"),
            self.time
        )
    }
}

/// Everything known about one plate's sightings. `vehicle` describes every
/// line, although it was looked up from the first sighting only.
#[derive(Debug, Clone, PartialEq)]
pub struct SightingSummary {
    pub plate: String,
    pub vehicle: Option<Vehicle>,
    pub lines: Vec<SightingLine>,
}

impl SightingSummary {
    pub fn header(&self, markup: Markup) -> String {
        let found = match self.lines.len() {
            1 => "1 Sighting found".to_string(),
            n => format!("{} Sightings found", n),
        };
        format!("--{}--", markup.bold(&found))
    }

    pub fn vehicle_block(&self, markup: Markup) -> String {
        match &self.vehicle {
            Some(v) => {
                let field = |value: &Option<String>| {
                    value.clone().unwrap_or_else(|| "unknown".to_string())
                };
                format!(
                    "{} {}\n{}  {}\n{}  {}",
                    markup.bold("Make"),
                    field(&v.make),
                    markup.bold("Model"),
                    field(&v.model),
                    markup.bold("Color"),
                    field(&v.color)
                )
            }
            None => "VEHICLE INFO UNKNOWN".to_string(),
        }
    }

    pub fn render(&self, markup: Markup) -> String {
        let lines: Vec<String> = self.lines.iter().map(|l| l.render(markup)).collect();
        format!(
            "{}\n{}: {}\n{}\n{}",
            self.header(markup),
            markup.bold("Plate"),
            self.plate,
            self.vehicle_block(markup),
            lines.join("\n\n")
        )
    }
}

impl fmt::Display for SightingSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.render(Markup::Plain))
    }
}

/// Renders a stored ISO-8601 timestamp as e.g. `02:30 PM on Mar 05, 2024`.
/// Offsets are kept, not converted.
pub fn human_timestamp(raw: &str) -> Result<String, QueryError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.format(TIME_FORMAT).to_string());
    }
    for pattern in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Ok(dt.format(TIME_FORMAT).to_string());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.format(TIME_FORMAT).to_string())
        .ok_or_else(|| QueryError::InvalidInput(format!("unrecognised timestamp {:?}", raw)))
}

/// Looks up everything Platitude knows about `code`.
///
/// Only the first plate returned for the code is considered, and only the
/// first sighting's vehicle reference is resolved. Any backend failure
/// aborts the whole lookup; there are no partial summaries.
pub async fn check_plate(client: &ResourceClient, code: &str) -> Result<PlateCheck, QueryError> {
    info!("Processing plate check for: {}", code);
    let plates = client.plates_by_code(code).await?;
    let plate = match plates.into_iter().next() {
        Some(plate) => plate,
        None => {
            warn!("Plate {} not found", code);
            return Ok(PlateCheck::NotFound {
                code: code.to_string(),
            });
        }
    };
    info!("Got plate {} with ID: {}", plate.code, plate.id);

    let sightings = client.sightings_by_plate(&plate.id).await?;
    let first = match sightings.first() {
        Some(first) => first,
        None => {
            warn!("No sightings found for plate {}", plate.code);
            return Ok(PlateCheck::NoSightings { code: plate.code });
        }
    };
    info!("Got {} sightings for plate {}", sightings.len(), plate.code);

    let vehicle = match &first.vehicle_id {
        Some(vehicle_id) => {
            debug!("Resolving vehicle {}", vehicle_id);
            client.vehicle_by_id(vehicle_id).await?
        }
        None => {
            debug!("First sighting has no vehicle reference");
            None
        }
    };

    let lines = sightings
        .iter()
        .map(SightingLine::from_sighting)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PlateCheck::Found(SightingSummary {
        plate: plate.code,
        vehicle,
        lines,
    }))
}
