//! Turns the raw sighting form into a typed submission.
//!
//! Everything a caller can get wrong is rejected here, before the saga makes
//! its first backend call, so bad input never leaves an orphaned vehicle or
//! plate behind.

use crate::types::NewVehicle;
use failure::Fail;
use serde::Deserialize;

#[derive(Debug, PartialEq, Fail)]
pub enum SubmissionError {
    #[fail(display = "Invalid input: {}", _0)]
    InvalidInput(String),
}

/// The sighting form exactly as posted. Browsers send every input, so blank
/// values are as good as missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormSubmission {
    pub platecode: Option<String>,
    pub sighttime: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub vehiclemake: Option<String>,
    pub vehiclemodel: Option<String>,
    pub vehiclecolor: Option<String>,
    pub vehicleyear: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub plate_code: String,
    pub timestamp: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Present iff at least one vehicle field was filled in.
    pub vehicle: Option<NewVehicle>,
}

impl Submission {
    pub fn from_form(form: FormSubmission) -> Result<Submission, SubmissionError> {
        let plate_code = required(form.platecode, "platecode")?.to_ascii_uppercase();
        let timestamp = form
            .sighttime
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| SubmissionError::InvalidInput("sighttime is required".to_string()))?;
        let latitude = coordinate(form.latitude, "latitude")?;
        let longitude = coordinate(form.longitude, "longitude")?;

        let year = match present(form.vehicleyear) {
            Some(raw) => Some(raw.parse::<i32>().map_err(|_| {
                SubmissionError::InvalidInput(format!("vehicleyear {:?} is not a year", raw))
            })?),
            None => None,
        };
        let vehicle = NewVehicle {
            make: present(form.vehiclemake),
            model: present(form.vehiclemodel),
            year,
            color: present(form.vehiclecolor),
        };
        let has_vehicle_data = vehicle.make.is_some()
            || vehicle.model.is_some()
            || vehicle.year.is_some()
            || vehicle.color.is_some();

        Ok(Submission {
            plate_code,
            timestamp,
            latitude,
            longitude,
            vehicle: if has_vehicle_data { Some(vehicle) } else { None },
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn required(value: Option<String>, field: &str) -> Result<String, SubmissionError> {
    present(value).ok_or_else(|| SubmissionError::InvalidInput(format!("{} is required", field)))
}

fn coordinate(value: Option<String>, field: &str) -> Result<f64, SubmissionError> {
    let raw = required(value, field)?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(SubmissionError::InvalidInput(format!(
            "{} {:?} is not a number",
            field, raw
        ))),
    }
}
