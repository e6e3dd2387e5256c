//! The write path: vehicle (optional), then plate, then sighting.
//!
//! Each stage runs once, in order, and feeds the identifiers it gets back to
//! the next. The first failure ends the saga. Nothing already created is
//! rolled back: if the plate or sighting stage fails after a vehicle was
//! created, that vehicle stays in Platitude without a plate.

use crate::client::{ClientError, ResourceClient};
use crate::submission::Submission;
use crate::types::{Id, NewSighting};
use failure::Fail;
use log::{debug, error, info};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Vehicle,
    Plate,
    Sighting,
}

impl Stage {
    fn noun(self) -> &'static str {
        match self {
            Stage::Vehicle => "vehicle",
            Stage::Plate => "plate",
            Stage::Sighting => "sighting",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Stage::Vehicle => "Vehicle",
            Stage::Plate => "Plate",
            Stage::Sighting => "Sighting",
        }
    }
}

/// The stage that failed and why. Its display text is what the form shows.
#[derive(Debug)]
pub struct SagaError {
    pub stage: Stage,
    pub cause: ClientError,
}

impl SagaError {
    fn at(stage: Stage, cause: ClientError) -> SagaError {
        error!("Error creating {}: {}", stage.noun(), cause);
        SagaError { stage, cause }
    }
}

impl fmt::Display for SagaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.cause {
            ClientError::UnexpectedStatus { status, body } => write!(
                f,
                "Failed to create {} - Status: {}, Response: {}",
                self.stage.noun(),
                status,
                body
            ),
            other => write!(f, "{} creation error: {}", self.stage.title(), other),
        }
    }
}

impl Fail for SagaError {
    fn cause(&self) -> Option<&dyn Fail> {
        Some(&self.cause)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SightingReceipt {
    pub sighting_id: Id,
    pub plate_id: Id,
    pub vehicle_id: Option<Id>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SagaState {
    Init,
    /// The vehicle stage is settled: `None` when the submission carried no
    /// vehicle data and creation was skipped.
    VehicleCreated { vehicle_id: Option<Id> },
    PlateCreated { plate_id: Id, vehicle_id: Option<Id> },
    SightingCreated(SightingReceipt),
}

impl SagaState {
    pub fn is_done(&self) -> bool {
        matches!(self, SagaState::SightingCreated(_))
    }
}

pub struct SightingSaga<'a> {
    client: &'a ResourceClient,
    submission: &'a Submission,
}

impl<'a> SightingSaga<'a> {
    pub fn new(client: &'a ResourceClient, submission: &'a Submission) -> SightingSaga<'a> {
        SightingSaga { client, submission }
    }

    /// Performs the single backend call that moves `state` forward.
    /// A finished saga is returned unchanged.
    pub async fn step(&self, state: SagaState) -> Result<SagaState, SagaError> {
        let submission = self.submission;
        match state {
            SagaState::Init => match &submission.vehicle {
                Some(vehicle) => {
                    info!("Attempting to create vehicle with data: {:?}", vehicle);
                    let created = self
                        .client
                        .create_vehicle(vehicle)
                        .await
                        .map_err(|e| SagaError::at(Stage::Vehicle, e))?;
                    info!("Vehicle created successfully with ID: {}", created.id);
                    Ok(SagaState::VehicleCreated {
                        vehicle_id: Some(created.id),
                    })
                }
                None => {
                    debug!("No vehicle data; skipping vehicle creation");
                    Ok(SagaState::VehicleCreated { vehicle_id: None })
                }
            },
            SagaState::VehicleCreated { vehicle_id } => {
                info!("Attempting to create plate {}", submission.plate_code);
                let created = self
                    .client
                    .create_plate(&submission.plate_code, vehicle_id.as_ref())
                    .await
                    .map_err(|e| SagaError::at(Stage::Plate, e))?;
                info!("Plate created successfully with ID: {}", created.id);
                Ok(SagaState::PlateCreated {
                    plate_id: created.id,
                    vehicle_id,
                })
            }
            SagaState::PlateCreated {
                plate_id,
                vehicle_id,
            } => {
                let sighting = NewSighting {
                    longitude: submission.longitude,
                    latitude: submission.latitude,
                    timestamp: &submission.timestamp,
                    plate_id: &plate_id,
                    vehicle_id: vehicle_id.as_ref(),
                };
                info!("Attempting to create sighting with data: {:?}", sighting);
                let created = self
                    .client
                    .create_sighting(&sighting)
                    .await
                    .map_err(|e| SagaError::at(Stage::Sighting, e))?;
                info!("Sighting created successfully with ID: {}", created.id);
                Ok(SagaState::SightingCreated(SightingReceipt {
                    sighting_id: created.id,
                    plate_id,
                    vehicle_id,
                }))
            }
            done @ SagaState::SightingCreated(_) => Ok(done),
        }
    }

    pub async fn run(self) -> Result<SightingReceipt, SagaError> {
        info!("Starting sighting saga for plate {}", self.submission.plate_code);
        let mut state = SagaState::Init;
        loop {
            state = match self.step(state).await? {
                SagaState::SightingCreated(receipt) => return Ok(receipt),
                next => next,
            };
        }
    }
}

/// Records one sighting, creating its vehicle and plate first.
pub async fn post_sighting(
    client: &ResourceClient,
    submission: &Submission,
) -> Result<SightingReceipt, SagaError> {
    SightingSaga::new(client, submission).run().await
}
