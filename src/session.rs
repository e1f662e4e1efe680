//! Turns raw user input into a price prediction.
//!
//! A session normalizes and validates the plate, asks the service for a
//! price, records the result in the history and mirrors every step into its
//! [`AppState`] for rendering. Requests are never retried.

use crate::client::PredictionService;
use crate::db::HistoryStore;
use crate::error::{InputError, PredictError};
use crate::plate::{self, ParsedPlate, PlateString};
use crate::render::AppState;
use crate::scale::{self, ScalePositions};
use crate::types::{HistoryEntry, PricePrediction};
use chrono::Utc;
use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Validating,
    Requesting,
    Success,
    Failed,
}

/// Outcome of a successful prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub plate: ParsedPlate,
    pub prediction: PricePrediction,
    pub positions: ScalePositions,
}

pub struct PredictionSession<S> {
    service: S,
    history: HistoryStore,
    state: SessionState,
    app: AppState,
}

impl<S: PredictionService> PredictionSession<S> {
    pub fn new(service: S, history: HistoryStore) -> Self {
        PredictionSession {
            service,
            history,
            state: SessionState::Idle,
            app: AppState::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn app_state(&self) -> &AppState {
        &self.app
    }

    pub fn app_state_mut(&mut self) -> &mut AppState {
        &mut self.app
    }

    pub fn history(&mut self) -> &[HistoryEntry] {
        self.history.all()
    }

    pub fn clear_history(&mut self) {
        info!("Clearing prediction history");
        self.history.clear();
    }

    pub async fn predict(&mut self, raw: &str) -> Result<Prediction, PredictError> {
        self.state = SessionState::Validating;
        let result = self.run(raw).await;
        match &result {
            Ok(prediction) => {
                self.state = SessionState::Success;
                self.app.show_result(prediction);
            }
            Err(e) => self.fail(e),
        }
        result
    }

    /// Predicts again for the plate stored at `index` in the history.
    pub async fn replay(&mut self, index: usize) -> Result<Prediction, PredictError> {
        let number = self.history.get(index).map(|e| e.number.clone());
        match number {
            Some(number) => self.predict(&number).await,
            None => {
                let e = PredictError::from(InputError::NoSuchHistoryEntry(index));
                self.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn train(&self, days_back: u32) -> Result<(), PredictError> {
        self.service.train(days_back).await
    }

    fn fail(&mut self, e: &PredictError) {
        warn!("Prediction failed: {}", e);
        self.state = SessionState::Failed;
        self.app.show_error(e);
    }

    async fn run(&mut self, raw: &str) -> Result<Prediction, PredictError> {
        let (number, parsed) = match validate(raw) {
            Ok(valid) => valid,
            Err(e) => {
                self.app.plate = None;
                return Err(e.into());
            }
        };

        self.state = SessionState::Requesting;
        self.app.plate = Some(parsed.clone());
        self.app.show_loading();
        info!("Requesting price for plate {}", number);
        let prediction = self.service.predict(&number).await?;

        let range = prediction.price_range;
        let positions =
            scale::compute_positions(range.low, range.high, prediction.predicted_price);
        if !positions.is_within_scale() {
            warn!(
                "Predicted price {} is outside the range {}..{}",
                prediction.predicted_price, range.low, range.high
            );
        }
        self.history
            .record(HistoryEntry::from_prediction(&prediction, Utc::now()));
        Ok(Prediction {
            plate: parsed,
            prediction,
            positions,
        })
    }
}

fn validate(raw: &str) -> Result<(PlateString, ParsedPlate), InputError> {
    let number = plate::normalize(raw);
    if number.is_empty() {
        return Err(InputError::Empty);
    }
    match number.parse() {
        Some(parsed) => Ok((number, parsed)),
        None => Err(InputError::Malformed(number.to_string())),
    }
}
