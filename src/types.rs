use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub low: u64,
    pub high: u64,
}

/// A price estimate as returned by `GET /api/predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePrediction {
    pub number: String,
    pub predicted_price: u64,
    pub price_range: PriceRange,
    pub confidence: f64,
}

/// One row of the local prediction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub number: String,
    pub price: u64,
    pub min: u64,
    pub max: u64,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn from_prediction(prediction: &PricePrediction, timestamp: DateTime<Utc>) -> Self {
        HistoryEntry {
            number: prediction.number.clone(),
            price: prediction.predicted_price,
            min: prediction.price_range.low,
            max: prediction.price_range.high,
            confidence: prediction.confidence,
            timestamp,
        }
    }
}

/// Health of the prediction service as last seen by a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    Unknown,
    Online,
    /// The service answered, but with a failure status.
    Rejected,
    /// The probe could not reach the service.
    Offline,
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ApiStatus::Unknown => "unknown",
            ApiStatus::Online => "online",
            ApiStatus::Rejected => "error",
            ApiStatus::Offline => "offline",
        })
    }
}
