//! HTTP client for the price prediction service.

use crate::error::PredictError;
use crate::plate::PlateString;
use crate::types::{ApiStatus, PricePrediction};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::json;
use url::Url;

/// The operations a prediction session needs from the service.
#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn predict(&self, number: &PlateString) -> Result<PricePrediction, PredictError>;

    /// Starts retraining on the last `days_back` days of data. Returns as soon
    /// as the service accepts the request.
    async fn train(&self, days_back: u32) -> Result<(), PredictError>;
}

#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self) -> ApiStatus;
}

pub struct ServiceClient {
    client: reqwest::Client,
    root_url: Url,
    predict_url: Url,
    train_url: Url,
}

impl ServiceClient {
    /// `base_url` is the service root, e.g. `http://localhost:8000`.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let mut root_url = Url::parse(base_url)?;
        if !root_url.path().ends_with('/') {
            let path = format!("{}/", root_url.path());
            root_url.set_path(&path);
        }
        Ok(ServiceClient {
            client: reqwest::Client::new(),
            predict_url: root_url.join("api/predict")?,
            train_url: root_url.join("api/train")?,
            root_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.root_url
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, PredictError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    warn!("Service returned {}: {}", status, body);
    Err(PredictError::Service {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl PredictionService for ServiceClient {
    async fn predict(&self, number: &PlateString) -> Result<PricePrediction, PredictError> {
        let mut url = self.predict_url.clone();
        url.query_pairs_mut().append_pair("number", number.as_str());
        debug!("GET {}", url);

        let resp = check_status(self.client.get(url).send().await?).await?;
        let body = resp.text().await?;
        let prediction: PricePrediction = serde_json::from_str(&body)?;
        info!(
            "Predicted {} for plate {} (confidence {})",
            prediction.predicted_price, prediction.number, prediction.confidence
        );
        Ok(prediction)
    }

    async fn train(&self, days_back: u32) -> Result<(), PredictError> {
        info!("Requesting model training on the last {} days", days_back);
        let resp = self
            .client
            .post(self.train_url.clone())
            .json(&json!({ "days_back": days_back }))
            .send()
            .await?;
        let resp = check_status(resp).await?;
        // The body only acknowledges the request; there is nothing to poll.
        debug!("Training accepted: {}", resp.text().await.unwrap_or_default());
        Ok(())
    }
}

#[async_trait]
impl HealthProbe for ServiceClient {
    async fn probe(&self) -> ApiStatus {
        match self.client.get(self.root_url.clone()).send().await {
            Ok(resp) if resp.status().is_success() => ApiStatus::Online,
            Ok(resp) => {
                warn!("Health probe rejected with {}", resp.status());
                ApiStatus::Rejected
            }
            Err(e) => {
                debug!("Health probe failed: {}", e);
                ApiStatus::Offline
            }
        }
    }
}
