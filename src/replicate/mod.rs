pub mod file_client;
pub mod prediction_client;

use crate::{
    config::ReplicateConfig,
    error::{GenError, Result},
    logger,
    models::{PredictionInput, RawValue},
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub use file_client::{DataUri, FileClient};
pub use prediction_client::{ModelRef, PredictionClient};

/// One outbound call to a hosted model, plus reference image upload.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Runs `model` on `input` and returns the untyped output.
    async fn run(&self, model: &str, input: &PredictionInput) -> Result<RawValue>;

    /// Uploads a `data:` URI and returns a URL the model can fetch.
    async fn upload(&self, data_uri: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct ReplicateClient {
    prediction_client: PredictionClient,
    file_client: FileClient,
}

impl ReplicateClient {
    pub fn new(config: ReplicateConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        let config = Arc::new(config);

        Ok(Self {
            prediction_client: PredictionClient::new(http.clone(), config.clone()),
            file_client: FileClient::new(http, config),
        })
    }
}

#[async_trait]
impl GenerationClient for ReplicateClient {
    async fn run(&self, model: &str, input: &PredictionInput) -> Result<RawValue> {
        let timer = logger::timer(&format!("prediction {}", model));
        let output = self.prediction_client.run(model, input).await;
        timer.stop();
        output
    }

    async fn upload(&self, data_uri: &str) -> Result<String> {
        self.file_client.upload(data_uri).await
    }
}
