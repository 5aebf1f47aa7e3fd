use crate::{
    config::ReplicateConfig,
    error::{GenError, Result},
    models::{Prediction, PredictionInput, PredictionStatus, RawValue},
};
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Model identifier as accepted by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelRef<'a> {
    /// `owner/name`, runs the model's latest deployment.
    Official { owner: &'a str, name: &'a str },
    /// `owner/name:version`, pins a version hash.
    Version { owner: &'a str, name: &'a str, version: &'a str },
}

impl<'a> ModelRef<'a> {
    pub fn parse(model: &'a str) -> Result<Self> {
        let model = model.trim();
        let (path, version) = match model.split_once(':') {
            Some((path, version)) => (path, Some(version)),
            None => (model, None),
        };
        let (owner, name) = path
            .split_once('/')
            .filter(|(owner, name)| !owner.is_empty() && !name.is_empty() && !name.contains('/'))
            .ok_or_else(|| {
                GenError::RequestError(format!(
                    "Model must look like owner/name or owner/name:version, got '{}'",
                    model
                ))
            })?;

        match version {
            Some(version) if version.is_empty() => Err(GenError::RequestError(format!(
                "Empty version in model reference '{}'",
                model
            ))),
            Some(version) => Ok(ModelRef::Version { owner, name, version }),
            None => Ok(ModelRef::Official { owner, name }),
        }
    }
}

#[derive(Clone)]
pub struct PredictionClient {
    http: Client,
    config: Arc<ReplicateConfig>,
}

impl PredictionClient {
    pub fn new(http: Client, config: Arc<ReplicateConfig>) -> Self {
        Self { http, config }
    }

    /// Runs one prediction to completion and returns its raw `output`.
    pub async fn run(&self, model: &str, input: &PredictionInput) -> Result<RawValue> {
        let token = self.token()?;
        let base = self.config.base_url.trim_end_matches('/');

        let (url, payload) = match ModelRef::parse(model)? {
            ModelRef::Official { owner, name } => (
                format!("{}/models/{}/{}/predictions", base, owner, name),
                json!({ "input": input }),
            ),
            ModelRef::Version { version, .. } => (
                format!("{}/predictions", base),
                json!({ "version": version, "input": input }),
            ),
        };

        log::info!("Invoking model: {}", model);
        log::debug!(
            "Prediction input: prompt_len={}, references={}",
            input.prompt.len(),
            input.image_input.len()
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .header("Prefer", "wait")
            .json(&payload)
            .send()
            .await
            .map_err(|e| GenError::ProviderError(format!("Failed to reach provider: {}", e)))?;

        let mut prediction = read_prediction(response).await?;
        let mut polls = 0;

        while !prediction.status.is_terminal() {
            if polls >= self.config.max_poll_attempts {
                return Err(GenError::ProviderError(format!(
                    "Prediction {} still {:?} after {} polls",
                    prediction.id.as_deref().unwrap_or("unknown"),
                    prediction.status,
                    polls
                )));
            }

            let poll_url = prediction.urls.get.clone().ok_or_else(|| {
                GenError::ResponseError("Prediction is still running but has no poll URL".into())
            })?;

            tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
            polls += 1;
            log::debug!("Polling prediction ({}): {}", polls, poll_url);

            let response = self
                .http
                .get(&poll_url)
                .bearer_auth(token)
                .send()
                .await
                .map_err(|e| GenError::ProviderError(format!("Failed to poll prediction: {}", e)))?;
            prediction = read_prediction(response).await?;
        }

        finish(prediction)
    }

    fn token(&self) -> Result<&str> {
        self.config
            .api_token
            .as_deref()
            .ok_or_else(|| GenError::ConfigError("REPLICATE_API_TOKEN not configured".into()))
    }
}

async fn read_prediction(response: reqwest::Response) -> Result<Prediction> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        log::error!("Provider returned {}: {}", status, body);
        return Err(GenError::ProviderError(format!("{} - {}", status, body)));
    }

    response
        .json::<Prediction>()
        .await
        .map_err(|e| GenError::ResponseError(format!("Unreadable prediction: {}", e)))
}

fn finish(prediction: Prediction) -> Result<RawValue> {
    match prediction.status {
        PredictionStatus::Succeeded => Ok(RawValue::from(prediction.output)),
        status => {
            let reason = match &prediction.error {
                serde_json::Value::Null => format!("prediction {:?}", status).to_lowercase(),
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Err(GenError::ProviderError(reason))
        }
    }
}
