use crate::{
    config::ReplicateConfig,
    error::{GenError, Result},
    models::FileUpload,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use std::sync::Arc;

/// Decoded `data:<mime>;base64,<payload>` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DataUri {
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| GenError::UploadError("Reference image is not a data URI".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| GenError::UploadError("Data URI has no payload".into()))?;

        let mut params = header.split(';');
        let mime_type = params
            .next()
            .map(str::trim)
            .filter(|mime| !mime.is_empty())
            .unwrap_or("application/octet-stream")
            .to_string();
        if !params.any(|param| param.trim() == "base64") {
            return Err(GenError::UploadError(
                "Only base64-encoded data URIs are supported".into(),
            ));
        }

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| GenError::UploadError(format!("Invalid base64 payload: {}", e)))?;
        if bytes.is_empty() {
            return Err(GenError::UploadError("Reference image is empty".into()));
        }

        Ok(Self { mime_type, bytes })
    }

    pub fn file_name(&self) -> String {
        let extension = self
            .mime_type
            .split('/')
            .nth(1)
            .map(|subtype| subtype.split('+').next().unwrap_or(subtype))
            .filter(|subtype| !subtype.is_empty())
            .unwrap_or("bin");
        format!("reference.{}", extension)
    }
}

#[derive(Clone)]
pub struct FileClient {
    http: Client,
    config: Arc<ReplicateConfig>,
}

impl FileClient {
    pub fn new(http: Client, config: Arc<ReplicateConfig>) -> Self {
        Self { http, config }
    }

    /// Uploads a data URI and returns the URL the provider serves it from.
    pub async fn upload(&self, data_uri: &str) -> Result<String> {
        let token = self
            .config
            .api_token
            .as_deref()
            .ok_or_else(|| GenError::ConfigError("REPLICATE_API_TOKEN not configured".into()))?;

        let data = DataUri::parse(data_uri)?;
        let size = data.bytes.len();
        let file_name = data.file_name();
        let part = Part::bytes(data.bytes)
            .file_name(file_name)
            .mime_str(&data.mime_type)
            .map_err(|e| GenError::UploadError(format!("Invalid mime type: {}", e)))?;
        let form = Form::new().part("content", part);

        log::info!("Uploading reference image ({}, {} bytes)", data.mime_type, size);

        let url = format!("{}/files", self.config.base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| GenError::UploadError(format!("Failed to reach file endpoint: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenError::UploadError(format!("{} - {}", status, body)));
        }

        let upload: FileUpload = response
            .json()
            .await
            .map_err(|e| GenError::UploadError(format!("Unreadable upload response: {}", e)))?;

        log::debug!(
            "Uploaded reference image as file {}",
            upload.id.as_deref().unwrap_or("unknown")
        );
        upload
            .urls
            .get
            .ok_or_else(|| GenError::UploadError("Upload response has no URL".into()))
    }
}
