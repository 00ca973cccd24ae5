//! Signed image uploads to Cloudinary.
//!
//! The request is signed server-side so the API secret never leaves the process.
//! Signature: SHA-256 hex of the sorted `key=value&...` string followed by the secret.

use std::time::Duration;

use chrono::Utc;
use reqwest::{multipart, Client};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::{config::CloudinaryConfig, models::UploadResult};

pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_FOLDER: &str = "blog";
const API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Missing Cloudinary credentials. Check CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY, CLOUDINARY_API_SECRET")]
    MissingCredentials,
    #[error("Cloudinary upload timed out after 60 seconds. Check your credentials.")]
    Timeout,
    #[error("Cloudinary request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Cloudinary error ({status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct CloudinaryClient {
    client: Client,
    config: CloudinaryConfig,
    base_url: String,
}

impl CloudinaryClient {
    pub fn new(client: Client, config: CloudinaryConfig) -> Self {
        Self {
            client,
            config,
            base_url: API_BASE.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Uploads image bytes into `folder` and returns the hosted URL and dimensions.
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
        folder: &str,
    ) -> Result<UploadResult, UploadError> {
        tokio::time::timeout(UPLOAD_TIMEOUT, self.send(bytes, file_name, content_type, folder))
            .await
            .map_err(|_| UploadError::Timeout)?
    }

    async fn send(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
        folder: &str,
    ) -> Result<UploadResult, UploadError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[("folder", folder), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let file = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;

        let form = multipart::Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let url = format!("{}/{}/image/upload", self.base_url, self.config.cloud_name);
        let resp = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to reach Cloudinary"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(UploadError::Api { status, message });
        }

        let uploaded: UploadResponse = resp.json().await?;
        tracing::info!(public_id = %uploaded.public_id, "Image uploaded");

        Ok(UploadResult {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
            width: uploaded.width,
            height: uploaded.height,
        })
    }
}

/// Signs upload parameters. `file`, `api_key` and `signature_algorithm` are never part of `params`.
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}
