/// Media Upload Gateway — stores an image blob with the external media
/// host and returns its public URL.
///
/// The upload is an unsigned-preset multipart POST; the preset identifier
/// is the one recognized option and is applied remote-side. Nothing is
/// validated about the blob before transmission.
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

const UPLOAD_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upload rejected (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Upload response carried no URL")]
    MissingUrl,
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Stores the blob and returns its public URL.
    async fn store(&self, data: Bytes, filename: &str) -> Result<String, MediaError>;
}

/// Client for a Cloudinary-style upload API.
pub struct CloudinaryClient {
    client: Client,
    upload_url: String,
    api_key: String,
    upload_preset: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadError {
    error: UploadErrorBody,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    message: String,
}

impl CloudinaryClient {
    pub fn new(cloud_name: &str, api_key: String, upload_preset: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(UPLOAD_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            upload_url: format!("https://api.cloudinary.com/v1_1/{cloud_name}/image/upload"),
            api_key,
            upload_preset,
        }
    }
}

#[async_trait]
impl MediaStore for CloudinaryClient {
    async fn store(&self, data: Bytes, filename: &str) -> Result<String, MediaError> {
        let form = Form::new()
            .text("upload_preset", self.upload_preset.clone())
            .text("api_key", self.api_key.clone())
            .part("file", Part::bytes(data.to_vec()).file_name(filename.to_string()));

        let response = self.client.post(&self.upload_url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let upload: UploadResponse = response.json().await?;
        let url = upload.secure_url.ok_or(MediaError::MissingUrl)?;
        info!("Stored image '{filename}' at {url}");
        Ok(url)
    }
}

/// Extracts the host's error message from its `{"error": {"message"}}`
/// envelope, falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<UploadError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_envelope() {
        let body = r#"{"error": {"message": "Upload preset not found"}}"#;
        assert_eq!(error_message(body), "Upload preset not found");
    }

    #[test]
    fn test_error_message_raw_fallback() {
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
    }
}
