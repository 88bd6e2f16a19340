use crate::domain::ports::ObjectStorage;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use tracing::error;

/// Thin client for an S3-compatible object gateway; only used for profile
/// and event images.
pub struct HttpStorageService {
    client: Client,
    api_url: String,
    api_key: String,
    bucket: String,
}

impl HttpStorageService {
    pub fn new(api_url: String, api_key: String, bucket: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
            bucket,
        }
    }
}

#[async_trait]
impl ObjectStorage for HttpStorageService {
    async fn upload(&self, data: &[u8], key: &str) -> Result<String, AppError> {
        let res = self.client.put(format!("{}/{}/{}", self.api_url, self.bucket, key))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .body(data.to_vec())
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Storage service connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Storage upload failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        Ok(format!("{}/{}/{}", self.api_url, self.bucket, key))
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let res = self.client.delete(format!("{}/{}/{}", self.api_url, self.bucket, key))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Storage service connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let msg = format!("Storage delete failed. Status: {}", status);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        Ok(())
    }
}
