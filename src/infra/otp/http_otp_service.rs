use crate::domain::ports::OtpService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

pub struct HttpOtpService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpOtpService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct SendPayload<'a> {
    to: &'a str,
    channel: &'static str,
}

#[derive(Serialize)]
struct CheckPayload<'a> {
    to: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
struct CheckResponse {
    status: String,
}

#[async_trait]
impl OtpService for HttpOtpService {
    async fn send(&self, phone: &str) -> Result<(), AppError> {
        let payload = SendPayload { to: phone, channel: "sms" };

        let res = self.client.post(format!("{}/send", self.api_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("OTP service connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("OTP send failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        Ok(())
    }

    async fn verify(&self, phone: &str, code: &str) -> Result<bool, AppError> {
        let payload = CheckPayload { to: phone, code };

        let res = self.client.post(format!("{}/check", self.api_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("OTP service connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if !res.status().is_success() {
            return Ok(false);
        }

        let body: CheckResponse = res.json().await.map_err(|e| {
            let msg = format!("OTP service returned malformed response: {}", e);
            error!("{}", msg);
            AppError::InternalWithMsg(msg)
        })?;

        Ok(body.status == "approved")
    }
}
